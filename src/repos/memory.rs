use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repos::error::RepoError;
use crate::repos::store::{ItemRow, ListRow, ListStore};
use crate::services::auth::UserId;

type ListKey = (String, String);
type ItemKey = (String, String, String);

/// Process-local store. Used when no database is configured, and in tests.
#[derive(Debug, Default)]
pub struct MemoryListStore {
    lists: RwLock<BTreeMap<ListKey, ListRow>>,
    items: RwLock<BTreeMap<ItemKey, ItemRow>>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn get_list(&self, user: &UserId, list_id: &str) -> Result<Option<ListRow>, RepoError> {
        let lists = self.lists.read().await;
        Ok(lists
            .get(&(user.as_str().to_string(), list_id.to_string()))
            .cloned())
    }

    async fn get_lists(&self, user: &UserId) -> Result<Vec<ListRow>, RepoError> {
        let lists = self.lists.read().await;
        Ok(lists
            .values()
            .filter(|row| row.user_id == user.as_str())
            .cloned()
            .collect())
    }

    async fn get_list_items(
        &self,
        user: &UserId,
        list_id: &str,
    ) -> Result<Vec<ItemRow>, RepoError> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .filter(|row| row.user_id == user.as_str() && row.list_id == list_id)
            .cloned()
            .collect())
    }

    async fn get_all_items(&self, user: &UserId) -> Result<Vec<ItemRow>, RepoError> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .filter(|row| row.user_id == user.as_str())
            .cloned()
            .collect())
    }

    async fn insert_list(
        &self,
        user: &UserId,
        list_id: &str,
        title: &str,
    ) -> Result<ListRow, RepoError> {
        let mut lists = self.lists.write().await;
        let key = (user.as_str().to_string(), list_id.to_string());
        if lists.contains_key(&key) {
            return Err(RepoError::Conflict { resource: "list" });
        }

        let row = ListRow {
            user_id: key.0.clone(),
            list_id: key.1.clone(),
            title: title.to_string(),
            created_at: Utc::now(),
        };
        lists.insert(key, row.clone());
        Ok(row)
    }

    async fn insert_item(
        &self,
        user: &UserId,
        list_id: &str,
        item_id: &str,
        content: &str,
    ) -> Result<ItemRow, RepoError> {
        let mut items = self.items.write().await;
        let key = (
            user.as_str().to_string(),
            list_id.to_string(),
            item_id.to_string(),
        );
        if items.contains_key(&key) {
            return Err(RepoError::Conflict { resource: "item" });
        }

        let row = ItemRow {
            user_id: key.0.clone(),
            list_id: key.1.clone(),
            item_id: key.2.clone(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        items.insert(key, row.clone());
        Ok(row)
    }
}
