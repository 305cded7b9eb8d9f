/*
 * Responsibility
 * - Storage contract for lists/items, partitioned by the verified user id
 * - Handlers only reach it after the identity middleware has run
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::repos::error::RepoError;
use crate::services::auth::UserId;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ListRow {
    #[sqlx(rename = "userId")]
    pub user_id: String,
    #[sqlx(rename = "listId")]
    pub list_id: String,
    pub title: String,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ItemRow {
    #[sqlx(rename = "userId")]
    pub user_id: String,
    #[sqlx(rename = "listId")]
    pub list_id: String,
    #[sqlx(rename = "itemId")]
    pub item_id: String,
    pub content: String,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait ListStore: Send + Sync + 'static {
    async fn get_list(&self, user: &UserId, list_id: &str) -> Result<Option<ListRow>, RepoError>;

    async fn get_lists(&self, user: &UserId) -> Result<Vec<ListRow>, RepoError>;

    async fn get_list_items(&self, user: &UserId, list_id: &str)
    -> Result<Vec<ItemRow>, RepoError>;

    async fn get_all_items(&self, user: &UserId) -> Result<Vec<ItemRow>, RepoError>;

    // Fails with `RepoError::Conflict` when the list id is taken.
    async fn insert_list(
        &self,
        user: &UserId,
        list_id: &str,
        title: &str,
    ) -> Result<ListRow, RepoError>;

    // Fails with `RepoError::Conflict` when the item id is taken within the list.
    async fn insert_item(
        &self,
        user: &UserId,
        list_id: &str,
        item_id: &str,
        content: &str,
    ) -> Result<ItemRow, RepoError>;
}
