/*
 * Responsibility
 * - lists / items tables via SQLx
 * - Every query is scoped by "userId"
 */
use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::error::RepoError;
use crate::repos::store::{ItemRow, ListRow, ListStore};
use crate::services::auth::UserId;

#[derive(Debug, Clone)]
pub struct PgListStore {
    db: PgPool,
}

impl PgListStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.db).await
    }
}

#[async_trait]
impl ListStore for PgListStore {
    async fn get_list(&self, user: &UserId, list_id: &str) -> Result<Option<ListRow>, RepoError> {
        let row = sqlx::query_as::<_, ListRow>(
            r#"
            SELECT "userId", "listId", title, "createdAt"
            FROM lists
            WHERE "userId" = $1 AND "listId" = $2
            "#,
        )
        .bind(user.as_str())
        .bind(list_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn get_lists(&self, user: &UserId) -> Result<Vec<ListRow>, RepoError> {
        let rows = sqlx::query_as::<_, ListRow>(
            r#"
            SELECT "userId", "listId", title, "createdAt"
            FROM lists
            WHERE "userId" = $1
            ORDER BY "listId"
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn get_list_items(
        &self,
        user: &UserId,
        list_id: &str,
    ) -> Result<Vec<ItemRow>, RepoError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT "userId", "listId", "itemId", content, "createdAt"
            FROM items
            WHERE "userId" = $1 AND "listId" = $2
            ORDER BY "itemId"
            "#,
        )
        .bind(user.as_str())
        .bind(list_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn get_all_items(&self, user: &UserId) -> Result<Vec<ItemRow>, RepoError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT "userId", "listId", "itemId", content, "createdAt"
            FROM items
            WHERE "userId" = $1
            ORDER BY "listId", "itemId"
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn insert_list(
        &self,
        user: &UserId,
        list_id: &str,
        title: &str,
    ) -> Result<ListRow, RepoError> {
        let row = sqlx::query_as::<_, ListRow>(
            r#"
            INSERT INTO lists ("userId", "listId", title)
            VALUES ($1, $2, $3)
            RETURNING "userId", "listId", title, "createdAt"
            "#,
        )
        .bind(user.as_str())
        .bind(list_id)
        .bind(title)
        .fetch_one(&self.db)
        .await
        .map_err(|e| RepoError::from_sqlx(e, "list"))?;

        Ok(row)
    }

    async fn insert_item(
        &self,
        user: &UserId,
        list_id: &str,
        item_id: &str,
        content: &str,
    ) -> Result<ItemRow, RepoError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO items ("userId", "listId", "itemId", content)
            VALUES ($1, $2, $3, $4)
            RETURNING "userId", "listId", "itemId", content, "createdAt"
            "#,
        )
        .bind(user.as_str())
        .bind(list_id)
        .bind(item_id)
        .bind(content)
        .fetch_one(&self.db)
        .await
        .map_err(|e| RepoError::from_sqlx(e, "item"))?;

        Ok(row)
    }
}
