/*
 * Responsibility
 * - Items request/response DTO
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lists::validate_id;
use crate::repos::ItemRow;

pub const MAX_CONTENT_LEN: usize = 4096;

#[derive(Debug, Deserialize)]
pub struct InsertItemRequest {
    // Generated when omitted.
    pub item_id: Option<String>,
    pub content: String,
}

impl InsertItemRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(id) = &self.item_id {
            validate_id(id, "item_id cannot be blank", "item_id must be <= 128 chars")?;
        }
        if self.content.trim().is_empty() {
            return Err("content is required");
        }
        if self.content.chars().count() > MAX_CONTENT_LEN {
            return Err("content must be <= 4096 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub list_id: String,
    pub item_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<ItemRow> for ItemResponse {
    fn from(row: ItemRow) -> Self {
        Self {
            list_id: row.list_id,
            item_id: row.item_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}
