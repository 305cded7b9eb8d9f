/*
 * Responsibility
 * - Lists request/response DTO
 * - validate() checks shape only; ownership comes from CurrentUser
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::ListRow;

pub const MAX_ID_LEN: usize = 128;
pub const MAX_TITLE_LEN: usize = 256;

#[derive(Debug, Deserialize)]
pub struct InsertListRequest {
    // Generated when omitted.
    pub list_id: Option<String>,
    pub title: String,
}

impl InsertListRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(id) = &self.list_id {
            validate_id(id, "list_id cannot be blank", "list_id must be <= 128 chars")?;
        }
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err("title must be <= 256 chars");
        }
        Ok(())
    }
}

pub(crate) fn validate_id(
    id: &str,
    blank: &'static str,
    too_long: &'static str,
) -> Result<(), &'static str> {
    if id.trim().is_empty() {
        return Err(blank);
    }
    if id.chars().count() > MAX_ID_LEN {
        return Err(too_long);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub list_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl From<ListRow> for ListResponse {
    fn from(row: ListRow) -> Self {
        Self {
            list_id: row.list_id,
            title: row.title,
            created_at: row.created_at,
        }
    }
}
