/*
 * Responsibility
 * - /items and /lists/{list_id}/items handlers
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::dto::items::{InsertItemRequest, ItemResponse},
    api::v1::extractors::CurrentUser,
    error::AppError,
    state::AppState,
};

pub async fn get_all_items(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    let rows = state.store.get_all_items(&me.user_id).await?;
    Ok(Json(rows.into_iter().map(ItemResponse::from).collect()))
}

pub async fn get_list_items(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(list_id): Path<String>,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    let rows = state.store.get_list_items(&me.user_id, &list_id).await?;
    Ok(Json(rows.into_iter().map(ItemResponse::from).collect()))
}

pub async fn insert_item(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(list_id): Path<String>,
    Json(req): Json<InsertItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_ITEM", msg))?;

    if state.store.get_list(&me.user_id, &list_id).await?.is_none() {
        return Err(AppError::not_found("list"));
    }

    let item_id = req
        .item_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let row = state
        .store
        .insert_item(&me.user_id, &list_id, &item_id, &req.content)
        .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}
