/*
 * Responsibility
 * - /lists handlers
 * - The owner is always the verified caller; never taken from path or body
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::dto::lists::{InsertListRequest, ListResponse},
    api::v1::extractors::CurrentUser,
    error::AppError,
    state::AppState,
};

pub async fn get_lists(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> Result<Json<Vec<ListResponse>>, AppError> {
    let rows = state.store.get_lists(&me.user_id).await?;
    Ok(Json(rows.into_iter().map(ListResponse::from).collect()))
}

pub async fn get_list(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(list_id): Path<String>,
) -> Result<Json<ListResponse>, AppError> {
    let row = state
        .store
        .get_list(&me.user_id, &list_id)
        .await?
        .ok_or(AppError::not_found("list"))?;

    Ok(Json(row.into()))
}

pub async fn insert_list(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Json(req): Json<InsertListRequest>,
) -> Result<(StatusCode, Json<ListResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_LIST", msg))?;

    let list_id = req
        .list_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let row = state
        .store
        .insert_list(&me.user_id, &list_id, req.title.trim())
        .await?;

    tracing::info!(user_id = %me.user_id, list_id = %row.list_id, "list created");
    Ok((StatusCode::CREATED, Json(row.into())))
}
