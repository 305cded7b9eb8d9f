/*
 * Responsibility
 * - v1 URL structure
 * - The identity middleware is applied by the caller around the whole set
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{
    items::{get_all_items, get_list_items, insert_item},
    lists::{get_list, get_lists, insert_list},
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(get_all_items))
        .route("/lists", get(get_lists).put(insert_list))
        .route("/lists/{list_id}", get(get_list))
        .route(
            "/lists/{list_id}/items",
            get(get_list_items).put(insert_item),
        )
}
