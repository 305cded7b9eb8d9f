/*
 * Responsibility
 * - Shared context for handlers (AppState)
 * - Clone is cheap (Arc inside)
 */
use std::sync::Arc;

use crate::repos::ListStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ListStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ListStore>) -> Self {
        Self { store }
    }
}
