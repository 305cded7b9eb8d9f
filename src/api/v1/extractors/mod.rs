/*
 * Responsibility
 * - Extractors exposed to v1 handlers
 */
pub mod identity;

pub use identity::CurrentUser;
