/*
 * Responsibility
 * - Public interface of the middleware layers
 * - auth: identity middleware in front of /api/v1
 * - http: transport concerns for the whole router
 */
pub mod auth;
pub mod http;
