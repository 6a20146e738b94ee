//! Bunny Shop storefront library.
//!
//! JSON API over the shop database (catalog, users, carts, orders) and the
//! app-builder database (admin configuration). The binary in `main.rs` wires
//! this router to a listener; tests drive it directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin_config;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::Router;

use state::AppState;

/// Build the application router with its middleware stack.
///
/// Sentry layers are not included; the binary adds them outermost.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(middleware::trace_layer())
        .layer(middleware::cors_layer())
        .with_state(state)
}
