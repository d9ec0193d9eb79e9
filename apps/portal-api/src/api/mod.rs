//! # HTTP Surface
//!
//! One module per resource, routed here.
//!
//! ## Route Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Public (no token)                                                      │
//! │    POST   /api/login                                                    │
//! │    GET    /api/categories                                               │
//! │    GET    /api/products                                                 │
//! │                                                                         │
//! │  Authenticated (any tier-holder)                                        │
//! │    POST   /api/orders                                                   │
//! │                                                                         │
//! │  Admin only                                                             │
//! │    GET    /api/users            POST   /api/users                       │
//! │    DELETE /api/users/{id}                                               │
//! │    POST   /api/categories       DELETE /api/categories/{id}  (cascade)  │
//! │    POST   /api/products         PUT    /api/products/{id}               │
//! │    DELETE /api/products/{id}    GET    /api/orders                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `require_auth` runs on every route and skips the public ones; admin
//! handlers check the flag themselves via `ensure_admin`.

use axum::routing::{delete, get, post, put};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/login", post(auth::login))
        .route(
            "/api/categories",
            get(categories::list).post(categories::create),
        )
        .route("/api/categories/{id}", delete(categories::remove))
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            put(products::update).delete(products::remove),
        )
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/{id}", delete(users::remove))
        .route("/api/orders", get(orders::list).post(orders::submit))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
