//! Blog API - GraphQL service for users, posts and comments
//!
//! All operations are exposed via GraphQL at /graphql, subscriptions over
//! WebSocket at /graphql/ws.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::graphql::BlogSchema;
use crate::services::BlogService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<BlogService>,
    pub schema: BlogSchema,
}

impl AppState {
    pub fn new(blog: Arc<BlogService>) -> Self {
        let schema = graphql::build_schema(blog.clone());
        Self { blog, schema }
    }
}

/// Build the HTTP router - GraphQL is the primary API
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health endpoints (no auth required)
        .merge(api::health::router())
        // GraphQL endpoint (queries and mutations)
        .route(
            "/graphql",
            get(api::graphql::graphiql).post(api::graphql::graphql_handler),
        )
        // GraphQL WebSocket endpoint for subscriptions
        .route("/graphql/ws", get(api::graphql::graphql_ws_handler))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
