//! GraphQL API with subscriptions for real-time updates
//!
//! This module provides a GraphQL API using async-graphql with support for
//! queries, mutations, and subscriptions over WebSocket. Resolvers are thin:
//! they convert inputs, call [`crate::services::BlogService`] with the
//! caller's [`Credentials`] and convert the result back.
//!
//! Queries and mutations live in per-entity modules under `queries/` and
//! `mutations/`, merged into the roots in `schema.rs`.

pub mod auth;
pub mod filters;
mod helpers;
pub mod mutations;
pub mod pagination;
pub mod queries;
mod schema;
mod subscriptions;
pub mod types;

pub use auth::{AuthExt, Credentials};
pub use schema::{BlogSchema, build_schema};
