//! HTTP route handlers
//!
//! The primary API is GraphQL at /graphql; plain HTTP routes cover health
//! probes only.

pub mod graphql;
pub mod health;
