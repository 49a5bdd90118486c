//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use blog_api::db::{Database, PostRecord, UserRecord};
use blog_api::services::{
    AuthConfig, BlogService, EventRouter, NewPost, NewUser,
};

pub const SECRET: &str = "integration-test-secret";

/// Blog service over a fresh in-memory database
pub async fn blog() -> Arc<BlogService> {
    let db = Database::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory database");
    db.init_schema().await.expect("schema");

    let config = AuthConfig {
        jwt_secret: SECRET.to_string(),
        bcrypt_cost: 4,
    };
    Arc::new(BlogService::new(db, EventRouter::new(), &config))
}

/// Sign up a user, returning the record and a ready-to-use header value
pub async fn sign_up(blog: &BlogService, name: &str) -> (UserRecord, String) {
    let session = blog
        .create_user(NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: "correct horse battery".to_string(),
        })
        .await
        .expect("sign up");
    (session.user, format!("Bearer {}", session.token))
}

pub async fn write_post(blog: &BlogService, auth: &str, title: &str, published: bool) -> PostRecord {
    blog.create_post(
        Some(auth),
        NewPost {
            title: title.to_string(),
            body: format!("Body of {}", title),
            published: Some(published),
        },
    )
    .await
    .expect("create post")
}
