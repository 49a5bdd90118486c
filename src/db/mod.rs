//! Database connection and operations

pub mod comments;
pub mod posts;
pub mod query;
pub mod sqlite_helpers;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use comments::{CommentRecord, CommentsRepository, CreateComment};
pub use posts::{CreatePost, PostRecord, PostsRepository, UpdatePost};
pub use query::{Entity, EntityQuery, Order};
pub use users::{CreateUser, UpdateUser, UserRecord, UsersRepository};

/// Schema, one statement per entry. Deleting a user removes their posts and
/// comments; deleting a post removes its comments. Each `*_fold` column holds
/// the case-folded copy of the column it is named after.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        name_fold TEXT NOT NULL,
        email TEXT NOT NULL,
        email_fold TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        title_fold TEXT NOT NULL,
        body TEXT NOT NULL,
        body_fold TEXT NOT NULL,
        published BOOLEAN NOT NULL DEFAULT 0,
        author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id TEXT PRIMARY KEY NOT NULL,
        text TEXT NOT NULL,
        text_fold TEXT NOT NULL,
        author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id)",
    "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id)",
    "CREATE INDEX IF NOT EXISTS idx_comments_author ON comments(author_id)",
];

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn connect_options(url: &str) -> Result<SqliteConnectOptions> {
        Ok(SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database URL: {}", url))?
            .create_if_missing(true)
            .foreign_keys(true))
    }

    /// Create a new database connection pool
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = Self::connect_options(url)?;

        // An in-memory database lives as long as its connection
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(Duration::from_secs(10))
                .connect_with(options)
                .await?
        };

        Ok(Self { pool })
    }

    /// Connect, retrying every `retry_interval` until successful
    pub async fn connect_with_retry(
        url: &str,
        max_connections: u32,
        retry_interval: Duration,
    ) -> Result<Self> {
        // Bad URLs never become good; fail fast on them
        Self::connect_options(url)?;

        loop {
            match Self::connect(url, max_connections).await {
                Ok(db) => return Ok(db),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        retry_in_secs = retry_interval.as_secs(),
                        "Database connection failed, retrying"
                    );
                    tokio::time::sleep(retry_interval).await;
                }
            }
        }
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to apply schema")?;
        }
        tracing::info!("Database schema ready");
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a users repository
    pub fn users(&self) -> UsersRepository {
        UsersRepository::new(self.pool.clone())
    }

    /// Get a posts repository
    pub fn posts(&self) -> PostsRepository {
        PostsRepository::new(self.pool.clone())
    }

    /// Get a comments repository
    pub fn comments(&self) -> CommentsRepository {
        CommentsRepository::new(self.pool.clone())
    }

    /// Liveness of the store
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
