//! Users repository

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool as Pool;

use super::query::{Entity, EntityQuery};
use super::sqlite_helpers::{fold_case, is_unique_violation, new_id, now_iso8601};
use crate::error::{ApiError, ApiResult};
use crate::services::criteria::Predicate;

// ============================================================================
// User Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    /// bcrypt hash, never the clear-text password
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Entity for UserRecord {
    const TABLE_NAME: &'static str = "users";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "email", "password", "created_at", "updated_at"];
    const FOLDED: &'static [&'static str] = &["name", "email"];
    const SORTABLE: &'static [&'static str] = &["name", "email", "created_at", "updated_at"];
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

// ============================================================================
// Repository
// ============================================================================

pub struct UsersRepository {
    pool: Pool,
}

impl UsersRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, user: CreateUser) -> ApiResult<UserRecord> {
        let id = new_id();
        let now = now_iso8601();

        sqlx::query(
            r#"
            INSERT INTO users
                (id, name, name_fold, email, email_fold, password, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.name)
        .bind(fold_case(&user.name))
        .bind(&user.email)
        .bind(fold_case(&user.email))
        .bind(&user.password_hash)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(email_conflict)?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Failed to create user")))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: &str) -> ApiResult<Option<UserRecord>> {
        EntityQuery::<UserRecord>::new()
            .filter(&Predicate::eq_exact("id", id))?
            .fetch_optional(&self.pool)
            .await
    }

    /// Get user by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> ApiResult<Option<UserRecord>> {
        EntityQuery::<UserRecord>::new()
            .filter(&Predicate::equals("email", email))?
            .fetch_optional(&self.pool)
            .await
    }

    /// Update a user, returning the new state or `None` if it does not exist
    pub async fn update(&self, id: &str, update: UpdateUser) -> ApiResult<Option<UserRecord>> {
        let now = now_iso8601();

        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE(?, name),
                name_fold = COALESCE(?, name_fold),
                email = COALESCE(?, email),
                email_fold = COALESCE(?, email_fold),
                password = COALESCE(?, password),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(update.name.as_deref().map(fold_case))
        .bind(&update.email)
        .bind(update.email.as_deref().map(fold_case))
        .bind(&update.password_hash)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(email_conflict)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a user (posts and comments cascade), returning the deleted row
    pub async fn delete(&self, id: &str) -> ApiResult<Option<UserRecord>> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, UserRecord>(&format!(
            "{} WHERE id = ?",
            UserRecord::select_sql()
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(existing)
    }
}

fn email_conflict(err: sqlx::Error) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::validation("Email already in use")
    } else {
        ApiError::Database(err)
    }
}
