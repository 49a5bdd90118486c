//! Comments repository

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool as Pool;

use super::query::{Entity, EntityQuery, Order};
use super::sqlite_helpers::{fold_case, new_id, now_iso8601};
use crate::error::{ApiError, ApiResult};
use crate::services::criteria::Predicate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: String,
    pub text: String,
    pub author_id: String,
    pub post_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Entity for CommentRecord {
    const TABLE_NAME: &'static str = "comments";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "text",
        "author_id",
        "post_id",
        "created_at",
        "updated_at",
    ];
    const FOLDED: &'static [&'static str] = &["text"];
    const SORTABLE: &'static [&'static str] = &["text", "created_at", "updated_at"];
}

#[derive(Debug, Clone)]
pub struct CreateComment {
    pub text: String,
    pub author_id: String,
    pub post_id: String,
}

pub struct CommentsRepository {
    pool: Pool,
}

impl CommentsRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, comment: CreateComment) -> ApiResult<CommentRecord> {
        let id = new_id();
        let now = now_iso8601();

        sqlx::query(
            r#"
            INSERT INTO comments (id, text, text_fold, author_id, post_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&comment.text)
        .bind(fold_case(&comment.text))
        .bind(&comment.author_id)
        .bind(&comment.post_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Failed to create comment")))
    }

    pub async fn get_by_id(&self, id: &str) -> ApiResult<Option<CommentRecord>> {
        self.find_first(&Predicate::eq_exact("id", id)).await
    }

    pub async fn find_first(&self, predicate: &Predicate) -> ApiResult<Option<CommentRecord>> {
        EntityQuery::<CommentRecord>::new()
            .filter(predicate)?
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_many(
        &self,
        predicate: &Predicate,
        order: Option<Order>,
        offset: u64,
        limit: Option<u64>,
    ) -> ApiResult<Vec<CommentRecord>> {
        EntityQuery::<CommentRecord>::new()
            .filter(predicate)?
            .order_by(order)?
            .offset(offset)
            .limit(limit)
            .fetch_all(&self.pool)
            .await
    }

    /// Update the text of a comment, returning the new state
    pub async fn update_text(&self, id: &str, text: &str) -> ApiResult<Option<CommentRecord>> {
        let result = sqlx::query(
            "UPDATE comments SET text = ?, text_fold = ?, updated_at = ? WHERE id = ?",
        )
        .bind(text)
        .bind(fold_case(text))
        .bind(now_iso8601())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a comment, returning the deleted row
    pub async fn delete(&self, id: &str) -> ApiResult<Option<CommentRecord>> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, CommentRecord>(&format!(
            "{} WHERE id = ?",
            CommentRecord::select_sql()
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            sqlx::query("DELETE FROM comments WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(existing)
    }
}
