//! Posts repository

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool as Pool;

use super::query::{Entity, EntityQuery, Order};
use super::sqlite_helpers::{fold_case, new_id, now_iso8601};
use crate::error::{ApiError, ApiResult};
use crate::services::criteria::Predicate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    pub body: String,
    pub published: bool,
    pub author_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Entity for PostRecord {
    const TABLE_NAME: &'static str = "posts";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "body",
        "published",
        "author_id",
        "created_at",
        "updated_at",
    ];
    const FOLDED: &'static [&'static str] = &["title", "body"];
    const SORTABLE: &'static [&'static str] =
        &["title", "body", "published", "created_at", "updated_at"];
}

#[derive(Debug, Clone)]
pub struct CreatePost {
    pub title: String,
    pub body: String,
    pub published: bool,
    pub author_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub body: Option<String>,
    pub published: Option<bool>,
}

pub struct PostsRepository {
    pool: Pool,
}

impl PostsRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, post: CreatePost) -> ApiResult<PostRecord> {
        let id = new_id();
        let now = now_iso8601();

        sqlx::query(
            r#"
            INSERT INTO posts
                (id, title, title_fold, body, body_fold, published, author_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&post.title)
        .bind(fold_case(&post.title))
        .bind(&post.body)
        .bind(fold_case(&post.body))
        .bind(post.published)
        .bind(&post.author_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Failed to create post")))
    }

    pub async fn get_by_id(&self, id: &str) -> ApiResult<Option<PostRecord>> {
        self.find_first(&Predicate::eq_exact("id", id)).await
    }

    pub async fn find_first(&self, predicate: &Predicate) -> ApiResult<Option<PostRecord>> {
        EntityQuery::<PostRecord>::new()
            .filter(predicate)?
            .fetch_optional(&self.pool)
            .await
    }

    /// Post `id` if it is owned by `author_id`
    pub async fn find_owned(&self, id: &str, author_id: &str) -> ApiResult<Option<PostRecord>> {
        self.find_first(&Predicate::And(vec![
            Predicate::eq_exact("id", id),
            Predicate::eq_exact("author_id", author_id),
        ]))
        .await
    }

    pub async fn find_many(
        &self,
        predicate: &Predicate,
        order: Option<Order>,
        offset: u64,
        limit: Option<u64>,
    ) -> ApiResult<Vec<PostRecord>> {
        EntityQuery::<PostRecord>::new()
            .filter(predicate)?
            .order_by(order)?
            .offset(offset)
            .limit(limit)
            .fetch_all(&self.pool)
            .await
    }

    /// Apply an update. When the post goes from published to unpublished its
    /// comments are deleted in the same transaction, before the new state
    /// becomes visible.
    pub async fn update(&self, id: &str, update: UpdatePost) -> ApiResult<Option<PostRecord>> {
        let mut tx = self.pool.begin().await?;
        let select = format!("{} WHERE id = ?", PostRecord::select_sql());

        let Some(current) = sqlx::query_as::<_, PostRecord>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let unpublishing = current.published && update.published == Some(false);
        let removed_comments = if unpublishing {
            sqlx::query("DELETE FROM comments WHERE post_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected()
        } else {
            0
        };

        sqlx::query(
            r#"
            UPDATE posts SET
                title = COALESCE(?, title),
                title_fold = COALESCE(?, title_fold),
                body = COALESCE(?, body),
                body_fold = COALESCE(?, body_fold),
                published = COALESCE(?, published),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.title)
        .bind(update.title.as_deref().map(fold_case))
        .bind(&update.body)
        .bind(update.body.as_deref().map(fold_case))
        .bind(update.published)
        .bind(now_iso8601())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let post = sqlx::query_as::<_, PostRecord>(&select)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        if removed_comments > 0 {
            tracing::info!(post_id = %id, removed_comments, "Unpublished post, comments removed");
        }

        Ok(Some(post))
    }

    /// Delete a post (comments cascade), returning the deleted row
    pub async fn delete(&self, id: &str) -> ApiResult<Option<PostRecord>> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, PostRecord>(&format!(
            "{} WHERE id = ?",
            PostRecord::select_sql()
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            sqlx::query("DELETE FROM posts WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(existing)
    }
}
