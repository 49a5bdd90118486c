//! Blog service: the operations behind every GraphQL resolver
//!
//! Each operation takes the caller's raw `authorization` value, resolves the
//! identity itself, applies criteria and pagination for reads, and publishes
//! mutation events once the store has committed.

use serde::Serialize;

use crate::db::{
    CommentRecord, CreateComment, CreatePost, CreateUser, Database, Entity, EntityQuery, Order,
    PostRecord, UpdatePost, UpdateUser, UserRecord,
};
use crate::error::{ApiError, ApiResult};
use crate::services::auth::{AuthConfig, Identity, IdentityResolver, PasswordHasher, TokenCodec};
use crate::services::criteria::{CriteriaValue, Predicate, build_criteria, post_visibility};
use crate::services::events::{
    EventRouter, MutationEvent, MutationKind, Subscription, Topic, comment_topics, post_topics,
};
use crate::services::paginator::{PageLink, compute_window};

/// Fields matched by the free-text `filter` argument, per entity
pub const USER_SEARCH_FIELDS: &[&str] = &["name"];
pub const POST_SEARCH_FIELDS: &[&str] = &["title", "body"];
pub const COMMENT_SEARCH_FIELDS: &[&str] = &["text"];

// ============================================================================
// Arguments and results
// ============================================================================

/// Arguments shared by every list query
#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    /// Free-text search term
    pub filter: Option<String>,
    /// Exact-match constraints
    pub limit: Vec<(&'static str, CriteriaValue)>,
    pub page: Option<i64>,
    pub take: Option<i64>,
    pub order: Option<Order>,
}

/// Links to the neighbouring pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub previous: Option<PageLink>,
    pub next: Option<PageLink>,
}

/// One page of a list query
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Number of rows matching the criteria, across all pages
    pub count: u64,
    /// Present only when at least one neighbouring page exists
    pub pagination: Option<PageLinks>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub published: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub post_id: String,
}

/// A user together with a freshly issued token
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: UserRecord,
    pub token: String,
}

// ============================================================================
// Service
// ============================================================================

pub struct BlogService {
    db: Database,
    events: EventRouter<MutationEvent>,
    identity: IdentityResolver,
    passwords: PasswordHasher,
}

impl BlogService {
    pub fn new(db: Database, events: EventRouter<MutationEvent>, config: &AuthConfig) -> Self {
        Self {
            db,
            events,
            identity: IdentityResolver::new(TokenCodec::new(&config.jwt_secret)),
            passwords: PasswordHasher::new(config.bcrypt_cost),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn events(&self) -> &EventRouter<MutationEvent> {
        &self.events
    }

    pub fn identity(&self) -> &IdentityResolver {
        &self.identity
    }

    /// Resolve a caller that must be authenticated and still exist
    async fn require_user(&self, authorization: Option<&str>) -> ApiResult<UserRecord> {
        let identity = self.identity.require(authorization)?;
        self.db
            .users()
            .get_by_id(&identity.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    async fn list_page<E: Entity>(&self, predicate: Predicate, args: &ListArgs) -> ApiResult<Page<E>> {
        let pool = self.db.pool();
        let count = EntityQuery::<E>::new().filter(&predicate)?.count(pool).await?;
        let window = compute_window(count, args.page, args.take)?;

        let results = EntityQuery::<E>::new()
            .filter(&predicate)?
            .order_by(args.order)?
            .offset(window.offset)
            .limit(window.page_size)
            .fetch_all(pool)
            .await?;

        let pagination = window.has_links().then(|| PageLinks {
            previous: window.previous,
            next: window.next,
        });

        Ok(Page {
            count,
            pagination,
            results,
        })
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub async fn users(&self, args: &ListArgs) -> ApiResult<Page<UserRecord>> {
        let predicate = build_criteria(&args.limit, args.filter.as_deref(), USER_SEARCH_FIELDS);
        self.list_page(predicate, args).await
    }

    /// Published posts of every author
    pub async fn posts(&self, args: &ListArgs) -> ApiResult<Page<PostRecord>> {
        let predicate = build_criteria(&args.limit, args.filter.as_deref(), POST_SEARCH_FIELDS)
            .and_also(Predicate::eq_exact("published", true));
        self.list_page(predicate, args).await
    }

    /// The caller's posts, drafts included
    pub async fn my_posts(
        &self,
        authorization: Option<&str>,
        args: &ListArgs,
    ) -> ApiResult<Page<PostRecord>> {
        let user = self.require_user(authorization).await?;
        let predicate = build_criteria(&args.limit, args.filter.as_deref(), POST_SEARCH_FIELDS)
            .and_also(Predicate::eq_exact("author_id", user.id.as_str()));
        self.list_page(predicate, args).await
    }

    pub async fn comments(&self, args: &ListArgs) -> ApiResult<Page<CommentRecord>> {
        let predicate = build_criteria(&args.limit, args.filter.as_deref(), COMMENT_SEARCH_FIELDS);
        self.list_page(predicate, args).await
    }

    /// A single post, if published or owned by the caller
    pub async fn post(&self, authorization: Option<&str>, id: &str) -> ApiResult<PostRecord> {
        let viewer = self.identity.resolve(authorization, false)?;
        self.db
            .posts()
            .find_first(&post_visibility(id, viewer.as_ref()))
            .await?
            .ok_or_else(|| ApiError::not_found("Unable to fetch post"))
    }

    pub async fn me(&self, authorization: Option<&str>) -> ApiResult<UserRecord> {
        self.require_user(authorization).await
    }

    // ------------------------------------------------------------------------
    // Relations
    // ------------------------------------------------------------------------

    /// Published posts written by `user_id`
    pub async fn user_posts(&self, user_id: &str) -> ApiResult<Vec<PostRecord>> {
        let predicate = Predicate::And(vec![
            Predicate::eq_exact("author_id", user_id),
            Predicate::eq_exact("published", true),
        ]);
        self.db.posts().find_many(&predicate, None, 0, None).await
    }

    pub async fn user_comments(&self, user_id: &str) -> ApiResult<Vec<CommentRecord>> {
        self.db
            .comments()
            .find_many(&Predicate::eq_exact("author_id", user_id), None, 0, None)
            .await
    }

    pub async fn post_comments(&self, post_id: &str) -> ApiResult<Vec<CommentRecord>> {
        self.db
            .comments()
            .find_many(&Predicate::eq_exact("post_id", post_id), None, 0, None)
            .await
    }

    pub async fn user_by_id(&self, id: &str) -> ApiResult<Option<UserRecord>> {
        self.db.users().get_by_id(id).await
    }

    pub async fn post_by_id(&self, id: &str) -> ApiResult<Option<PostRecord>> {
        self.db.posts().get_by_id(id).await
    }

    // ------------------------------------------------------------------------
    // User mutations
    // ------------------------------------------------------------------------

    pub async fn create_user(&self, input: NewUser) -> ApiResult<AuthSession> {
        let password_hash = self.passwords.hash(&input.password)?;
        let user = self
            .db
            .users()
            .create(CreateUser {
                name: input.name,
                email: input.email,
                password_hash,
            })
            .await?;

        let token = self.identity.codec().issue(&user.id)?;
        tracing::info!(user_id = %user.id, "User created");

        Ok(AuthSession { user, token })
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthSession> {
        let login_failed = || ApiError::AuthenticationFailed("Unable to login".to_string());

        let user = self
            .db
            .users()
            .get_by_email(email)
            .await?
            .ok_or_else(login_failed)?;

        if !self.passwords.verify(password, &user.password) {
            tracing::debug!(user_id = %user.id, "Login rejected");
            return Err(login_failed());
        }

        let token = self.identity.codec().issue(&user.id)?;
        Ok(AuthSession { user, token })
    }

    pub async fn update_user(
        &self,
        authorization: Option<&str>,
        changes: UserChanges,
    ) -> ApiResult<UserRecord> {
        let identity = self.identity.require(authorization)?;
        let password_hash = changes
            .password
            .as_deref()
            .map(|password| self.passwords.hash(password))
            .transpose()?;

        self.db
            .users()
            .update(
                &identity.user_id,
                UpdateUser {
                    name: changes.name,
                    email: changes.email,
                    password_hash,
                },
            )
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    /// Delete the caller's account with all of their posts and comments
    pub async fn delete_user(&self, authorization: Option<&str>) -> ApiResult<UserRecord> {
        let identity = self.identity.require(authorization)?;
        let user = self
            .db
            .users()
            .delete(&identity.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        tracing::info!(user_id = %user.id, "User deleted");
        Ok(user)
    }

    // ------------------------------------------------------------------------
    // Post mutations
    // ------------------------------------------------------------------------

    fn publish_post(&self, kind: MutationKind, post: &PostRecord) {
        let topics = post_topics(post);
        self.events
            .publish_all(&topics, MutationEvent::post(kind, post.clone()));
    }

    fn publish_comment(&self, kind: MutationKind, comment: &CommentRecord) {
        let topics = comment_topics(comment);
        self.events
            .publish_all(&topics, MutationEvent::comment(kind, comment.clone()));
    }

    pub async fn create_post(
        &self,
        authorization: Option<&str>,
        input: NewPost,
    ) -> ApiResult<PostRecord> {
        let user = self.require_user(authorization).await?;
        let post = self
            .db
            .posts()
            .create(CreatePost {
                title: input.title,
                body: input.body,
                published: input.published.unwrap_or(false),
                author_id: user.id,
            })
            .await?;

        self.publish_post(MutationKind::Created, &post);
        Ok(post)
    }

    /// Update one of the caller's posts. Unpublishing removes its comments.
    pub async fn update_post(
        &self,
        authorization: Option<&str>,
        id: &str,
        changes: UpdatePost,
    ) -> ApiResult<PostRecord> {
        let identity = self.identity.require(authorization)?;
        let unable = || ApiError::not_found("Unable to update post");

        let posts = self.db.posts();
        posts
            .find_owned(id, &identity.user_id)
            .await?
            .ok_or_else(unable)?;

        let post = posts.update(id, changes).await?.ok_or_else(unable)?;

        self.publish_post(MutationKind::Updated, &post);
        Ok(post)
    }

    pub async fn delete_post(&self, authorization: Option<&str>, id: &str) -> ApiResult<PostRecord> {
        let identity = self.identity.require(authorization)?;
        let unable = || ApiError::not_found("Unable to delete post");

        let posts = self.db.posts();
        posts
            .find_owned(id, &identity.user_id)
            .await?
            .ok_or_else(unable)?;

        let post = posts.delete(id).await?.ok_or_else(unable)?;

        self.publish_post(MutationKind::Deleted, &post);
        Ok(post)
    }

    // ------------------------------------------------------------------------
    // Comment mutations
    // ------------------------------------------------------------------------

    /// Comment on a published post
    pub async fn create_comment(
        &self,
        authorization: Option<&str>,
        input: NewComment,
    ) -> ApiResult<CommentRecord> {
        let user = self.require_user(authorization).await?;

        let published = Predicate::And(vec![
            Predicate::eq_exact("id", input.post_id.as_str()),
            Predicate::eq_exact("published", true),
        ]);
        let post = self
            .db
            .posts()
            .find_first(&published)
            .await?
            .ok_or_else(|| ApiError::not_found("Post not found"))?;

        let comment = self
            .db
            .comments()
            .create(CreateComment {
                text: input.text,
                author_id: user.id,
                post_id: post.id,
            })
            .await?;

        self.publish_comment(MutationKind::Created, &comment);
        Ok(comment)
    }

    /// Edit one of the caller's own comments
    pub async fn update_comment(
        &self,
        authorization: Option<&str>,
        id: &str,
        text: String,
    ) -> ApiResult<CommentRecord> {
        let identity = self.identity.require(authorization)?;
        let unable = || ApiError::not_found("Unable to update comment");

        let comments = self.db.comments();
        let owned = Predicate::And(vec![
            Predicate::eq_exact("id", id),
            Predicate::eq_exact("author_id", identity.user_id.as_str()),
        ]);
        comments.find_first(&owned).await?.ok_or_else(unable)?;

        let comment = comments.update_text(id, &text).await?.ok_or_else(unable)?;

        self.publish_comment(MutationKind::Updated, &comment);
        Ok(comment)
    }

    /// Delete a comment the caller wrote, or any comment on the caller's post
    pub async fn delete_comment(
        &self,
        authorization: Option<&str>,
        id: &str,
    ) -> ApiResult<CommentRecord> {
        let identity = self.identity.require(authorization)?;
        let unable = || ApiError::not_found("Unable to delete comment");

        let comments = self.db.comments();
        let comment = comments.get_by_id(id).await?.ok_or_else(unable)?;

        if !self.may_delete_comment(&identity, &comment).await? {
            return Err(unable());
        }

        let comment = comments.delete(id).await?.ok_or_else(unable)?;

        self.publish_comment(MutationKind::Deleted, &comment);
        Ok(comment)
    }

    async fn may_delete_comment(
        &self,
        identity: &Identity,
        comment: &CommentRecord,
    ) -> ApiResult<bool> {
        if comment.author_id == identity.user_id {
            return Ok(true);
        }

        let post_owner = self
            .db
            .posts()
            .find_owned(&comment.post_id, &identity.user_id)
            .await?;
        Ok(post_owner.is_some())
    }

    // ------------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------------

    /// Mutations of published posts
    pub fn subscribe_posts(&self) -> Subscription<MutationEvent> {
        self.events.subscribe(Topic::Posts)
    }

    /// Every mutation of the caller's posts, drafts included
    pub async fn subscribe_my_posts(
        &self,
        authorization: Option<&str>,
    ) -> ApiResult<Subscription<MutationEvent>> {
        let user = self.require_user(authorization).await?;
        Ok(self.events.subscribe(Topic::UserPosts(user.id)))
    }

    /// Comment mutations on one post
    pub async fn subscribe_comments(&self, post_id: &str) -> ApiResult<Subscription<MutationEvent>> {
        let post = self
            .db
            .posts()
            .get_by_id(post_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Post not found"))?;
        Ok(self.events.subscribe(Topic::PostComments(post.id)))
    }
}
