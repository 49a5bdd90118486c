//! GraphQL object and input types

use std::sync::Arc;

use async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject};

use crate::db::{CommentRecord, PostRecord, UpdatePost, UserRecord};
use crate::error::{ApiError, IntoGraphql};
use crate::services::{
    AuthSession, BlogService, MutationEvent, MutationKind, NewComment, NewPost, NewUser,
    UserChanges,
};
use crate::services::events::EventPayload;

// ============================================================================
// Entities
// ============================================================================

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            email: r.email,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[ComplexObject]
impl User {
    /// Published posts by this user
    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<Post>> {
        let blog = ctx.data_unchecked::<Arc<BlogService>>();
        let posts = blog.user_posts(&self.id).await.into_gql()?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    async fn comments(&self, ctx: &Context<'_>) -> Result<Vec<Comment>> {
        let blog = ctx.data_unchecked::<Arc<BlogService>>();
        let comments = blog.user_comments(&self.id).await.into_gql()?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub body: String,
    pub published: bool,
    #[graphql(skip)]
    pub author_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PostRecord> for Post {
    fn from(r: PostRecord) -> Self {
        Self {
            id: r.id,
            title: r.title,
            body: r.body,
            published: r.published,
            author_id: r.author_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[ComplexObject]
impl Post {
    async fn author(&self, ctx: &Context<'_>) -> Result<User> {
        let blog = ctx.data_unchecked::<Arc<BlogService>>();
        blog.user_by_id(&self.author_id)
            .await
            .and_then(|user| user.ok_or_else(|| ApiError::not_found("User not found")))
            .map(User::from)
            .into_gql()
    }

    async fn comments(&self, ctx: &Context<'_>) -> Result<Vec<Comment>> {
        let blog = ctx.data_unchecked::<Arc<BlogService>>();
        let comments = blog.post_comments(&self.id).await.into_gql()?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Comment {
    pub id: String,
    pub text: String,
    #[graphql(skip)]
    pub author_id: String,
    #[graphql(skip)]
    pub post_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CommentRecord> for Comment {
    fn from(r: CommentRecord) -> Self {
        Self {
            id: r.id,
            text: r.text,
            author_id: r.author_id,
            post_id: r.post_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[ComplexObject]
impl Comment {
    async fn author(&self, ctx: &Context<'_>) -> Result<User> {
        let blog = ctx.data_unchecked::<Arc<BlogService>>();
        blog.user_by_id(&self.author_id)
            .await
            .and_then(|user| user.ok_or_else(|| ApiError::not_found("User not found")))
            .map(User::from)
            .into_gql()
    }

    async fn post(&self, ctx: &Context<'_>) -> Result<Post> {
        let blog = ctx.data_unchecked::<Arc<BlogService>>();
        blog.post_by_id(&self.post_id)
            .await
            .and_then(|post| post.ok_or_else(|| ApiError::not_found("Post not found")))
            .map(Post::from)
            .into_gql()
    }
}

/// Result of signing up or logging in
#[derive(SimpleObject, Clone, Debug)]
pub struct AuthPayload {
    pub user: User,
    /// Bearer token, valid for 30 days
    pub token: String,
}

impl From<AuthSession> for AuthPayload {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.into(),
            token: session.token,
        }
    }
}

crate::define_page!(UserPage, User);
crate::define_page!(PostPage, Post);
crate::define_page!(CommentPage, Comment);

// ============================================================================
// Subscription payloads
// ============================================================================

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum MutationType {
    Created,
    Updated,
    Deleted,
}

impl From<MutationKind> for MutationType {
    fn from(kind: MutationKind) -> Self {
        match kind {
            MutationKind::Created => MutationType::Created,
            MutationKind::Updated => MutationType::Updated,
            MutationKind::Deleted => MutationType::Deleted,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct PostSubscriptionPayload {
    pub mutation: MutationType,
    pub data: Post,
}

impl PostSubscriptionPayload {
    /// Payload for a post event; `None` for other event kinds
    pub fn from_event(event: MutationEvent) -> Option<Self> {
        match event.payload {
            EventPayload::Post(post) => Some(Self {
                mutation: event.kind.into(),
                data: post.into(),
            }),
            EventPayload::Comment(_) => None,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct CommentSubscriptionPayload {
    pub mutation: MutationType,
    pub data: Comment,
}

impl CommentSubscriptionPayload {
    /// Payload for a comment event; `None` for other event kinds
    pub fn from_event(event: MutationEvent) -> Option<Self> {
        match event.payload {
            EventPayload::Comment(comment) => Some(Self {
                mutation: event.kind.into(),
                data: comment.into(),
            }),
            EventPayload::Post(_) => None,
        }
    }
}

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, InputObject)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    /// At least 8 characters
    pub password: String,
}

impl From<CreateUserInput> for NewUser {
    fn from(input: CreateUserInput) -> Self {
        Self {
            name: input.name,
            email: input.email,
            password: input.password,
        }
    }
}

#[derive(Debug, InputObject)]
pub struct LoginUserInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, InputObject)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserInput> for UserChanges {
    fn from(input: UpdateUserInput) -> Self {
        Self {
            name: input.name,
            email: input.email,
            password: input.password,
        }
    }
}

#[derive(Debug, InputObject)]
pub struct CreatePostInput {
    pub title: String,
    pub body: String,
    /// Drafts unless set
    pub published: Option<bool>,
}

impl From<CreatePostInput> for NewPost {
    fn from(input: CreatePostInput) -> Self {
        Self {
            title: input.title,
            body: input.body,
            published: input.published,
        }
    }
}

#[derive(Debug, Default, InputObject)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub body: Option<String>,
    /// Unpublishing a post deletes its comments
    pub published: Option<bool>,
}

impl From<UpdatePostInput> for UpdatePost {
    fn from(input: UpdatePostInput) -> Self {
        Self {
            title: input.title,
            body: input.body,
            published: input.published,
        }
    }
}

#[derive(Debug, InputObject)]
pub struct CreateCommentInput {
    pub text: String,
    /// Id of the (published) post to comment on
    pub post: String,
}

impl From<CreateCommentInput> for NewComment {
    fn from(input: CreateCommentInput) -> Self {
        Self {
            text: input.text,
            post_id: input.post,
        }
    }
}

#[derive(Debug, InputObject)]
pub struct UpdateCommentInput {
    pub text: String,
}
