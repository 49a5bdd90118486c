//! GraphQL subscriptions for real-time updates
//!
//! Subscriptions allow clients to receive push updates over WebSocket. Each
//! one resolves the caller's identity when it starts, then streams events
//! from its topic until the client stops it or disconnects.

use async_graphql::{Context, Result, Subscription};
use futures::Stream;
use tokio_stream::StreamExt;

use crate::error::IntoGraphql;

use super::auth::AuthExt;
use super::types::{CommentSubscriptionPayload, PostSubscriptionPayload};

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Mutations of published posts
    async fn post(&self, ctx: &Context<'_>) -> impl Stream<Item = PostSubscriptionPayload> {
        ctx.blog()
            .subscribe_posts()
            .filter_map(PostSubscriptionPayload::from_event)
    }

    /// Every mutation of the caller's posts, drafts included
    async fn my_post(
        &self,
        ctx: &Context<'_>,
    ) -> Result<impl Stream<Item = PostSubscriptionPayload>> {
        let subscription = ctx
            .blog()
            .subscribe_my_posts(ctx.credentials())
            .await
            .into_gql()?;

        Ok(subscription.filter_map(PostSubscriptionPayload::from_event))
    }

    /// Comment mutations on one post
    async fn comment(
        &self,
        ctx: &Context<'_>,
        post_id: String,
    ) -> Result<impl Stream<Item = CommentSubscriptionPayload>> {
        let subscription = ctx
            .blog()
            .subscribe_comments(&post_id)
            .await
            .into_gql()?;

        Ok(subscription.filter_map(CommentSubscriptionPayload::from_event))
    }
}
