//! GraphQL schema definition with queries, mutations, and subscriptions

use std::sync::Arc;

use async_graphql::{MergedObject, Schema};

use crate::services::BlogService;

use super::mutations::{CommentMutations, PostMutations, UserMutations};
use super::queries::{CommentQueries, PostQueries, UserQueries};
use super::subscriptions::SubscriptionRoot;

/// The GraphQL schema type
pub type BlogSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(UserQueries, PostQueries, CommentQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(UserMutations, PostMutations, CommentMutations);

/// Build the GraphQL schema with all resolvers
pub fn build_schema(blog: Arc<BlogService>) -> BlogSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), SubscriptionRoot)
        .data(blog)
        .finish()
}
