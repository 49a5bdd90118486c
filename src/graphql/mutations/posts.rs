use super::prelude::*;

#[derive(Default)]
pub struct PostMutations;

#[Object]
impl PostMutations {
    async fn create_post(&self, ctx: &Context<'_>, data: CreatePostInput) -> Result<Post> {
        let post = ctx
            .blog()
            .create_post(ctx.credentials(), data.into())
            .await
            .into_gql()?;
        Ok(post.into())
    }

    /// Update one of the caller's posts
    async fn update_post(
        &self,
        ctx: &Context<'_>,
        id: String,
        data: UpdatePostInput,
    ) -> Result<Post> {
        let post = ctx
            .blog()
            .update_post(ctx.credentials(), &id, data.into())
            .await
            .into_gql()?;
        Ok(post.into())
    }

    /// Delete one of the caller's posts
    async fn delete_post(&self, ctx: &Context<'_>, id: String) -> Result<Post> {
        let post = ctx
            .blog()
            .delete_post(ctx.credentials(), &id)
            .await
            .into_gql()?;
        Ok(post.into())
    }
}
