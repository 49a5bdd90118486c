use super::prelude::*;

#[derive(Default)]
pub struct CommentMutations;

#[Object]
impl CommentMutations {
    /// Comment on a published post
    async fn create_comment(&self, ctx: &Context<'_>, data: CreateCommentInput) -> Result<Comment> {
        let comment = ctx
            .blog()
            .create_comment(ctx.credentials(), data.into())
            .await
            .into_gql()?;
        Ok(comment.into())
    }

    async fn update_comment(
        &self,
        ctx: &Context<'_>,
        id: String,
        data: UpdateCommentInput,
    ) -> Result<Comment> {
        let comment = ctx
            .blog()
            .update_comment(ctx.credentials(), &id, data.text)
            .await
            .into_gql()?;
        Ok(comment.into())
    }

    /// Delete a comment written by the caller or left on the caller's post
    async fn delete_comment(&self, ctx: &Context<'_>, id: String) -> Result<Comment> {
        let comment = ctx
            .blog()
            .delete_comment(ctx.credentials(), &id)
            .await
            .into_gql()?;
        Ok(comment.into())
    }
}
