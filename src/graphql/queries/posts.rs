use super::prelude::*;

#[derive(Default)]
pub struct PostQueries;

#[Object]
impl PostQueries {
    /// Published posts, optionally searched by title or body
    async fn posts(
        &self,
        ctx: &Context<'_>,
        filter: Option<String>,
        limit: Option<PostLimit>,
        page: Option<i64>,
        take: Option<i64>,
        order_by: Option<PostOrderByInput>,
    ) -> Result<PostPage> {
        let args = list_args(
            filter,
            limit.map(|l| l.criteria()).unwrap_or_default(),
            page,
            take,
            order_by.map(|o| o.order()),
        );
        let page = ctx.blog().posts(&args).await.into_gql()?;
        Ok(PostPage::from_page(page))
    }

    /// The authenticated user's posts, drafts included
    async fn my_posts(
        &self,
        ctx: &Context<'_>,
        filter: Option<String>,
        limit: Option<PostLimit>,
        page: Option<i64>,
        take: Option<i64>,
        order_by: Option<PostOrderByInput>,
    ) -> Result<PostPage> {
        let args = list_args(
            filter,
            limit.map(|l| l.criteria()).unwrap_or_default(),
            page,
            take,
            order_by.map(|o| o.order()),
        );
        let page = ctx
            .blog()
            .my_posts(ctx.credentials(), &args)
            .await
            .into_gql()?;
        Ok(PostPage::from_page(page))
    }

    /// A post that is published or owned by the caller
    async fn post(&self, ctx: &Context<'_>, id: String) -> Result<Post> {
        let post = ctx.blog().post(ctx.credentials(), &id).await.into_gql()?;
        Ok(post.into())
    }
}
