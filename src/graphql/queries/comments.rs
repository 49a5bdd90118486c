use super::prelude::*;

#[derive(Default)]
pub struct CommentQueries;

#[Object]
impl CommentQueries {
    /// Comments, optionally searched by text
    async fn comments(
        &self,
        ctx: &Context<'_>,
        filter: Option<String>,
        limit: Option<CommentLimit>,
        page: Option<i64>,
        take: Option<i64>,
        order_by: Option<CommentOrderByInput>,
    ) -> Result<CommentPage> {
        let args = list_args(
            filter,
            limit.map(|l| l.criteria()).unwrap_or_default(),
            page,
            take,
            order_by.map(|o| o.order()),
        );
        let page = ctx.blog().comments(&args).await.into_gql()?;
        Ok(CommentPage::from_page(page))
    }
}
