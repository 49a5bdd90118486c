use super::prelude::*;

#[derive(Default)]
pub struct UserQueries;

#[Object]
impl UserQueries {
    /// Users, optionally searched by name
    async fn users(
        &self,
        ctx: &Context<'_>,
        filter: Option<String>,
        limit: Option<UserLimit>,
        page: Option<i64>,
        take: Option<i64>,
        order_by: Option<UserOrderByInput>,
    ) -> Result<UserPage> {
        let args = list_args(
            filter,
            limit.map(|l| l.criteria()).unwrap_or_default(),
            page,
            take,
            order_by.map(|o| o.order()),
        );
        let page = ctx.blog().users(&args).await.into_gql()?;
        Ok(UserPage::from_page(page))
    }

    /// The authenticated user
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let user = ctx.blog().me(ctx.credentials()).await.into_gql()?;
        Ok(user.into())
    }
}
