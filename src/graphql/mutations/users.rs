use super::prelude::*;

#[derive(Default)]
pub struct UserMutations;

#[Object]
impl UserMutations {
    /// Sign up; returns the new user and a token
    async fn create_user(&self, ctx: &Context<'_>, data: CreateUserInput) -> Result<AuthPayload> {
        let session = ctx.blog().create_user(data.into()).await.into_gql()?;
        Ok(session.into())
    }

    async fn login(&self, ctx: &Context<'_>, data: LoginUserInput) -> Result<AuthPayload> {
        let session = ctx
            .blog()
            .login(&data.email, &data.password)
            .await
            .into_gql()?;
        Ok(session.into())
    }

    /// Update the authenticated user
    async fn update_user(&self, ctx: &Context<'_>, data: UpdateUserInput) -> Result<User> {
        let user = ctx
            .blog()
            .update_user(ctx.credentials(), data.into())
            .await
            .into_gql()?;
        Ok(user.into())
    }

    /// Delete the authenticated user with their posts and comments
    async fn delete_user(&self, ctx: &Context<'_>) -> Result<User> {
        let user = ctx.blog().delete_user(ctx.credentials()).await.into_gql()?;
        Ok(user.into())
    }
}
