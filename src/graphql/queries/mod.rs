pub mod comments;
pub mod posts;
pub mod users;

pub use comments::CommentQueries;
pub use posts::PostQueries;
pub use users::UserQueries;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result};

    pub(crate) use crate::error::IntoGraphql;
    pub(crate) use crate::graphql::auth::AuthExt;
    pub(crate) use crate::graphql::filters::*;
    pub(crate) use crate::graphql::helpers::*;
    pub(crate) use crate::graphql::types::*;
}
