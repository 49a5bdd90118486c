pub mod comments;
pub mod posts;
pub mod users;

pub use comments::CommentMutations;
pub use posts::PostMutations;
pub use users::UserMutations;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result};

    pub(crate) use crate::error::IntoGraphql;
    pub(crate) use crate::graphql::auth::AuthExt;
    pub(crate) use crate::graphql::types::*;
}
