//! Core services shared by every resolver

pub mod auth;
pub mod blog;
pub mod criteria;
pub mod events;
pub mod paginator;

pub use auth::{AuthConfig, Identity, IdentityResolver, PasswordHasher, TokenCodec};
pub use blog::{
    AuthSession, BlogService, ListArgs, NewComment, NewPost, NewUser, Page, PageLinks, UserChanges,
};
pub use criteria::{CriteriaValue, Predicate, build_criteria};
pub use events::{EventRouter, MutationEvent, MutationKind, Subscription, Topic};
pub use paginator::{PaginationWindow, compute_window};
