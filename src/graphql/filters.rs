//! GraphQL filter and ordering input types for list queries
//!
//! A `limit` input carries exact-match constraints: text fields compare
//! case-insensitively, booleans exactly. The free-text `filter` argument is
//! handled by the service layer.

use async_graphql::{Enum, InputObject};

use crate::db::Order;
use crate::services::CriteriaValue;

/// Order direction for sorting
#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OrderDirection {
    /// Ascending order (A-Z, oldest-newest)
    #[default]
    Asc,
    /// Descending order (Z-A, newest-oldest)
    Desc,
}

impl OrderDirection {
    fn order(self, column: &'static str) -> Order {
        match self {
            OrderDirection::Asc => Order::asc(column),
            OrderDirection::Desc => Order::desc(column),
        }
    }
}

fn push_text(
    criteria: &mut Vec<(&'static str, CriteriaValue)>,
    field: &'static str,
    value: &Option<String>,
) {
    if let Some(value) = value {
        criteria.push((field, value.as_str().into()));
    }
}

// ============================================================================
// Exact-match constraints
// ============================================================================

#[derive(InputObject, Default, Clone, Debug)]
pub struct UserLimit {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserLimit {
    pub fn criteria(&self) -> Vec<(&'static str, CriteriaValue)> {
        let mut criteria = Vec::new();
        push_text(&mut criteria, "name", &self.name);
        push_text(&mut criteria, "email", &self.email);
        criteria
    }
}

#[derive(InputObject, Default, Clone, Debug)]
pub struct PostLimit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub published: Option<bool>,
}

impl PostLimit {
    pub fn criteria(&self) -> Vec<(&'static str, CriteriaValue)> {
        let mut criteria = Vec::new();
        push_text(&mut criteria, "title", &self.title);
        push_text(&mut criteria, "body", &self.body);
        if let Some(published) = self.published {
            criteria.push(("published", published.into()));
        }
        criteria
    }
}

#[derive(InputObject, Default, Clone, Debug)]
pub struct CommentLimit {
    pub text: Option<String>,
}

impl CommentLimit {
    pub fn criteria(&self) -> Vec<(&'static str, CriteriaValue)> {
        let mut criteria = Vec::new();
        push_text(&mut criteria, "text", &self.text);
        criteria
    }
}

// ============================================================================
// Ordering
// ============================================================================

#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum UserSortField {
    Name,
    Email,
    #[default]
    CreatedAt,
    UpdatedAt,
}

#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PostSortField {
    Title,
    Body,
    Published,
    #[default]
    CreatedAt,
    UpdatedAt,
}

#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum CommentSortField {
    Text,
    #[default]
    CreatedAt,
    UpdatedAt,
}

#[derive(InputObject, Default, Clone, Debug)]
pub struct UserOrderByInput {
    #[graphql(default)]
    pub field: UserSortField,
    #[graphql(default)]
    pub direction: OrderDirection,
}

impl UserOrderByInput {
    pub fn order(&self) -> Order {
        let column = match self.field {
            UserSortField::Name => "name",
            UserSortField::Email => "email",
            UserSortField::CreatedAt => "created_at",
            UserSortField::UpdatedAt => "updated_at",
        };
        self.direction.order(column)
    }
}

#[derive(InputObject, Default, Clone, Debug)]
pub struct PostOrderByInput {
    #[graphql(default)]
    pub field: PostSortField,
    #[graphql(default)]
    pub direction: OrderDirection,
}

impl PostOrderByInput {
    pub fn order(&self) -> Order {
        let column = match self.field {
            PostSortField::Title => "title",
            PostSortField::Body => "body",
            PostSortField::Published => "published",
            PostSortField::CreatedAt => "created_at",
            PostSortField::UpdatedAt => "updated_at",
        };
        self.direction.order(column)
    }
}

#[derive(InputObject, Default, Clone, Debug)]
pub struct CommentOrderByInput {
    #[graphql(default)]
    pub field: CommentSortField,
    #[graphql(default)]
    pub direction: OrderDirection,
}

impl CommentOrderByInput {
    pub fn order(&self) -> Order {
        let column = match self.field {
            CommentSortField::Text => "text",
            CommentSortField::CreatedAt => "created_at",
            CommentSortField::UpdatedAt => "updated_at",
        };
        self.direction.order(column)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn post_limit_keeps_value_types() {
        let limit = PostLimit {
            title: Some("Intro".into()),
            body: None,
            published: Some(false),
        };

        assert_eq!(
            limit.criteria(),
            vec![
                ("title", CriteriaValue::Text("Intro".into())),
                ("published", CriteriaValue::Bool(false)),
            ]
        );
    }

    #[test]
    fn empty_limit_has_no_criteria() {
        assert!(UserLimit::default().criteria().is_empty());
        assert!(CommentLimit::default().criteria().is_empty());
    }

    #[test]
    fn order_inputs_map_to_columns() {
        let order = PostOrderByInput {
            field: PostSortField::Title,
            direction: OrderDirection::Desc,
        };
        assert_eq!(order.order(), Order::desc("title"));
        assert_eq!(UserOrderByInput::default().order(), Order::asc("created_at"));
    }
}
