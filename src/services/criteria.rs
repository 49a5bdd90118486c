//! Dynamic query criteria
//!
//! Turns the optional `limit` (exact-match) and `filter` (free-text search)
//! arguments of the list queries into a store-agnostic [`Predicate`] tree.
//! The SQL rendering lives in [`crate::db::query`].

use crate::services::auth::Identity;

/// A value a criteria field can be compared against
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaValue {
    Text(String),
    Bool(bool),
    Int(i64),
}

impl CriteriaValue {
    pub fn is_text(&self) -> bool {
        matches!(self, CriteriaValue::Text(_))
    }
}

impl From<&str> for CriteriaValue {
    fn from(value: &str) -> Self {
        CriteriaValue::Text(value.to_string())
    }
}

impl From<String> for CriteriaValue {
    fn from(value: String) -> Self {
        CriteriaValue::Text(value)
    }
}

impl From<bool> for CriteriaValue {
    fn from(value: bool) -> Self {
        CriteriaValue::Bool(value)
    }
}

impl From<i64> for CriteriaValue {
    fn from(value: i64) -> Self {
        CriteriaValue::Int(value)
    }
}

/// Normalized predicate tree
///
/// `And(vec![])` matches everything, `Or(vec![])` matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals {
        field: &'static str,
        value: CriteriaValue,
        case_insensitive: bool,
    },
    Contains {
        field: &'static str,
        term: String,
        case_insensitive: bool,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// The match-all predicate
    pub fn all() -> Self {
        Predicate::And(Vec::new())
    }

    /// Exact, case-sensitive equality (ids, flags)
    pub fn eq_exact(field: &'static str, value: impl Into<CriteriaValue>) -> Self {
        Predicate::Equals {
            field,
            value: value.into(),
            case_insensitive: false,
        }
    }

    /// Equality where text compares case-insensitively
    pub fn equals(field: &'static str, value: impl Into<CriteriaValue>) -> Self {
        let value = value.into();
        Predicate::Equals {
            field,
            case_insensitive: value.is_text(),
            value,
        }
    }

    /// Case-insensitive substring match
    pub fn contains(field: &'static str, term: impl Into<String>) -> Self {
        Predicate::Contains {
            field,
            term: term.into(),
            case_insensitive: true,
        }
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Predicate::And(terms) if terms.is_empty())
    }

    /// AND another constraint onto this predicate, flattening nested ANDs
    pub fn and_also(self, other: Predicate) -> Predicate {
        let mut terms = match self {
            Predicate::And(terms) => terms,
            single => vec![single],
        };
        match other {
            Predicate::And(more) => terms.extend(more),
            single => terms.push(single),
        }
        Predicate::And(terms)
    }
}

/// Build the predicate for a list query.
///
/// * every `criteria` entry becomes an equality, case-insensitive for text
/// * a non-empty `search_term` narrows the searchable fields the caller
///   already constrained (AND), or else matches any searchable field (OR)
pub fn build_criteria(
    criteria: &[(&'static str, CriteriaValue)],
    search_term: Option<&str>,
    searchable: &[&'static str],
) -> Predicate {
    let mut terms: Vec<Predicate> = criteria
        .iter()
        .map(|(field, value)| Predicate::equals(*field, value.clone()))
        .collect();

    if let Some(term) = search_term.filter(|t| !t.is_empty()) {
        let overlapping: Vec<&'static str> = searchable
            .iter()
            .copied()
            .filter(|field| criteria.iter().any(|(key, _)| key == field))
            .collect();

        if overlapping.is_empty() {
            terms.push(Predicate::Or(
                searchable
                    .iter()
                    .map(|field| Predicate::contains(*field, term))
                    .collect(),
            ));
        } else {
            terms.extend(
                overlapping
                    .into_iter()
                    .map(|field| Predicate::contains(field, term)),
            );
        }
    }

    Predicate::And(terms)
}

/// Visibility of a single post: published, or owned by the caller.
pub fn post_visibility(post_id: &str, viewer: Option<&Identity>) -> Predicate {
    let mut visible = vec![Predicate::eq_exact("published", true)];
    if let Some(identity) = viewer {
        visible.push(Predicate::eq_exact("author_id", identity.user_id.as_str()));
    }

    Predicate::And(vec![
        Predicate::eq_exact("id", post_id),
        Predicate::Or(visible),
    ])
}
