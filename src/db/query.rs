//! SQL query builder for entity tables
//!
//! Renders [`Predicate`] trees into parameterized SQLite statements. Field
//! names are checked against the entity's column list, values are always
//! bound, never interpolated.

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;

use super::sqlite_helpers::fold_case;
use crate::error::{ApiError, ApiResult};
use crate::services::criteria::{CriteriaValue, Predicate};

/// Metadata about a table-backed record type
pub trait Entity: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin {
    /// The SQL table name (e.g., "posts")
    const TABLE_NAME: &'static str;

    /// All columns, in select order
    const COLUMNS: &'static [&'static str];

    /// Text columns with a `<column>_fold` shadow for case-insensitive matching
    const FOLDED: &'static [&'static str] = &[];

    /// Columns callers may sort by
    const SORTABLE: &'static [&'static str];

    /// Default sort column for list queries
    const DEFAULT_SORT: &'static str = "created_at";

    fn select_sql() -> String {
        format!("SELECT {} FROM {}", Self::COLUMNS.join(", "), Self::TABLE_NAME)
    }
}

/// A value bound into a statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl From<&CriteriaValue> for SqlValue {
    fn from(value: &CriteriaValue) -> Self {
        match value {
            CriteriaValue::Text(s) => SqlValue::Text(s.clone()),
            CriteriaValue::Int(i) => SqlValue::Int(*i),
            CriteriaValue::Bool(b) => SqlValue::Bool(*b),
        }
    }
}

/// Sort specification; `column` must be one of the entity's sortable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

impl Order {
    pub fn asc(column: &'static str) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            descending: true,
        }
    }
}

/// Render a predicate as a WHERE fragment, appending bind values in order.
///
/// Case-insensitive text comparisons run against the entity's folded shadow
/// columns with a folded bind value, so they match beyond ASCII.
pub fn render_predicate<E: Entity>(
    predicate: &Predicate,
    values: &mut Vec<SqlValue>,
) -> ApiResult<String> {
    match predicate {
        Predicate::Equals {
            field,
            value,
            case_insensitive,
        } => {
            check_column::<E>(field)?;
            match value {
                CriteriaValue::Text(text) if *case_insensitive => {
                    let column = folded_column::<E>(field)?;
                    values.push(SqlValue::Text(fold_case(text)));
                    Ok(format!("{} = ?", column))
                }
                _ => {
                    values.push(value.into());
                    Ok(format!("{} = ?", field))
                }
            }
        }
        Predicate::Contains {
            field,
            term,
            case_insensitive,
        } => {
            check_column::<E>(field)?;
            if *case_insensitive {
                let column = folded_column::<E>(field)?;
                values.push(SqlValue::Text(fold_case(term)));
                Ok(format!("instr({}, ?) > 0", column))
            } else {
                values.push(SqlValue::Text(term.clone()));
                Ok(format!("instr({}, ?) > 0", field))
            }
        }
        Predicate::And(terms) => render_group::<E>(terms, " AND ", "1 = 1", values),
        Predicate::Or(terms) => render_group::<E>(terms, " OR ", "1 = 0", values),
    }
}

fn check_column<E: Entity>(field: &str) -> ApiResult<()> {
    if E::COLUMNS.contains(&field) {
        Ok(())
    } else {
        Err(ApiError::Internal(anyhow::anyhow!(
            "Unknown column in criteria: {}",
            field
        )))
    }
}

fn folded_column<E: Entity>(field: &str) -> ApiResult<String> {
    if E::FOLDED.contains(&field) {
        Ok(format!("{}_fold", field))
    } else {
        Err(ApiError::Internal(anyhow::anyhow!(
            "Column has no case-folded form: {}",
            field
        )))
    }
}

fn render_group<E: Entity>(
    terms: &[Predicate],
    joiner: &str,
    empty: &str,
    values: &mut Vec<SqlValue>,
) -> ApiResult<String> {
    if terms.is_empty() {
        return Ok(empty.to_string());
    }

    let parts = terms
        .iter()
        .map(|term| render_predicate::<E>(term, values))
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(format!("({})", parts.join(joiner)))
}

/// A query builder for one entity type.
pub struct EntityQuery<E: Entity> {
    _phantom: std::marker::PhantomData<E>,
    where_clause: Option<String>,
    values: Vec<SqlValue>,
    order: Option<Order>,
    limit: Option<u64>,
    offset: u64,
}

impl<E: Entity> EntityQuery<E> {
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
            where_clause: None,
            values: Vec::new(),
            order: None,
            limit: None,
            offset: 0,
        }
    }

    /// Restrict to rows matching `predicate`
    pub fn filter(mut self, predicate: &Predicate) -> ApiResult<Self> {
        if !predicate.is_match_all() {
            let mut values = Vec::new();
            let sql = render_predicate::<E>(predicate, &mut values)?;
            self.where_clause = Some(sql);
            self.values = values;
        }
        Ok(self)
    }

    pub fn order_by(mut self, order: Option<Order>) -> ApiResult<Self> {
        if let Some(order) = order {
            if !E::SORTABLE.contains(&order.column) {
                return Err(ApiError::validation(format!(
                    "Cannot sort by {}",
                    order.column
                )));
            }
            self.order = Some(order);
        }
        Ok(self)
    }

    pub fn limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    fn push_where(&self, sql: &mut String) {
        if let Some(clause) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
    }

    /// Build the SELECT statement
    pub fn build_sql(&self) -> String {
        let mut sql = E::select_sql();
        self.push_where(&mut sql);

        let order = self.order.unwrap_or(Order::asc(E::DEFAULT_SORT));
        sql.push_str(&format!(
            " ORDER BY {} {}, rowid ASC",
            order.column,
            if order.descending { "DESC" } else { "ASC" }
        ));

        match (self.limit, self.offset) {
            (Some(limit), offset) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset)),
            (None, 0) => {}
            (None, offset) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
        }

        sql
    }

    /// Build the COUNT statement (ignores order and window)
    pub fn build_count_sql(&self) -> String {
        let mut sql = format!("SELECT COUNT(*) FROM {}", E::TABLE_NAME);
        self.push_where(&mut sql);
        sql
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub async fn fetch_all(self, pool: &SqlitePool) -> ApiResult<Vec<E>> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, "Executing entity query");

        let mut query = sqlx::query_as::<_, E>(&sql);
        for value in &self.values {
            query = match value {
                SqlValue::Text(s) => query.bind(s.clone()),
                SqlValue::Int(i) => query.bind(*i),
                SqlValue::Bool(b) => query.bind(*b),
            };
        }

        Ok(query.fetch_all(pool).await?)
    }

    pub async fn fetch_optional(self, pool: &SqlitePool) -> ApiResult<Option<E>> {
        let query = self.limit(Some(1));
        let mut rows = query.fetch_all(pool).await?;
        Ok(rows.pop())
    }

    pub async fn count(&self, pool: &SqlitePool) -> ApiResult<u64> {
        let sql = self.build_count_sql();
        tracing::debug!(sql = %sql, "Executing count query");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &self.values {
            query = match value {
                SqlValue::Text(s) => query.bind(s.clone()),
                SqlValue::Int(i) => query.bind(*i),
                SqlValue::Bool(b) => query.bind(*b),
            };
        }

        let count = query.fetch_one(pool).await?;
        Ok(count.max(0) as u64)
    }
}

impl<E: Entity> Default for EntityQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::PostRecord;
    use crate::services::criteria::build_criteria;

    #[test]
    fn renders_or_group_with_binds() {
        let predicate = build_criteria(&[("published", true.into())], Some("50%"), &["title", "body"]);
        let mut values = Vec::new();
        let sql = render_predicate::<PostRecord>(&predicate, &mut values).unwrap();

        assert_eq!(
            sql,
            "(published = ? AND (instr(title_fold, ?) > 0 OR instr(body_fold, ?) > 0))"
        );
        assert_eq!(
            values,
            vec![
                SqlValue::Bool(true),
                SqlValue::Text("50%".into()),
                SqlValue::Text("50%".into()),
            ]
        );
    }

    #[test]
    fn text_equality_compares_folded_values() {
        let predicate = Predicate::equals("title", "ÉCOLE");
        let mut values = Vec::new();
        let sql = render_predicate::<PostRecord>(&predicate, &mut values).unwrap();
        assert_eq!(sql, "title_fold = ?");
        assert_eq!(values, vec![SqlValue::Text("école".into())]);
    }

    #[test]
    fn unfolded_columns_reject_case_insensitive_text() {
        let mut values = Vec::new();
        assert!(render_predicate::<PostRecord>(&Predicate::equals("author_id", "u1"), &mut values).is_err());
        assert!(render_predicate::<PostRecord>(&Predicate::contains("id", "u1"), &mut values).is_err());
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let predicate = Predicate::eq_exact("password", "x");
        let mut values = Vec::new();
        assert!(render_predicate::<PostRecord>(&predicate, &mut values).is_err());
    }

    #[test]
    fn select_with_window_and_order() {
        let query = EntityQuery::<PostRecord>::new()
            .filter(&Predicate::eq_exact("author_id", "u1"))
            .unwrap()
            .order_by(Some(Order::desc("title")))
            .unwrap()
            .limit(Some(10))
            .offset(20);

        assert_eq!(
            query.build_sql(),
            "SELECT id, title, body, published, author_id, created_at, updated_at FROM posts \
             WHERE author_id = ? ORDER BY title DESC, rowid ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(
            query.build_count_sql(),
            "SELECT COUNT(*) FROM posts WHERE author_id = ?"
        );
    }

    #[test]
    fn match_all_has_no_where() {
        let query = EntityQuery::<PostRecord>::new()
            .filter(&Predicate::all())
            .unwrap();
        assert_eq!(query.build_count_sql(), "SELECT COUNT(*) FROM posts");
        assert!(query.values().is_empty());
    }
}
