// Helper functions shared across GraphQL query/mutation modules.

use crate::db::Order;
use crate::services::{CriteriaValue, ListArgs};

/// Assemble list-query arguments from resolver inputs
pub(crate) fn list_args(
    filter: Option<String>,
    limit: Vec<(&'static str, CriteriaValue)>,
    page: Option<i64>,
    take: Option<i64>,
    order: Option<Order>,
) -> ListArgs {
    ListArgs {
        filter,
        limit,
        page,
        take,
        order,
    }
}
