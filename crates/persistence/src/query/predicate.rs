//! Filter, order and window clauses derived from a [`Paging`] request.
//!
//! `search_by` and `order_by` entries are interpolated verbatim as SQL
//! expressions so callers may search or sort on computed expressions. They
//! must never carry untrusted input; only `search` is bound as a parameter.
//! For full-text search `search_by` is spliced into a template whose `$1` is
//! the bound term, so it must not contain `$N` or `?` placeholders of its own
//! (the jsonb `?` operators included).

use sea_orm::sea_query::{Expr, NullOrdering, Order, SimpleExpr};
use sea_orm::{EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};

use domain::{NullsOrder, Paging, SearchOperator, SortDirection};

use super::search::full_text_condition;

/// Apply search filter, ordering and the page window to `query`.
///
/// `paging` is normalized in place (limit/page defaults, derived offset,
/// default `id desc` ordering). `None` behaves like an all-defaults request.
/// Applying it again to an already-normalized request yields the same window.
pub fn prepare_query<E: EntityTrait>(query: Select<E>, paging: Option<&mut Paging>) -> Select<E> {
    let mut defaults = Paging::default();
    let paging = paging.unwrap_or(&mut defaults);

    paging.normalize();
    let query = filter_query(query, paging);
    window_query(query, paging)
}

/// Apply only the search predicate, leaving order and window untouched.
pub fn filter_query<E: EntityTrait>(query: Select<E>, paging: &Paging) -> Select<E> {
    match search_condition(paging) {
        Some(condition) => query.filter(condition),
        None => query,
    }
}

/// Apply ordering (defaulting to `id desc`) and limit/offset.
///
/// Expects a normalized request.
pub fn window_query<E: EntityTrait>(mut query: Select<E>, paging: &mut Paging) -> Select<E> {
    paging.ensure_order();

    for key in paging.sort_keys() {
        let order = match key.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        let column = Expr::cust(key.column);

        query = match key.nulls {
            Some(nulls) => query.order_by_with_nulls(column, order, null_ordering(nulls)),
            None => query.order_by(column, order),
        };
    }

    query.limit(paging.limit).offset(paging.offset())
}

fn null_ordering(nulls: NullsOrder) -> NullOrdering {
    match nulls {
        NullsOrder::First => NullOrdering::First,
        NullsOrder::Last => NullOrdering::Last,
    }
}

/// Predicate selected by the request's operator, if a search is requested.
///
/// Returns `None` when `search` or `search_by` is empty, or when a full-text
/// term has no tokens.
pub fn search_condition(paging: &Paging) -> Option<SimpleExpr> {
    if !paging.has_search() {
        return None;
    }

    let target = || Expr::expr(Expr::cust(paging.search_by.clone()));
    let term = paging.search.clone();

    let condition = match paging.search_operator {
        SearchOperator::LessThan => target().lt(term),
        SearchOperator::LessThanOrEqual => target().lte(term),
        SearchOperator::GreaterThan => target().gt(term),
        SearchOperator::GreaterThanOrEqual => target().gte(term),
        SearchOperator::NotEqual => target().ne(term),
        SearchOperator::NotNull => target().is_not_null(),
        SearchOperator::Null => target().is_null(),
        SearchOperator::Contains => target().like(format!("%{term}%")),
        SearchOperator::FullText => return full_text_condition(&paging.search_by, &paging.search),
    };

    Some(condition)
}
