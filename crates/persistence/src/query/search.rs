//! Postgres full-text search helpers.

use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{EntityTrait, QueryFilter, Select};

use domain::FULL_TEXT_AND;

/// Collapse whitespace and join the tokens into a `to_tsquery` conjunction.
///
/// `"  alice   bob "` becomes `"alice & bob"`. Blank input has no term.
pub fn full_text_term(search: &str) -> Option<String> {
    let tokens: Vec<&str> = search.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    Some(tokens.join(FULL_TEXT_AND))
}

/// `to_tsvector(target::text) @@ to_tsquery($1)` with the term bound.
///
/// `target` is trusted SQL. Any `?` or `$N` inside it is read as another
/// value placeholder, so jsonb `?` operators cannot be used here.
pub fn full_text_condition(target: &str, search: &str) -> Option<SimpleExpr> {
    let term = full_text_term(search)?;
    Some(Expr::cust_with_values(
        format!("to_tsvector({target}::text) @@ to_tsquery($1)"),
        [term],
    ))
}

/// Restrict `query` to rows whose `target` matches every token of `search`.
///
/// Blank searches leave the query unchanged.
pub fn full_text_search<E: EntityTrait>(query: Select<E>, target: &str, search: &str) -> Select<E> {
    match full_text_condition(target, search) {
        Some(condition) => query.filter(condition),
        None => query,
    }
}

/// Reusable form of [`full_text_search`], for use with [`super::ScopeExt::scope`].
pub fn full_text_filter_scope<E: EntityTrait>(
    target: impl Into<String>,
    search: impl Into<String>,
) -> impl Fn(Select<E>) -> Select<E> + Clone + Send + Sync {
    let target = target.into();
    let search = search.into();
    move |query| full_text_search(query, &target, &search)
}
