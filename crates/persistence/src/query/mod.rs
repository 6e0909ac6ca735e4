//! Query building from paging requests.

mod predicate;
mod scope;
mod search;

pub use predicate::{filter_query, prepare_query, search_condition, window_query};
pub use scope::ScopeExt;
pub use search::{full_text_condition, full_text_filter_scope, full_text_search, full_text_term};
