//! Paging request and search operator types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ORDER_BY, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, OP_CONTAINS, OP_GREATER_THAN,
    OP_GREATER_THAN_OR_EQUAL, OP_LESS_THAN, OP_LESS_THAN_OR_EQUAL, OP_NOT_EQUAL, OP_NOT_NULL,
    OP_NULL,
};
use crate::error::DomainError;

/// Comparison applied between `search_by` and `search`.
///
/// Parsing is permissive: any value that is not one of the listed operators
/// (including an empty string) selects [`SearchOperator::FullText`]. Use
/// [`str::parse`] when unknown operators should be rejected instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SearchOperator {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    NotEqual,
    NotNull,
    Null,
    Contains,
    #[default]
    FullText,
}

impl SearchOperator {
    /// Query-string value of this operator (empty for full text)
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOperator::LessThan => OP_LESS_THAN,
            SearchOperator::LessThanOrEqual => OP_LESS_THAN_OR_EQUAL,
            SearchOperator::GreaterThan => OP_GREATER_THAN,
            SearchOperator::GreaterThanOrEqual => OP_GREATER_THAN_OR_EQUAL,
            SearchOperator::NotEqual => OP_NOT_EQUAL,
            SearchOperator::NotNull => OP_NOT_NULL,
            SearchOperator::Null => OP_NULL,
            SearchOperator::Contains => OP_CONTAINS,
            SearchOperator::FullText => "",
        }
    }

    fn known(s: &str) -> Option<Self> {
        match s {
            OP_LESS_THAN => Some(SearchOperator::LessThan),
            OP_LESS_THAN_OR_EQUAL => Some(SearchOperator::LessThanOrEqual),
            OP_GREATER_THAN => Some(SearchOperator::GreaterThan),
            OP_GREATER_THAN_OR_EQUAL => Some(SearchOperator::GreaterThanOrEqual),
            OP_NOT_EQUAL => Some(SearchOperator::NotEqual),
            OP_NOT_NULL => Some(SearchOperator::NotNull),
            OP_NULL => Some(SearchOperator::Null),
            OP_CONTAINS => Some(SearchOperator::Contains),
            "" => Some(SearchOperator::FullText),
            _ => None,
        }
    }
}

impl From<&str> for SearchOperator {
    fn from(s: &str) -> Self {
        SearchOperator::known(s).unwrap_or_else(|| {
            tracing::debug!(operator = s, "Unrecognized search operator, using full-text match");
            SearchOperator::FullText
        })
    }
}

impl From<String> for SearchOperator {
    fn from(s: String) -> Self {
        SearchOperator::from(s.as_str())
    }
}

impl From<SearchOperator> for String {
    fn from(op: SearchOperator) -> Self {
        op.as_str().to_string()
    }
}

/// Strict parsing: unknown operators are rejected.
impl FromStr for SearchOperator {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchOperator::known(s).ok_or_else(|| DomainError::UnknownOperator(s.to_string()))
    }
}

impl fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchOperator::FullText => write!(f, "fulltext"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Sort direction of one `order_by` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Placement of NULLs requested by a trailing `nulls first|last`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

/// One parsed `order_by` entry: a verbatim column expression, a direction and
/// an optional NULL placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
    pub nulls: Option<NullsOrder>,
}

impl SortKey {
    /// Parse `"column [asc|desc] [nulls first|last]"`.
    ///
    /// Keywords are matched in any case. When the token before the optional
    /// `nulls` clause is not `asc` or `desc`, the rest of the entry is the
    /// column and the direction is ascending. Blank entries yield `None`.
    pub fn parse(expr: &str) -> Option<Self> {
        let expr = expr.trim();
        if expr.is_empty() {
            return None;
        }

        let (rest, nulls) = split_nulls(expr);

        let (column, direction) = match rest.rsplit_once(char::is_whitespace) {
            Some((head, tail)) if tail.eq_ignore_ascii_case("desc") => {
                (head.trim_end(), SortDirection::Desc)
            }
            Some((head, tail)) if tail.eq_ignore_ascii_case("asc") => {
                (head.trim_end(), SortDirection::Asc)
            }
            _ => (rest, SortDirection::Asc),
        };

        Some(SortKey {
            column: column.to_string(),
            direction,
            nulls,
        })
    }
}

/// Strip a trailing `nulls first|last` clause, if the entry has one.
fn split_nulls(expr: &str) -> (&str, Option<NullsOrder>) {
    let Some((head, last)) = expr.rsplit_once(char::is_whitespace) else {
        return (expr, None);
    };

    let nulls = if last.eq_ignore_ascii_case("first") {
        NullsOrder::First
    } else if last.eq_ignore_ascii_case("last") {
        NullsOrder::Last
    } else {
        return (expr, None);
    };

    match head.trim_end().rsplit_once(char::is_whitespace) {
        Some((column, keyword)) if keyword.eq_ignore_ascii_case("nulls") => {
            (column.trim_end(), Some(nulls))
        }
        _ => (expr, None),
    }
}

/// Declarative paging request.
///
/// Field names mirror the query-string names so the struct can be decoded
/// straight from a request. `offset` is derived by [`Paging::normalize`] and
/// is never supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paging {
    /// Sort expressions, each `column [asc|desc]`
    pub order_by: Vec<String>,
    /// Free-text search term
    pub search: String,
    /// Operator applied between `search_by` and `search`
    #[serde(rename = "condition")]
    pub search_operator: SearchOperator,
    /// Column (or expression) searched
    pub search_by: String,
    /// Page size; zero means [`DEFAULT_PAGE_SIZE`]
    pub limit: u64,
    /// 1-based page number; zero means the first page
    pub page: u64,
    #[serde(skip)]
    offset: u64,
    /// Log the generated fetch statement
    #[serde(skip)]
    pub show_sql: bool,
}

impl Paging {
    /// Create an all-defaults request
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Search `search_by` for `search` using the default (full-text) operator
    pub fn with_search(mut self, search_by: impl Into<String>, search: impl Into<String>) -> Self {
        self.search_by = search_by.into();
        self.search = search.into();
        self
    }

    pub fn with_operator(mut self, operator: impl Into<SearchOperator>) -> Self {
        self.search_operator = operator.into();
        self
    }

    /// Append one sort expression
    pub fn with_order(mut self, expr: impl Into<String>) -> Self {
        self.order_by.push(expr.into());
        self
    }

    pub fn with_show_sql(mut self, show_sql: bool) -> Self {
        self.show_sql = show_sql;
        self
    }

    /// Row skip count derived by [`Paging::normalize`]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Apply the limit and page defaults and derive `offset`.
    ///
    /// Idempotent: a second call leaves an already-normalized request as is.
    pub fn normalize(&mut self) {
        if self.limit == 0 {
            self.limit = DEFAULT_PAGE_SIZE;
        }

        if self.page < DEFAULT_PAGE_NUMBER {
            self.page = DEFAULT_PAGE_NUMBER;
        }
        // Oversized requests clamp at u64::MAX
        self.offset = (self.page - 1).saturating_mul(self.limit);
    }

    /// Fill `order_by` with the primary-key descending sort when empty
    pub fn ensure_order(&mut self) {
        if self.order_by.is_empty() {
            self.order_by.push(DEFAULT_ORDER_BY.to_string());
        }
    }

    /// Parsed sort keys, in the order given
    pub fn sort_keys(&self) -> Vec<SortKey> {
        self.order_by.iter().filter_map(|o| SortKey::parse(o)).collect()
    }

    /// Whether a search predicate should be built (both `search` and `search_by` set)
    pub fn has_search(&self) -> bool {
        !self.search.is_empty() && !self.search_by.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults() {
        let mut paging = Paging::new().with_limit(0).with_page(0);
        paging.normalize();

        assert_eq!(paging.limit, 20);
        assert_eq!(paging.page, 1);
        assert_eq!(paging.offset(), 0);
    }

    #[test]
    fn test_normalize_offset() {
        for (page, limit, offset) in [(1, 10, 0), (2, 10, 10), (5, 20, 80), (3, 7, 14)] {
            let mut paging = Paging::new().with_page(page).with_limit(limit);
            paging.normalize();
            assert_eq!(paging.offset(), offset, "page {page} limit {limit}");
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut paging = Paging::new().with_page(4).with_limit(15);
        paging.normalize();
        let first = paging.clone();
        paging.normalize();

        assert_eq!(paging, first);
        assert_eq!(paging.offset(), 45);
    }

    #[test]
    fn test_normalize_saturates_offset() {
        let mut paging = Paging::new().with_page(u64::MAX / 2).with_limit(20);
        paging.normalize();

        assert_eq!(paging.offset(), u64::MAX);
        assert_eq!(paging.limit, 20);

        let mut paging = Paging::new().with_page(3).with_limit(u64::MAX);
        paging.normalize();
        assert_eq!(paging.offset(), u64::MAX);
    }

    #[test]
    fn test_operator_parsing_is_permissive() {
        assert_eq!(SearchOperator::from("lt"), SearchOperator::LessThan);
        assert_eq!(SearchOperator::from("nn"), SearchOperator::NotNull);
        assert_eq!(SearchOperator::from("c"), SearchOperator::Contains);
        assert_eq!(SearchOperator::from(""), SearchOperator::FullText);
        assert_eq!(SearchOperator::from("lte "), SearchOperator::FullText);
        assert_eq!(SearchOperator::from("between"), SearchOperator::FullText);
    }

    #[test]
    fn test_operator_strict_parsing() {
        assert_eq!("gte".parse::<SearchOperator>(), Ok(SearchOperator::GreaterThanOrEqual));
        assert_eq!("".parse::<SearchOperator>(), Ok(SearchOperator::FullText));
        assert_eq!(
            "like".parse::<SearchOperator>(),
            Err(DomainError::UnknownOperator("like".to_string()))
        );
    }

    fn key(column: &str, direction: SortDirection, nulls: Option<NullsOrder>) -> Option<SortKey> {
        Some(SortKey {
            column: column.into(),
            direction,
            nulls,
        })
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("id desc"), key("id", SortDirection::Desc, None));
        assert_eq!(SortKey::parse("  name ASC "), key("name", SortDirection::Asc, None));
        assert_eq!(SortKey::parse("created_at"), key("created_at", SortDirection::Asc, None));
        assert_eq!(
            SortKey::parse("lower(name) desc"),
            key("lower(name)", SortDirection::Desc, None)
        );
        assert_eq!(SortKey::parse("desc"), key("desc", SortDirection::Asc, None));
        assert_eq!(SortKey::parse("   "), None);
    }

    #[test]
    fn test_sort_key_parse_nulls_clause() {
        assert_eq!(
            SortKey::parse("name desc nulls last"),
            key("name", SortDirection::Desc, Some(NullsOrder::Last))
        );
        assert_eq!(
            SortKey::parse("age  NULLS  FIRST"),
            key("age", SortDirection::Asc, Some(NullsOrder::First))
        );
        assert_eq!(
            SortKey::parse("lower(nickname) Asc Nulls Last"),
            key("lower(nickname)", SortDirection::Asc, Some(NullsOrder::Last))
        );
        // `last` without `nulls` is part of the column
        assert_eq!(
            SortKey::parse("first last"),
            key("first last", SortDirection::Asc, None)
        );
    }

    #[test]
    fn test_deserialize_query_names() {
        let paging: Paging = serde_json::from_str(
            r#"{"order_by":["name asc"],"search":"alice","condition":"c","search_by":"name","limit":5,"page":2}"#,
        )
        .unwrap();

        assert_eq!(paging.search_operator, SearchOperator::Contains);
        assert_eq!(paging.search_by, "name");
        assert_eq!(paging.limit, 5);
        assert_eq!(paging.page, 2);
        assert_eq!(paging.offset(), 0);
        assert!(!paging.show_sql);
    }

    #[test]
    fn test_deserialize_unknown_condition_falls_back() {
        let paging: Paging = serde_json::from_str(r#"{"condition":"typo"}"#).unwrap();
        assert_eq!(paging.search_operator, SearchOperator::FullText);
        assert_eq!(paging.limit, 0);
    }
}
