//! Generic data-access layer on top of sea-orm.
//!
//! - [`query`]: turns a [`domain::Paging`] request into filter, order and
//!   window clauses, plus reusable query modifiers
//! - [`pagination`]: counted, windowed fetches with page metadata
//! - [`repository`]: uniform CRUD surface over any entity type
//! - [`registry`]: one long-lived repository per entity type
//! - [`infra`]: connection management

pub mod context;
pub mod infra;
pub mod pagination;
pub mod query;
pub mod registry;
pub mod repository;

pub use context::QueryContext;
pub use infra::Database;
pub use pagination::{count, pages, paginate, paginate_scope, PaginatedResponse};
pub use query::{full_text_filter_scope, full_text_search, prepare_query, ScopeExt};
pub use registry::{repository, Registry};
pub use repository::{
    identity_condition, Changes, Field, Filter, Repository, Row, SeaRepository, WithRelations,
};
