//! Generic repository over sea-orm entities.
//!
//! [`Repository`] is the uniform CRUD surface; [`SeaRepository`] implements
//! it for any [`EntityTrait`] on a bound [`DatabaseConnection`]. Obtain
//! long-lived instances through [`crate::registry`].

mod filter;
mod relations;
mod sea;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, DatabaseConnection, EntityTrait, IntoActiveModel, PrimaryKeyTrait, Value,
};
use serde_json::Value as JsonValue;

use common::AppResult;
use domain::{Pagination, Paging};

use crate::context::QueryContext;

pub use filter::{identity_condition, Changes, Field, Filter};
pub use relations::WithRelations;
pub use sea::SeaRepository;

/// Untyped result row, column name to JSON value
pub type Row = serde_json::Map<String, JsonValue>;

/// Primary key value type of `E`
pub type PrimaryKeyValue<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// CRUD operations available for every entity type.
///
/// Single-row lookups fail with `NotFound` when nothing matches; every other
/// store failure surfaces as `AppError::Database`.
#[async_trait]
pub trait Repository<E>: Send + Sync
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelBehavior + Send,
{
    /// Connection bound at construction
    fn get_db(&self) -> &DatabaseConnection;

    /// Find by primary key
    async fn find(&self, ctx: &QueryContext, id: PrimaryKeyValue<E>) -> AppResult<E::Model>
    where
        PrimaryKeyValue<E>: Send;

    /// All rows matching an equality filter (rejects empty filters)
    async fn find_by(&self, ctx: &QueryContext, filter: Filter) -> AppResult<Vec<E::Model>>;

    /// First row matching an equality filter
    async fn find_first_by(&self, ctx: &QueryContext, filter: Filter) -> AppResult<E::Model>;

    async fn all(&self, ctx: &QueryContext) -> AppResult<Vec<E::Model>>;

    /// [`Repository::find`] plus every declared relation
    async fn find_with_relations(
        &self,
        ctx: &QueryContext,
        id: PrimaryKeyValue<E>,
    ) -> AppResult<WithRelations<E::Model>>
    where
        PrimaryKeyValue<E>: Send;

    /// [`Repository::find_by`] plus every declared relation
    async fn find_by_with_relations(
        &self,
        ctx: &QueryContext,
        filter: Filter,
    ) -> AppResult<Vec<WithRelations<E::Model>>>;

    /// Insert one row, returning it as stored
    async fn create(&self, ctx: &QueryContext, model: E::ActiveModel) -> AppResult<E::Model>;

    /// Insert many rows in one statement; an empty batch does nothing
    async fn create_bulk(&self, ctx: &QueryContext, models: Vec<E::ActiveModel>) -> AppResult<u64>;

    /// Partial update of the row identified by `model`'s primary key
    async fn update(&self, ctx: &QueryContext, model: &E::Model, changes: Changes)
        -> AppResult<()>;

    /// Insert-or-update each model inside one transaction
    async fn update_all(&self, ctx: &QueryContext, models: Vec<E::ActiveModel>) -> AppResult<()>;

    /// Delete the row identified by `model`'s primary key
    async fn delete(&self, ctx: &QueryContext, model: &E::Model) -> AppResult<()>;

    /// Raw statement decoded into models
    async fn raw(&self, ctx: &QueryContext, sql: &str, values: Vec<Value>)
        -> AppResult<Vec<E::Model>>;

    /// Raw statement, first row untyped
    async fn raw_map_first(&self, ctx: &QueryContext, sql: &str, values: Vec<Value>)
        -> AppResult<Row>;

    /// Raw statement, all rows untyped
    async fn raw_map_slice(
        &self,
        ctx: &QueryContext,
        sql: &str,
        values: Vec<Value>,
    ) -> AppResult<Vec<Row>>;

    /// One page of `E` with metadata
    async fn pages(
        &self,
        ctx: &QueryContext,
        paging: &mut Paging,
    ) -> AppResult<(Vec<E::Model>, Pagination)>;
}
