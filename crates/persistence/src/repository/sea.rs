//! [`Repository`] implementation for any sea-orm entity.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, FromQueryResult, IdenStatic, IntoActiveModel, Iterable, QueryFilter,
    QuerySelect, Select, Statement, TransactionTrait, Value,
};
use serde_json::Value as JsonValue;

use common::{AppError, AppResult, OptionExt};
use domain::{Pagination, Paging};

use super::filter::{identity_condition, Changes, Filter};
use super::relations::{load_relations, WithRelations};
use super::{PrimaryKeyValue, Repository, Row};
use crate::context::QueryContext;
use crate::pagination;

/// Repository for entity `E` bound to one shared connection.
pub struct SeaRepository<E> {
    db: Arc<DatabaseConnection>,
    table: String,
    /// Column projection applied to reads; `None` selects every column
    projection: Option<Arc<[String]>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for SeaRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            table: self.table.clone(),
            projection: self.projection.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: EntityTrait> SeaRepository<E> {
    /// Create new repository instance
    pub fn new(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self {
            db: db.into(),
            table: E::default().table_name().to_string(),
            projection: None,
            _entity: PhantomData,
        }
    }

    /// A view of this repository whose reads select only `fields`.
    ///
    /// Names matching a column of `E` are table-qualified, anything else is
    /// used as a raw expression. Rows are still decoded into `E::Model`, so
    /// every non-nullable column must be part of the projection. `self` is
    /// left unchanged.
    pub fn select<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        Self {
            projection: Some(fields.into()),
            ..self.clone()
        }
    }

    /// Current column projection
    pub fn projection(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }

    /// Raw statement decoded into any row type.
    pub async fn raw_any<R>(
        &self,
        ctx: &QueryContext,
        sql: &str,
        values: Vec<Value>,
    ) -> AppResult<Vec<R>>
    where
        R: FromQueryResult + Send + Sync,
    {
        let stmt = self.statement(sql, values);
        ctx.run("raw_any", R::find_by_statement(stmt).all(self.connection())).await
    }

    fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn backend(&self) -> DbBackend {
        self.db.get_database_backend()
    }

    fn statement(&self, sql: &str, values: Vec<Value>) -> Statement {
        Statement::from_sql_and_values(self.backend(), sql, values)
    }

    fn project(&self, query: Select<E>) -> Select<E> {
        let Some(fields) = &self.projection else {
            return query;
        };

        fields.iter().fold(query.select_only(), |query, field| {
            match E::Column::iter().find(|c| c.as_str() == field.as_str()) {
                Some(column) => query.column(column),
                None => query.expr(Expr::cust(field.clone())),
            }
        })
    }

    async fn hydrate(&self, model: E::Model) -> AppResult<WithRelations<E::Model>> {
        let relations = load_relations::<E, _>(self.connection(), &model).await?;
        Ok(WithRelations { model, relations })
    }
}

fn into_row(value: JsonValue) -> AppResult<Row> {
    match value {
        JsonValue::Object(row) => Ok(row),
        other => Err(AppError::internal(format!("expected a row object, got {other}"))),
    }
}

#[async_trait]
impl<E> Repository<E> for SeaRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelBehavior + Send,
{
    fn get_db(&self) -> &DatabaseConnection {
        self.connection()
    }

    async fn find(&self, ctx: &QueryContext, id: PrimaryKeyValue<E>) -> AppResult<E::Model>
    where
        PrimaryKeyValue<E>: Send,
    {
        let query = self.project(E::find_by_id(id));
        ctx.run("find", query.one(self.connection())).await?.ok_or_not_found()
    }

    async fn find_by(&self, ctx: &QueryContext, filter: Filter) -> AppResult<Vec<E::Model>> {
        let condition = filter.into_condition()?;
        let query = self.project(E::find()).filter(condition);
        ctx.run("find_by", query.all(self.connection())).await
    }

    async fn find_first_by(&self, ctx: &QueryContext, filter: Filter) -> AppResult<E::Model> {
        let condition = filter.into_condition()?;
        let query = self.project(E::find()).filter(condition);
        ctx.run("find_first_by", query.one(self.connection()))
            .await?
            .ok_or_not_found()
    }

    async fn all(&self, ctx: &QueryContext) -> AppResult<Vec<E::Model>> {
        ctx.run("all", self.project(E::find()).all(self.connection())).await
    }

    async fn find_with_relations(
        &self,
        ctx: &QueryContext,
        id: PrimaryKeyValue<E>,
    ) -> AppResult<WithRelations<E::Model>>
    where
        PrimaryKeyValue<E>: Send,
    {
        ctx.run("find_with_relations", async {
            let model = self.find(&QueryContext::background(), id).await?;
            self.hydrate(model).await
        })
        .await
    }

    async fn find_by_with_relations(
        &self,
        ctx: &QueryContext,
        filter: Filter,
    ) -> AppResult<Vec<WithRelations<E::Model>>> {
        ctx.run("find_by_with_relations", async {
            let models = self.find_by(&QueryContext::background(), filter).await?;
            let mut hydrated = Vec::with_capacity(models.len());
            for model in models {
                hydrated.push(self.hydrate(model).await?);
            }
            Ok::<_, AppError>(hydrated)
        })
        .await
    }

    async fn create(&self, ctx: &QueryContext, model: E::ActiveModel) -> AppResult<E::Model> {
        let created = ctx.run("create", model.insert(self.connection())).await?;
        tracing::debug!(table = %self.table, "Row created");
        Ok(created)
    }

    async fn create_bulk(&self, ctx: &QueryContext, models: Vec<E::ActiveModel>) -> AppResult<u64> {
        if models.is_empty() {
            return Ok(0);
        }

        let inserted = ctx
            .run("create_bulk", E::insert_many(models).exec_without_returning(self.connection()))
            .await?;
        tracing::debug!(table = %self.table, inserted, "Rows created");
        Ok(inserted)
    }

    async fn update(
        &self,
        ctx: &QueryContext,
        model: &E::Model,
        changes: Changes,
    ) -> AppResult<()> {
        let update = changes
            .into_assignments()?
            .into_iter()
            .fold(E::update_many(), |update, (column, expr)| {
                update.col_expr(Alias::new(column), expr)
            })
            .filter(identity_condition::<E>(model));

        let result = ctx.run("update", update.exec(self.connection())).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        tracing::debug!(table = %self.table, rows = result.rows_affected, "Row updated");
        Ok(())
    }

    async fn update_all(&self, ctx: &QueryContext, models: Vec<E::ActiveModel>) -> AppResult<()> {
        let total = models.len();

        ctx.run("update_all", async {
            let txn = self.db.begin().await?;

            let saved = async {
                for model in models {
                    model.save(&txn).await?;
                }
                Ok::<_, DbErr>(())
            }
            .await;

            match saved {
                Ok(()) => {
                    txn.commit().await?;
                    Ok::<_, AppError>(())
                }
                Err(e) => {
                    if let Err(rollback_err) = txn.rollback().await {
                        tracing::error!("Transaction rollback failed: {}", rollback_err);
                    }
                    Err(AppError::from(e))
                }
            }
        })
        .await?;

        tracing::debug!(table = %self.table, rows = total, "Rows saved");
        Ok(())
    }

    async fn delete(&self, ctx: &QueryContext, model: &E::Model) -> AppResult<()> {
        let delete = E::delete_many().filter(identity_condition::<E>(model));
        let result = ctx.run("delete", delete.exec(self.connection())).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        tracing::debug!(table = %self.table, "Row deleted");
        Ok(())
    }

    async fn raw(
        &self,
        ctx: &QueryContext,
        sql: &str,
        values: Vec<Value>,
    ) -> AppResult<Vec<E::Model>> {
        let query = E::find().from_raw_sql(self.statement(sql, values));
        ctx.run("raw", query.all(self.connection())).await
    }

    async fn raw_map_first(
        &self,
        ctx: &QueryContext,
        sql: &str,
        values: Vec<Value>,
    ) -> AppResult<Row> {
        let query = JsonValue::find_by_statement(self.statement(sql, values));
        let row = ctx.run("raw_map_first", query.one(self.connection())).await?;
        into_row(row.ok_or_not_found()?)
    }

    async fn raw_map_slice(
        &self,
        ctx: &QueryContext,
        sql: &str,
        values: Vec<Value>,
    ) -> AppResult<Vec<Row>> {
        let query = JsonValue::find_by_statement(self.statement(sql, values));
        let rows = ctx.run("raw_map_slice", query.all(self.connection())).await?;
        rows.into_iter().map(into_row).collect()
    }

    async fn pages(
        &self,
        ctx: &QueryContext,
        paging: &mut Paging,
    ) -> AppResult<(Vec<E::Model>, Pagination)> {
        pagination::pages(self.connection(), ctx, self.project(E::find()), paging).await
    }
}
