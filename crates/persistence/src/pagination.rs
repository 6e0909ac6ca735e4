//! Counted, windowed fetches.
//!
//! The count and the window run concurrently on independent copies of the
//! query. With a pooled connection each branch checks out its own session, so
//! the count is consistent with the filter but not snapshot-consistent with
//! the returned rows.

use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, QueryTrait, Select};
use serde::Serialize;

use common::{AppError, AppResult};
use domain::{Pagination, Paging};

use crate::context::QueryContext;
use crate::query::{filter_query, prepare_query, window_query};

/// Response envelope for list endpoints.
///
/// When `error` is set, `items` is empty and `pagination` is absent.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    #[serde(rename = "data")]
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AppError>,
}

impl<T> PaginatedResponse<T> {
    pub fn success(items: Vec<T>, pagination: Pagination) -> Self {
        Self {
            items,
            pagination: Some(pagination),
            error: None,
        }
    }

    pub fn failure(error: AppError) -> Self {
        Self {
            items: Vec::new(),
            pagination: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Back to a `Result`, for callers that prefer `?`
    pub fn into_result(self) -> AppResult<(Vec<T>, Pagination)> {
        match (self.error, self.pagination) {
            (Some(err), _) => Err(err),
            (None, Some(pagination)) => Ok((self.items, pagination)),
            (None, None) => Err(AppError::internal("pagination metadata missing")),
        }
    }
}

/// Fetch one page of `query` together with its metadata.
///
/// `paging` is normalized in place. Both statements honour the context
/// deadline; the first failure cancels the other branch and is returned.
pub async fn pages<E, C>(
    db: &C,
    ctx: &QueryContext,
    query: Select<E>,
    paging: &mut Paging,
) -> AppResult<(Vec<E::Model>, Pagination)>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    paging.normalize();
    let filtered = filter_query(query, paging);
    let windowed = window_query(filtered.clone(), paging);

    if paging.show_sql {
        let statement = windowed.build(db.get_database_backend());
        tracing::info!(label = ctx.label(), sql = %statement, "Paginated query");
    }

    let (total_records, items) = tokio::try_join!(
        ctx.run("count", filtered.count(db)),
        ctx.run("fetch", windowed.all(db)),
    )?;

    let pagination = Pagination::new(total_records, paging);
    tracing::debug!(
        label = ctx.label(),
        page = pagination.page,
        limit = pagination.limit,
        total_records,
        total_page = pagination.total_page,
        returned = items.len(),
        "Fetched page"
    );

    Ok((items, pagination))
}

/// Like [`pages`], with failures folded into the envelope.
pub async fn paginate<E, C>(
    db: &C,
    ctx: &QueryContext,
    query: Select<E>,
    mut paging: Paging,
) -> PaginatedResponse<E::Model>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    match pages(db, ctx, query, &mut paging).await {
        Ok((items, pagination)) => PaginatedResponse::success(items, pagination),
        Err(err) => {
            tracing::warn!(label = ctx.label(), error = %err, "Pagination failed");
            PaginatedResponse::failure(err)
        }
    }
}

/// Reusable modifier applying filter, order and window without counting.
///
/// `paging` is normalized in place so the caller can read the effective
/// limit, page and offset back.
pub fn paginate_scope<E: EntityTrait>(
    paging: &mut Paging,
) -> impl Fn(Select<E>) -> Select<E> + Clone + Send + Sync {
    paging.normalize();
    paging.ensure_order();
    let paging = paging.clone();

    move |query| {
        let mut paging = paging.clone();
        prepare_query(query, Some(&mut paging))
    }
}

/// Number of rows matching `query`, ignoring any order or window on it.
pub async fn count<E, C>(db: &C, ctx: &QueryContext, query: Select<E>) -> AppResult<u64>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    ctx.run("count", query.count(db)).await
}
