//! Counted, windowed fetches against a mock connection.

mod entities;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use common::AppError;
use domain::Paging;
use entities::{sample_user, user};
use persistence::{count, pages, paginate, QueryContext};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait, ExecResult,
    MockDatabase, QueryResult, QuerySelect, Statement, Value,
};

fn count_row(total: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(total)))])
}

fn mock(total: i64, rows: Vec<user::Model>) -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(total)]])
        .append_query_results([rows])
        .into_connection()
}

/// Answers single-row statements (the count) from `inner`; multi-row
/// statements (the page fetch) never complete.
struct StalledFetch {
    inner: DatabaseConnection,
}

#[async_trait]
impl ConnectionTrait for StalledFetch {
    fn get_database_backend(&self) -> DatabaseBackend {
        self.inner.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        self.inner.execute(stmt).await
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        self.inner.execute_unprepared(sql).await
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        self.inner.query_one(stmt).await
    }

    async fn query_all(&self, _stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        std::future::pending().await
    }
}

fn stalled_fetch(total: i64) -> StalledFetch {
    StalledFetch {
        inner: MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(total)]])
            .into_connection(),
    }
}

fn statements(db: DatabaseConnection) -> Vec<String> {
    db.into_transaction_log()
        .iter()
        .map(|txn| format!("{txn:?}"))
        .collect()
}

#[tokio::test]
async fn test_middle_page() {
    let db = mock(45, vec![sample_user(25, "alice", 30), sample_user(24, "bob", 41)]);
    let mut paging = Paging::new().with_page(2).with_limit(20);

    let (items, pagination) = pages(&db, &QueryContext::background(), user::Entity::find(), &mut paging)
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(pagination.total_records, 45);
    assert_eq!(pagination.total_page, 3);
    assert_eq!(pagination.offset, 20);
    assert_eq!(pagination.limit, 20);
    assert_eq!(pagination.page, 2);
    assert_eq!(pagination.prev_page, 1);
    assert_eq!(pagination.next_page, 3);
    assert_eq!(paging.offset(), 20);
}

#[tokio::test]
async fn test_count_ignores_window_and_order() {
    let db = mock(3, vec![sample_user(1, "alice", 30)]);
    let mut paging = Paging::new()
        .with_search("name", "a")
        .with_operator("c")
        .with_order("name asc");

    pages(&db, &QueryContext::background(), user::Entity::find(), &mut paging)
        .await
        .unwrap();

    let log = statements(db);
    assert_eq!(log.len(), 2);

    let count_sql = &log[0];
    assert!(count_sql.contains("COUNT(*)"), "{count_sql}");
    assert!(count_sql.contains("name LIKE $1"), "{count_sql}");
    assert!(!count_sql.contains("LIMIT"), "{count_sql}");
    assert!(!count_sql.contains("ORDER BY"), "{count_sql}");

    let fetch_sql = &log[1];
    assert!(fetch_sql.contains("name LIKE $1"), "{fetch_sql}");
    assert!(fetch_sql.contains("ORDER BY name ASC"), "{fetch_sql}");
    assert!(fetch_sql.contains("LIMIT"), "{fetch_sql}");
}

#[tokio::test]
async fn test_empty_result_is_not_an_error() {
    let db = mock(0, Vec::new());
    let mut paging = Paging::new();

    let (items, pagination) = pages(&db, &QueryContext::background(), user::Entity::find(), &mut paging)
        .await
        .unwrap();

    assert!(items.is_empty());
    assert!(pagination.is_empty());
    assert_eq!(pagination.total_page, 0);
    assert_eq!(pagination.page, 1);
    assert_eq!(pagination.prev_page, 1);
    assert_eq!(pagination.next_page, 2);
}

#[tokio::test]
async fn test_last_page() {
    let db = mock(45, vec![sample_user(5, "eve", 22)]);
    let paging = Paging::new().with_page(3).with_limit(20).with_show_sql(true);

    let response = paginate(&db, &QueryContext::background(), user::Entity::find(), paging).await;

    assert!(response.is_success());
    let pagination = response.pagination.unwrap();
    assert_eq!(pagination.next_page, 3);
    assert_eq!(pagination.prev_page, 2);
    assert_eq!(response.items.len(), 1);
}

#[tokio::test]
async fn test_paginate_folds_store_failure() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection reset".into())])
        .into_connection();

    let response = paginate(&db, &QueryContext::background(), user::Entity::find(), Paging::new()).await;

    assert!(!response.is_success());
    assert!(response.items.is_empty());
    assert!(response.pagination.is_none());
    assert!(matches!(response.error, Some(AppError::Database(_))));

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["error"]["code"], "DATABASE_ERROR");
}

#[tokio::test]
async fn test_count() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(7)]])
        .into_connection();

    let total = count(&db, &QueryContext::background(), user::Entity::find()).await.unwrap();
    assert_eq!(total, 7);
}

#[tokio::test]
async fn test_count_drops_window_set_on_query() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(45)]])
        .into_connection();

    let query = user::Entity::find().limit(5).offset(10);
    let total = count(&db, &QueryContext::background(), query).await.unwrap();
    assert_eq!(total, 45);

    let log = statements(db);
    assert!(log[0].contains("COUNT(*)"), "{}", log[0]);
    assert!(!log[0].contains("LIMIT"), "{}", log[0]);
    assert!(!log[0].contains("OFFSET"), "{}", log[0]);
}

// =============================================================================
// Deadlines
// =============================================================================

#[tokio::test]
async fn test_deadline_covers_whole_page_fetch() {
    let db = stalled_fetch(45);
    let ctx = QueryContext::with_timeout(Duration::from_millis(20)).labeled("users");
    let mut paging = Paging::new().with_page(2);

    let err = pages(&db, &ctx, user::Entity::find(), &mut paging)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Timeout(ref op) if op == "fetch"), "{err:?}");
    assert!(ctx.is_expired());
}

#[tokio::test]
async fn test_paginate_folds_deadline() {
    let db = stalled_fetch(45);
    let ctx = QueryContext::with_timeout(Duration::from_millis(20));

    let response = paginate(&db, &ctx, user::Entity::find(), Paging::new()).await;

    assert!(!response.is_success());
    assert!(response.pagination.is_none());

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["error"]["code"], "DEADLINE_EXCEEDED");
}
