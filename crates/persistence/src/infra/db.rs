//! Database connection and initialization.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr,
    EntityTrait, Statement,
};

use common::DatabaseConfig;

use crate::registry::repository;
use crate::repository::SeaRepository;

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: Arc<DatabaseConnection>,
}

impl Database {
    /// Open a pooled connection using the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .sqlx_logging(config.sql_logging);

        let connection = SeaDatabase::connect(options).await?;
        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database connected"
        );

        Ok(Self {
            connection: Arc::new(connection),
        })
    }

    /// Wrap an existing connection (mock connections in tests).
    pub fn from_connection(connection: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self {
            connection: connection.into(),
        }
    }

    /// Get a reference to the database connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Get a shared handle to the database connection.
    pub fn get_connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.connection)
    }

    /// Process-wide repository for `E`, bound to this connection on first use.
    pub fn repository<E: EntityTrait>(&self) -> Arc<SeaRepository<E>> {
        repository::<E>(&self.connection)
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }
}
