//! SQLite pool factory and schema bootstrap.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::TableSchema;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Shared handle to the connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool for the configured database, creating the file if needed.
    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&settings.url)
            .with_context(|| format!("invalid database url '{}'", settings.url))?
            .create_if_missing(true);

        let pool_options = if is_in_memory(&settings.url) {
            // Every connection to `:memory:` is its own database, so keep exactly
            // one alive for the lifetime of the pool.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(settings.max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed to connect to '{}'", settings.url))?;

        tracing::info!(
            target: "bookshelf-db",
            url = %settings.url,
            "database pool ready"
        );

        Ok(Self { pool })
    }

    /// Private in-memory database, mostly for tests.
    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::connect(&DatabaseSettings::in_memory()).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Execute each module's table DDL. Statements must be idempotent.
    pub async fn ensure_tables(&self, tables: &[(String, TableSchema)]) -> anyhow::Result<()> {
        for (module, table) in tables {
            tracing::info!(
                target: "bookshelf-db",
                module = %module,
                table = table.table,
                "ensuring table"
            );

            sqlx::raw_sql(table.ddl)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!(
                        "failed to create table '{}' for module '{}'",
                        table.table, module
                    )
                })?;
        }

        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "bookshelf-db", "database pool closed");
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
