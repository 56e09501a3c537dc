//! Bookshelf application library
//!
//! Domain modules plus the bootstrap shared by the `bookshelf-app` binary and
//! the CLI.

pub mod modules;

use anyhow::Context;
use bookshelf_db::Database;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// A connected database and the modules that use it, ready to serve.
pub struct App {
    pub registry: ModuleRegistry,
    pub db: Database,
}

impl App {
    /// Connect, register modules, create their tables, and run `init`.
    pub async fn bootstrap(settings: &Settings) -> anyhow::Result<Self> {
        let db = Database::connect(&settings.database)
            .await
            .context("failed to open database")?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db);

        db.ensure_tables(&registry.collect_tables())
            .await
            .context("failed to create module tables")?;

        let ctx = InitCtx { settings };
        registry.init_all(&ctx).await?;

        Ok(Self { registry, db })
    }

    /// Start modules, serve HTTP until shutdown, then stop modules and close the pool.
    pub async fn serve(self, settings: &Settings) -> anyhow::Result<()> {
        let ctx = InitCtx { settings };
        self.registry.start_all(&ctx).await?;

        let served = bookshelf_http::start_server(&self.registry, settings).await;

        self.registry.stop_all().await?;
        self.db.close().await;
        served
    }
}

/// Bootstrap and serve. Telemetry must already be installed.
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookshelf bootstrap starting"
    );

    let app = App::bootstrap(settings).await?;
    tracing::info!(modules = app.registry.len(), "bookshelf bootstrap complete");

    app.serve(settings).await
}
