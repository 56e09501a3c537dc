use anyhow::Context;
use bookshelf_kernel::settings::{DatabaseSettings, Settings};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about = "Book catalog service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Print the merged OpenAPI document
    Openapi,
    /// Load configuration and print the resolved settings
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command {
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            bookshelf_app::run(&settings).await
        }
        Command::Openapi => {
            // Only the module descriptions are needed, not the configured database
            let mut settings = settings;
            settings.database = DatabaseSettings::in_memory();

            let app = bookshelf_app::App::bootstrap(&settings).await?;
            let document = bookshelf_http::router::openapi_document(&app.registry);
            app.db.close().await;

            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        Command::CheckConfig => {
            println!("{:#?}", settings);
            Ok(())
        }
    }
}
