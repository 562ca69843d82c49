//! quotes-admin - administrative back-office for the quotes catalog
//!
//! Serves CRUD, filtering and batch deletion for authors, quotes and tags
//! over a SQLite database in the root folder.

use anyhow::Result;
use clap::Parser;
use quotes_common::config::{ensure_directory_exists, AdminConfig, TomlConfig};
use quotes_common::db::init_database;
use quotes_admin::cli::Cli;
use quotes_admin::{build_router, AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification before any database work
    info!(
        "Starting quotes-admin v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // CLI and environment override the config file, which overrides defaults
    let file_config = TomlConfig::load();
    let config = AdminConfig::resolve(cli.root_folder, cli.bind, &file_config);

    ensure_directory_exists(&config.root_folder)?;

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("quotes-admin listening on http://{}", config.bind);
    info!("Admin dashboard: http://{}/admin", config.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
