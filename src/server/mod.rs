pub mod app;
pub mod error;
pub mod handlers;
pub mod openapi;

use anyhow::Result;
use clap::Subcommand;
use sea_orm_migration::prelude::*;
use tracing::info;

use crate::app_context::AppContext;
use crate::config::RegistryConfig;
use crate::database::{connection::*, migrations::Migrator};

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn start_server(config: &RegistryConfig) -> Result<()> {
    let database_url = get_database_url(Some(&config.database.path));
    let db = establish_connection(&database_url).await?;

    // Run migrations
    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    let ctx = AppContext::from_config(db, config);
    let app = app::create_app(ctx, config.server.cors_origin.as_deref())?;

    log_routes();

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server running on http://{}", address);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                          - Health check");
    info!("  /docs                            - Swagger UI documentation");
    info!("  /api/v1/systems                  - Systems (list, create, detail, update, delete)");
    info!("  /api/v1/systems/:id/activate     - Move a system to production");
    info!("  /api/v1/systems/:id/deprecate    - Deprecate a system");
    info!("  /api/v1/systems/:id/hierarchy    - Ancestors and children");
    info!("  /api/v1/search                   - Free-text system search");
    info!("  /api/v1/dataflows                - Data flows");
    info!("  /api/v1/statistics               - Dashboard statistics");
    info!("  /api/v1/diagram/dataflow         - Data flow diagram");
    info!("  /api/v1/export/excel             - Spreadsheet export");
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
