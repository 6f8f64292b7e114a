use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use landscape::app_context::AppContext;
use landscape::config::RegistryConfig;
use landscape::database::{establish_connection, get_database_url, setup_database};
use landscape::server;
use landscape::services::query::SystemQuery;
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// TOML configuration file; missing file means defaults
    #[clap(short, long, global = true, default_value = "landscape.toml")]
    config: PathBuf,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Serve {
        #[clap(long)]
        host: Option<String>,
        #[clap(short, long)]
        port: Option<u16>,
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    /// Write the filtered system list to an XLSX file
    Export {
        #[clap(short, long)]
        database: Option<String>,
        /// Output file; defaults to a timestamped name in the current directory
        #[clap(short, long)]
        output: Option<PathBuf>,
        #[clap(long)]
        status: Option<String>,
        #[clap(long)]
        system_type: Option<String>,
        #[clap(long)]
        department: Option<String>,
        #[clap(long)]
        technology: Option<String>,
        #[clap(long)]
        criticality: Option<String>,
        #[clap(short, long)]
        q: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long)]
        database: Option<String>,
    },
    Migrate {
        #[clap(subcommand)]
        direction: server::MigrateDirection,
        #[clap(short, long)]
        database: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    let mut config = RegistryConfig::load(Some(&args.config))
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    match args.command {
        Commands::Serve {
            host,
            port,
            database,
            cors_origin,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(database) = database {
                config.database.path = database;
            }
            if cors_origin.is_some() {
                config.server.cors_origin = cors_origin;
            }
            info!("Starting server on port {}", config.server.port);
            server::start_server(&config).await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                let database = database.unwrap_or(config.database.path);
                info!("Initializing database: {}", database);
                server::migrate_database(&database, server::MigrateDirection::Up).await?;
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                let database = database.unwrap_or(config.database.path);
                info!("Running database migration: {:?}", direction);
                server::migrate_database(&database, direction).await?;
            }
        },
        Commands::Export {
            database,
            output,
            status,
            system_type,
            department,
            technology,
            criticality,
            q,
        } => {
            if let Some(database) = database {
                config.database.path = database;
            }
            let db = establish_connection(&get_database_url(Some(&config.database.path))).await?;
            setup_database(&db).await?;

            let ctx = AppContext::from_config(db, &config);
            let query = SystemQuery {
                status,
                system_type,
                department,
                technology,
                criticality,
                q,
                ..Default::default()
            };
            let export = ctx.export_systems(&query).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(&export.filename));
            tokio::fs::write(&path, &export.bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} systems to {}", export.rows, path.display());
        }
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .without_time()
        .init();
}
