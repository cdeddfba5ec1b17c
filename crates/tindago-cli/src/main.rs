mod analytics;
mod documents;
mod stores;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::analytics::AnalyticsCommands;
use crate::documents::DocumentsCommands;
use crate::stores::StoresCommands;

#[derive(Debug, Parser)]
#[command(name = "tindago-cli")]
#[command(about = "TindaGo store administration")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Review registrations and manage store status
    Stores {
        #[command(subcommand)]
        command: StoresCommands,
    },
    /// Open uploaded registration documents
    Documents {
        #[command(subcommand)]
        command: DocumentsCommands,
    },
    /// Sales reports
    Analytics {
        #[command(subcommand)]
        command: AnalyticsCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("tindago-cli: run with --help to list commands");
        return Ok(());
    };

    let config = tindago_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool_config = tindago_db::PoolConfig::from_app_config(&config);
    let pool = tindago_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                tindago_db::health_check(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = tindago_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
        },
        Commands::Stores { command } => match command {
            StoresCommands::List { status, limit } => {
                let limit = limit.unwrap_or(config.default_page_size);
                stores::run_stores_list(&pool, status, limit).await?;
            }
            StoresCommands::Show { id } => stores::run_stores_show(&pool, &id).await?,
            StoresCommands::Import { file, dry_run } => {
                stores::run_stores_import(&pool, &file, dry_run).await?;
            }
            StoresCommands::Transition {
                id,
                action,
                reason,
                expected_version,
                yes,
            } => {
                stores::run_stores_transition(
                    &pool,
                    stores::TransitionArgs {
                        id,
                        action,
                        reason,
                        expected_version,
                        confirmed: yes,
                    },
                )
                .await?;
            }
        },
        Commands::Documents { command } => match command {
            DocumentsCommands::Open { id, key } => {
                documents::run_documents_open(&pool, &config, &id, key.as_deref()).await?;
            }
        },
        Commands::Analytics { command } => match command {
            AnalyticsCommands::Sales => analytics::run_analytics_sales(&pool).await?,
        },
    }

    Ok(())
}
