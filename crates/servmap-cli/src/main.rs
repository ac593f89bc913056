mod commands;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use servmap_engine::{ComputeConfig, Engine, HttpSnapshotStore};
use servmap_osrm::OsrmClient;

#[derive(Debug, Parser)]
#[command(name = "servmap")]
#[command(about = "Service territory computation and caching")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Recompute territories now (the manual trigger).
    Recompute {
        /// Only this service slug; all configured services when omitted.
        #[arg(long)]
        service: Option<String>,
        /// Reuse a current snapshot instead of forcing a full recompute.
        #[arg(long)]
        no_force: bool,
    },
    /// Print the border segments of a cached snapshot as JSON.
    Borders {
        #[arg(long)]
        service: String,
    },
    /// Run the background scheduler until interrupted.
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(servmap_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let provider = Arc::new(OsrmClient::new(
        &config.osrm_base_url,
        &config.osrm_profile,
        config.request_timeout_secs,
    )?);
    let store = Arc::new(HttpSnapshotStore::new(
        &config.cache_base_url,
        config.request_timeout_secs,
    )?);
    let engine = Arc::new(Engine::new(
        provider,
        Arc::clone(&store),
        ComputeConfig::from_app_config(&config),
    ));

    match cli.command {
        Commands::Recompute { service, no_force } => {
            commands::run_recompute(&engine, &config, service.as_deref(), !no_force).await
        }
        Commands::Borders { service } => commands::run_borders(store.as_ref(), &service).await,
        Commands::Run => commands::run_scheduler(engine, &config).await,
    }
}
