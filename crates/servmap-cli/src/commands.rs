//! Command handlers for the operator CLI.
//!
//! `recompute` is the manual-trigger entry point; it walks the same path as
//! the daily cron job. Per-service failures are logged and skipped inside
//! the engine so one bad service never aborts the full run.

use std::sync::Arc;

use servmap_core::{load_services, AppConfig, ServiceConfig};
use servmap_engine::{
    build_scheduler, extract_borders, Engine, HttpSnapshotStore, RefreshMode, SnapshotStore,
};
use servmap_osrm::OsrmClient;

type CliEngine = Engine<OsrmClient, HttpSnapshotStore>;

/// Recompute territories for one service (by slug) or all configured
/// services. Forced refresh unless the caller opted out.
pub(crate) async fn run_recompute(
    engine: &CliEngine,
    config: &AppConfig,
    service_filter: Option<&str>,
    force: bool,
) -> anyhow::Result<()> {
    let services = load_services(&config.services_path)?.services;
    let selected: Vec<ServiceConfig> = match service_filter {
        Some(slug) => {
            let service = services
                .into_iter()
                .find(|s| s.slug() == slug)
                .ok_or_else(|| anyhow::anyhow!("service '{slug}' not found"))?;
            vec![service]
        }
        None => services,
    };

    if selected.is_empty() {
        tracing::warn!("no services configured; nothing to recompute");
        return Ok(());
    }

    let mode = if force {
        RefreshMode::Force
    } else {
        RefreshMode::Reuse
    };
    engine.recompute_all(&selected, mode).await;
    Ok(())
}

/// Fetch the cached snapshot for a service and print its border segments as
/// JSON, the same feed the rendering surface consumes.
pub(crate) async fn run_borders(store: &HttpSnapshotStore, service: &str) -> anyhow::Result<()> {
    let Some(snapshot) = store.get(service).await? else {
        anyhow::bail!("no snapshot cached for service '{service}' — territories not yet available");
    };

    if !snapshot.is_complete() {
        tracing::warn!(
            service,
            assigned = snapshot.grid.len(),
            total = snapshot.total_points,
            "snapshot is partial; borders reflect incomplete data"
        );
    }

    let segments = extract_borders(&snapshot);
    println!("{}", serde_json::to_string_pretty(&segments)?);
    Ok(())
}

/// Start the cron scheduler and idle until ctrl-c or SIGTERM.
pub(crate) async fn run_scheduler(engine: Arc<CliEngine>, config: &AppConfig) -> anyhow::Result<()> {
    let mut scheduler = build_scheduler(
        engine,
        config.services_path.clone(),
        &config.recompute_cron,
    )
    .await?;

    tracing::info!(cron = %config.recompute_cron, "scheduler started; waiting for shutdown signal");
    shutdown_signal().await;

    scheduler.shutdown().await?;
    tracing::info!("scheduler stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
