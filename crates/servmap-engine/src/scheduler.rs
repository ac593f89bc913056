//! Background job scheduler.
//!
//! Registers the recurring forced recompute (default 04:00 daily) against a
//! [`JobScheduler`]. The services file is re-read on every trigger so
//! location edits made since startup are picked up without a restart.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use servmap_core::load_services;

use crate::computer::RefreshMode;
use crate::engine::Engine;
use crate::provider::RoutingProvider;
use crate::store::SnapshotStore;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down the jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// `cron` does not parse, or the scheduler fails to start.
pub async fn build_scheduler<P, S>(
    engine: Arc<Engine<P, S>>,
    services_path: PathBuf,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError>
where
    P: RoutingProvider + 'static,
    S: SnapshotStore + 'static,
{
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let engine = Arc::clone(&engine);
        let services_path = services_path.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting forced territory recompute");
            run_recompute_job(&engine, &services_path).await;
            tracing::info!("scheduler: forced territory recompute finished");
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Drive the forced recompute across all configured services.
async fn run_recompute_job<P, S>(engine: &Engine<P, S>, services_path: &std::path::Path)
where
    P: RoutingProvider,
    S: SnapshotStore,
{
    let services = match load_services(services_path) {
        Ok(file) => file.services,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load services file");
            return;
        }
    };

    if services.is_empty() {
        tracing::info!("scheduler: no services configured; skipping");
        return;
    }

    tracing::info!(count = services.len(), "scheduler: recomputing territories");
    engine.recompute_all(&services, RefreshMode::Force).await;
}
