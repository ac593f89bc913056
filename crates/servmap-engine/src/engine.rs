//! Per-service computer registry shared by the scheduler and the manual
//! trigger path.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use servmap_core::ServiceConfig;

use crate::computer::{ComputeConfig, ComputeOutcome, RefreshMode, TerritoryComputer};
use crate::provider::RoutingProvider;
use crate::store::SnapshotStore;

/// Owns one [`TerritoryComputer`] per service key, created lazily. All
/// triggers — cron, CLI, view events — funnel through here so the
/// per-service single-flight guard actually guards.
pub struct Engine<P, S> {
    provider: Arc<P>,
    store: Arc<S>,
    config: ComputeConfig,
    computers: Mutex<HashMap<String, Arc<TerritoryComputer<P, S>>>>,
}

impl<P, S> Engine<P, S>
where
    P: RoutingProvider,
    S: SnapshotStore,
{
    pub fn new(provider: Arc<P>, store: Arc<S>, config: ComputeConfig) -> Self {
        Self {
            provider,
            store,
            config,
            computers: Mutex::new(HashMap::new()),
        }
    }

    /// The computer for a service key, created on first use.
    pub async fn computer_for(&self, service_key: &str) -> Arc<TerritoryComputer<P, S>> {
        let mut computers = self.computers.lock().await;
        Arc::clone(computers.entry(service_key.to_string()).or_insert_with(|| {
            Arc::new(TerritoryComputer::new(
                service_key,
                Arc::clone(&self.provider),
                Arc::clone(&self.store),
                self.config,
            ))
        }))
    }

    /// Compute (or serve) territories for one service.
    pub async fn recompute_service(
        &self,
        service: &ServiceConfig,
        mode: RefreshMode,
    ) -> ComputeOutcome {
        let computer = self.computer_for(&service.slug()).await;
        computer.compute(&service.locations, mode).await
    }

    /// Run every service in sequence. One service's outcome never blocks or
    /// fails the others.
    pub async fn recompute_all(&self, services: &[ServiceConfig], mode: RefreshMode) {
        for service in services {
            let slug = service.slug();
            match self.recompute_service(service, mode).await {
                ComputeOutcome::Completed(s) => {
                    tracing::info!(service = %slug, points = s.grid.len(), "recompute complete");
                }
                ComputeOutcome::Cached(_) => {
                    tracing::info!(service = %slug, "snapshot already current");
                }
                ComputeOutcome::Partial(s) => {
                    tracing::warn!(
                        service = %slug,
                        assigned = s.grid.len(),
                        total = s.total_points,
                        "recompute left gaps; will resume next pass"
                    );
                }
                ComputeOutcome::Skipped(reason) => {
                    tracing::info!(service = %slug, ?reason, "recompute skipped");
                }
            }
        }
    }
}
