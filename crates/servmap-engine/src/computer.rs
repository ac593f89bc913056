//! Resumable, checkpointed territory computation for one service.
//!
//! The run walks `Idle → Resuming → Computing → Checkpointing → Finalizing`
//! as a plain sequential flow: batches go out strictly one at a time, the
//! only suspension points are the routing calls and the inter-batch delay,
//! and a single-flight guard drops (never queues) concurrent triggers.
//!
//! Failure model: provider errors skip the batch, store errors degrade to a
//! cache miss or a lost checkpoint. Nothing here aborts a run except the
//! run itself becoming stale.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};

use servmap_core::fingerprint::locations_fingerprint;
use servmap_core::types::{GridCell, LatLng, Location, TerritorySnapshot};
use servmap_core::AppConfig;

use crate::grid::{generate_grid, quantize, GridSpec};
use crate::provider::{assign_batch, RoutingProvider};
use crate::store::SnapshotStore;

/// Whether an existing snapshot may satisfy or seed the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Serve a current complete snapshot, resume a current partial one.
    Reuse,
    /// Ignore any stored snapshot and recompute every point from scratch.
    Force,
}

#[derive(Debug, Clone, Copy)]
pub struct ComputeConfig {
    pub grid_size: usize,
    pub max_distance_km: f64,
    pub batch_size: usize,
    /// Mid-run checkpoint cadence in batches; 0 disables mid-run checkpoints
    /// (the run still writes its final snapshot).
    pub checkpoint_every_batches: usize,
    pub inter_batch_delay: Duration,
}

impl ComputeConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            grid_size: config.grid_size,
            max_distance_km: config.max_distance_km,
            batch_size: config.batch_size,
            checkpoint_every_batches: config.checkpoint_every_batches,
            inter_batch_delay: Duration::from_millis(config.inter_batch_delay_ms),
        }
    }

    fn grid_spec(&self) -> GridSpec {
        GridSpec {
            size: self.grid_size,
            max_distance_km: self.max_distance_km,
        }
    }
}

/// Why a trigger produced no computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than 2 mappable locations; no partition is meaningful.
    TooFewLocations,
    /// Another run is active for this service; the trigger is dropped.
    AlreadyRunning,
    /// The run was invalidated mid-flight and its writes were discarded.
    Superseded,
}

#[derive(Debug, Clone)]
pub enum ComputeOutcome {
    /// Every target point assigned; a complete snapshot was written.
    Completed(TerritorySnapshot),
    /// The stored complete snapshot is current; zero routing calls made.
    Cached(TerritorySnapshot),
    /// Some batches failed. A partial checkpoint was written; the missing
    /// points stay eligible for the next pass.
    Partial(TerritorySnapshot),
    Skipped(SkipReason),
}

impl ComputeOutcome {
    /// The snapshot produced or served by this trigger, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<&TerritorySnapshot> {
        match self {
            ComputeOutcome::Completed(s) | ComputeOutcome::Cached(s) | ComputeOutcome::Partial(s) => {
                Some(s)
            }
            ComputeOutcome::Skipped(_) => None,
        }
    }
}

/// Per-service computation context. One instance per service key; holds the
/// single-flight guard, the staleness generation, and the channel feeding
/// the rendering surface. Never a process-wide singleton, so services run
/// independently.
pub struct TerritoryComputer<P, S> {
    service_key: String,
    provider: Arc<P>,
    store: Arc<S>,
    config: ComputeConfig,
    in_flight: Mutex<()>,
    generation: AtomicU64,
    current: watch::Sender<Option<TerritorySnapshot>>,
}

impl<P, S> TerritoryComputer<P, S>
where
    P: RoutingProvider,
    S: SnapshotStore,
{
    pub fn new(service_key: &str, provider: Arc<P>, store: Arc<S>, config: ComputeConfig) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            service_key: service_key.to_string(),
            provider,
            store,
            config,
            in_flight: Mutex::new(()),
            generation: AtomicU64::new(0),
            current,
        }
    }

    /// Current best-known snapshot, progressively updated during a run.
    /// Consumers must fully replace their previous drawing on every change,
    /// never patch it: a fresh run's grid and an aborted run's leftovers
    /// must not blend.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<TerritorySnapshot>> {
        self.current.subscribe()
    }

    /// Marks any in-flight run stale. The run discards its remaining
    /// checkpoint and final writes instead of racing the next run's output.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_current(&self, run_generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == run_generation
    }

    /// Compute (or serve) the territory partition for this service.
    ///
    /// `locations` is the read-only registry input; only mappable locations
    /// (coordinates present, not fallback) participate. A trigger while
    /// another run is active is dropped, not queued.
    pub async fn compute(&self, locations: &[Location], mode: RefreshMode) -> ComputeOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!(
                service = %self.service_key,
                "computation already running; dropping trigger"
            );
            return ComputeOutcome::Skipped(SkipReason::AlreadyRunning);
        };
        let run_generation = self.generation.load(Ordering::SeqCst);

        let mappable: Vec<Location> = locations.iter().filter(|l| l.is_mappable()).cloned().collect();
        if mappable.len() < 2 {
            tracing::info!(
                service = %self.service_key,
                mappable = mappable.len(),
                "fewer than 2 mappable locations; skipping territory computation"
            );
            return ComputeOutcome::Skipped(SkipReason::TooFewLocations);
        }

        let fingerprint = locations_fingerprint(&mappable);
        let location_ids: Vec<String> = mappable.iter().map(|l| l.id.clone()).collect();
        let destinations: Vec<LatLng> = mappable.iter().filter_map(Location::coords).collect();

        // Resuming: seed already-computed cells from the stored snapshot.
        let mut computed: HashMap<(i64, i64), GridCell> = HashMap::new();
        if mode == RefreshMode::Reuse {
            match self.store.get(&self.service_key).await {
                Ok(Some(snapshot)) if snapshot.locations_fingerprint == fingerprint => {
                    if snapshot.is_complete() {
                        tracing::info!(
                            service = %self.service_key,
                            fingerprint = %fingerprint,
                            "complete snapshot is current; serving from cache"
                        );
                        self.publish(snapshot.clone(), run_generation);
                        return ComputeOutcome::Cached(snapshot);
                    }
                    tracing::info!(
                        service = %self.service_key,
                        cells = snapshot.grid.len(),
                        total = snapshot.total_points,
                        "resuming from partial snapshot"
                    );
                    for cell in snapshot.grid {
                        computed.insert(quantize(LatLng { lat: cell.lat, lng: cell.lng }), cell);
                    }
                }
                Ok(Some(snapshot)) => {
                    tracing::info!(
                        service = %self.service_key,
                        stored = %snapshot.locations_fingerprint,
                        current = %fingerprint,
                        "location set changed; stored snapshot is stale"
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    // Read failures degrade to a cache miss, never abort.
                    tracing::warn!(
                        service = %self.service_key,
                        error = %e,
                        "snapshot read failed; treating as cache miss"
                    );
                }
            }
        }

        let target = generate_grid(&destinations, &self.config.grid_spec());
        let total_points = target.points.len();
        let target_keys: HashSet<(i64, i64)> = target.points.iter().map(|p| quantize(*p)).collect();

        let mut grid: Vec<GridCell> = computed
            .iter()
            .filter(|(key, _)| target_keys.contains(*key))
            .map(|(_, cell)| *cell)
            .collect();
        let remaining: Vec<LatLng> = target
            .points
            .iter()
            .copied()
            .filter(|point| !computed.contains_key(&quantize(*point)))
            .collect();

        tracing::info!(
            service = %self.service_key,
            total = total_points,
            resumed = grid.len(),
            remaining = remaining.len(),
            "starting territory computation"
        );

        if !grid.is_empty() {
            let seed = TerritorySnapshot::checkpoint(
                grid.clone(),
                fingerprint.clone(),
                location_ids.clone(),
                total_points,
                self.config.grid_size,
                target.bounds,
            );
            self.publish(seed, run_generation);
        }

        let mut failed_points = 0usize;
        for (batch_index, batch) in remaining.chunks(self.config.batch_size).enumerate() {
            if batch_index > 0 {
                // The one intentional pause: keeps the routing provider's
                // rate limiter off our back.
                tokio::time::sleep(self.config.inter_batch_delay).await;
            }

            match self.provider.duration_table(batch, &destinations).await {
                Ok(table) => {
                    grid.extend(assign_batch(batch, &table));
                    let progress = TerritorySnapshot::checkpoint(
                        grid.clone(),
                        fingerprint.clone(),
                        location_ids.clone(),
                        total_points,
                        self.config.grid_size,
                        target.bounds,
                    );
                    self.publish(progress, run_generation);
                }
                Err(e) => {
                    // Not fatal: these points were never added to the
                    // snapshot, so the next pass picks them up.
                    failed_points += batch.len();
                    tracing::warn!(
                        service = %self.service_key,
                        batch = batch_index,
                        points = batch.len(),
                        error = %e,
                        "distance batch failed; skipping"
                    );
                }
            }

            let checkpoint_due = self.config.checkpoint_every_batches > 0
                && (batch_index + 1) % self.config.checkpoint_every_batches == 0;
            if checkpoint_due {
                tracing::info!(
                    service = %self.service_key,
                    assigned = grid.len(),
                    total = total_points,
                    "checkpointing progress"
                );
                let checkpoint = TerritorySnapshot::checkpoint(
                    grid.clone(),
                    fingerprint.clone(),
                    location_ids.clone(),
                    total_points,
                    self.config.grid_size,
                    target.bounds,
                );
                if !self.persist(&checkpoint, run_generation).await {
                    return ComputeOutcome::Skipped(SkipReason::Superseded);
                }
            }
        }

        // Finalized only once all target points are assigned; failed
        // batches leave the snapshot partial so resumption retries them.
        if failed_points == 0 && grid.len() == total_points {
            let snapshot = TerritorySnapshot::finished(
                grid,
                fingerprint,
                location_ids,
                total_points,
                self.config.grid_size,
                target.bounds,
            );
            if !self.persist(&snapshot, run_generation).await {
                return ComputeOutcome::Skipped(SkipReason::Superseded);
            }
            self.publish(snapshot.clone(), run_generation);
            tracing::info!(
                service = %self.service_key,
                points = snapshot.grid.len(),
                "territory computation complete"
            );
            ComputeOutcome::Completed(snapshot)
        } else {
            let snapshot = TerritorySnapshot::checkpoint(
                grid,
                fingerprint,
                location_ids,
                total_points,
                self.config.grid_size,
                target.bounds,
            );
            if !self.persist(&snapshot, run_generation).await {
                return ComputeOutcome::Skipped(SkipReason::Superseded);
            }
            self.publish(snapshot.clone(), run_generation);
            tracing::warn!(
                service = %self.service_key,
                assigned = snapshot.grid.len(),
                total = total_points,
                "run finished with missing points; snapshot stays partial"
            );
            ComputeOutcome::Partial(snapshot)
        }
    }

    /// Write a snapshot unless this run has been superseded. Returns `false`
    /// when the run is stale and must discard its result; a plain write
    /// failure is logged and swallowed (one checkpoint of progress lost at
    /// worst).
    async fn persist(&self, snapshot: &TerritorySnapshot, run_generation: u64) -> bool {
        if !self.is_current(run_generation) {
            tracing::warn!(
                service = %self.service_key,
                "run superseded; discarding snapshot write"
            );
            return false;
        }
        if let Err(e) = self.store.put(&self.service_key, snapshot).await {
            tracing::warn!(
                service = %self.service_key,
                error = %e,
                "snapshot write failed; continuing"
            );
        }
        true
    }

    fn publish(&self, snapshot: TerritorySnapshot, run_generation: u64) {
        if self.is_current(run_generation) {
            self.current.send_replace(Some(snapshot));
        }
    }
}
