use std::path::PathBuf;

/// Runtime configuration for the territory engine, sourced from environment
/// variables. See `config::build_app_config` for defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub services_path: PathBuf,
    /// Base URL of the OSRM routing instance.
    pub osrm_base_url: String,
    pub osrm_profile: String,
    pub request_timeout_secs: u64,
    /// Base URL of the key-value cache service holding snapshots.
    pub cache_base_url: String,
    /// Grid resolution per axis; the lattice is `grid_size × grid_size`.
    pub grid_size: usize,
    /// Max source points per distance-matrix request.
    pub batch_size: usize,
    /// Relevance radius: grid points farther than this from every location
    /// are dropped before any routing query.
    pub max_distance_km: f64,
    pub checkpoint_every_batches: usize,
    pub inter_batch_delay_ms: u64,
    /// Cron expression for the forced daily recompute.
    pub recompute_cron: String,
}
