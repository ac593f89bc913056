pub mod app_config;
pub mod config;
pub mod fingerprint;
pub mod geo;
pub mod services;
pub mod types;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use fingerprint::locations_fingerprint;
pub use services::{load_services, ServiceConfig, ServicesFile};
pub use types::{BorderSegment, Bounds, GridCell, LatLng, Location, TerritorySnapshot};
