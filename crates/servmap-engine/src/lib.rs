//! Territory partitioning and caching engine.
//!
//! Assigns every relevant grid point of a service region to the location
//! that reaches it fastest by road, checkpointing progress through a
//! key-value snapshot store so an interrupted run resumes instead of
//! starting over.

pub mod border;
pub mod computer;
pub mod engine;
pub mod grid;
pub mod provider;
pub mod scheduler;
pub mod store;

pub use border::extract_borders;
pub use computer::{ComputeConfig, ComputeOutcome, RefreshMode, SkipReason, TerritoryComputer};
pub use engine::Engine;
pub use grid::{generate_grid, quantize, GridSpec, TargetGrid};
pub use provider::{assign_batch, RoutingError, RoutingProvider};
pub use scheduler::build_scheduler;
pub use store::{HttpSnapshotStore, MemorySnapshotStore, SnapshotStore, StoreError};
