pub mod client;
pub mod error;
pub mod types;

pub use client::{OsrmClient, MAX_SOURCES_PER_REQUEST};
pub use error::OsrmError;
pub use types::TableResponse;
