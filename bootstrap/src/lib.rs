pub mod config;
pub mod errors;
pub mod ingest;

pub use config::IngestConfig;
pub use errors::{BootstrapError, BootstrapResult};
pub use ingest::{Ingest, RunningIngest, initialize};
