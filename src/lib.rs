pub mod aggregate;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod process;
pub mod report;
pub mod schema;
pub mod snapshot;

pub use error::PipelineError;
pub use snapshot::{Snapshot, SnapshotStore};
