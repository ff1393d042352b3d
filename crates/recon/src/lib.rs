//! `etlcheck-recon` — key-based record reconciliation for ETL verification.
//!
//! The engine (`index`, `engine`, `summary`) is pure: pre-loaded record sets
//! in, classified buckets out. `load` and `output` are the tabular
//! collaborators that read and write CSV files.

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod load;
pub mod model;
pub mod output;
pub mod summary;

pub use config::{ComparedField, OutputConfig, ReconConfig};
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use index::{DestinationIndex, MatchPolicy};
pub use model::{Buckets, Record, RecordSet, ReconResult};
