//! Persisted success statistics for randomized scenarios

mod directory;
mod memory;
mod record;
mod runner;
mod sqlite;
mod traits;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;
pub use record::CalibrationRecord;
pub use runner::{CalibrationReport, Calibrator, DEFAULT_BATCH_SIZE};
pub use sqlite::SqliteStore;
pub use traits::{
    validate_scenario_name, CalibrationError, CalibrationResult, CalibrationStore, OpenStore,
};
