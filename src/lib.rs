// CodeRevise - Priority-ordered revision list for coding-practice questions

pub mod config;
pub mod jsonl;
pub mod record;
pub mod snapshot;
pub mod store;

// Re-export main types for convenience
pub use config::{DATA_FILE_NAME, DEFAULT_ENV_VAR, StoreConfig};
pub use record::Question;
pub use store::{DECAY_FACTOR, ImportSummary, Store, UpsertOutcome};
