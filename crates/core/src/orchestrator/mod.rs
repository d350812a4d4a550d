//! Batch orchestration.
//!
//! The orchestrator owns the list of uploaded items and drives them through
//! `pending -> ready -> converting -> {converted | errored}`:
//! - **Upload**: accepted files enter `pending`, rejected files raise one notification
//! - **Selection**: assigning a catalogue target moves an item to `ready`
//! - **Conversion**: strictly sequential, in insertion order, one shared engine
//! - **Download**: individual or all converted items through a [`Saver`](crate::download::Saver)
//!
//! Consumers read snapshots and subscribe to [`BatchEvent`]s; items are only
//! mutated through the orchestrator's operations.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::BatchOrchestrator;
pub use types::{
    BatchEvent, BatchReport, ConversionItem, DownloadFailure, DownloadReport, ItemId, ItemStatus,
    Notification, OrchestratorError, UploadOutcome, UploadedFile,
};
