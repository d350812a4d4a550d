//! Error types for the conversion invoker.

use thiserror::Error;

use crate::engine::EngineError;

/// A single conversion failed. Local to one item.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The engine rejected the job or could not be reached.
    #[error("{}", .0.detailed_message())]
    Engine(#[from] EngineError),

    /// The engine reported success but wrote nothing.
    #[error("Engine produced an empty file: {name}")]
    EmptyOutput { name: String },
}
