//! Trait definitions for the engine module.

use async_trait::async_trait;

use super::error::EngineError;

/// A black-box transcoding engine with a private file workspace.
///
/// The workspace is shared and not reentrant: callers must not run two jobs
/// against the same engine at once.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Writes `bytes` into the workspace under `name`.
    async fn stage(&self, name: &str, bytes: &[u8]) -> Result<(), EngineError>;

    /// Runs the engine with a command-line style argument list.
    async fn run(&self, args: &[String]) -> Result<(), EngineError>;

    /// Reads `name` back from the workspace.
    async fn retrieve(&self, name: &str) -> Result<Vec<u8>, EngineError>;

    /// Removes `name` from the workspace. Missing files are not an error.
    async fn discard(&self, name: &str) -> Result<(), EngineError>;
}
