//! Mock engine for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::engine::{Engine, EngineError};
use crate::util::remove_file_extension;

/// A recorded engine run for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRun {
    /// The argument list the engine was invoked with.
    pub args: Vec<String>,
    /// Whether the run succeeded.
    pub success: bool,
}

/// Mock implementation of the [`Engine`] trait.
///
/// Keeps the workspace in memory and provides controllable behavior:
/// - Record every run for assertions
/// - Fail runs for particular files, or the next run only
/// - Skip writing the output, or write fixed bytes
/// - Delay runs and report the highest number of overlapping runs
///
/// # Example
///
/// ```rust,ignore
/// use fluxlura_core::testing::MockEngine;
///
/// let engine = MockEngine::new();
/// engine.fail_on("clip.mov", "moov atom not found").await;
///
/// // ... run a batch ...
///
/// let runs = engine.recorded_runs().await;
/// assert!(!runs[0].success);
/// ```
#[derive(Debug, Clone)]
pub struct MockEngine {
    /// In-memory workspace.
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    /// Recorded runs.
    runs: Arc<RwLock<Vec<RecordedRun>>>,
    /// Failure messages keyed by source file stem.
    failures: Arc<RwLock<HashMap<String, String>>>,
    /// If set, the next run fails with this error.
    next_error: Arc<RwLock<Option<EngineError>>>,
    /// Whether runs write an output file.
    produce_output: Arc<RwLock<bool>>,
    /// Fixed output bytes; the staged input is copied when unset.
    output_bytes: Arc<RwLock<Option<Vec<u8>>>>,
    /// Simulated run duration.
    run_duration: Arc<RwLock<Duration>>,
    active_runs: Arc<AtomicUsize>,
    max_active_runs: Arc<AtomicUsize>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Create a new mock engine.
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
            runs: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            produce_output: Arc::new(RwLock::new(true)),
            output_bytes: Arc::new(RwLock::new(None)),
            run_duration: Arc::new(RwLock::new(Duration::ZERO)),
            active_runs: Arc::new(AtomicUsize::new(0)),
            max_active_runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail every run converting `file_name` (matched by stem) with `message`.
    pub async fn fail_on(&self, file_name: &str, message: &str) {
        self.failures.write().await.insert(
            remove_file_extension(file_name).to_string(),
            message.to_string(),
        );
    }

    /// Configure the next run to fail with the given error.
    pub async fn set_next_error(&self, error: EngineError) {
        *self.next_error.write().await = Some(error);
    }

    /// Whether successful runs write the output file.
    pub async fn set_produce_output(&self, produce: bool) {
        *self.produce_output.write().await = produce;
    }

    /// Write these bytes as the output of every successful run.
    pub async fn set_output_bytes(&self, bytes: Vec<u8>) {
        *self.output_bytes.write().await = Some(bytes);
    }

    /// Set the simulated run duration.
    pub async fn set_run_duration(&self, duration: Duration) {
        *self.run_duration.write().await = duration;
    }

    /// Get all recorded runs.
    pub async fn recorded_runs(&self) -> Vec<RecordedRun> {
        self.runs.read().await.clone()
    }

    /// Number of runs performed.
    pub async fn run_count(&self) -> usize {
        self.runs.read().await.len()
    }

    /// Names currently present in the workspace.
    pub async fn workspace_files(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Highest number of runs that were in flight at the same time.
    pub fn max_concurrent_runs(&self) -> usize {
        self.max_active_runs.load(Ordering::SeqCst)
    }

    async fn execute(&self, args: &[String]) -> Result<(), EngineError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let (input, output) = match (args.get(1), args.last()) {
            (Some(input), Some(output)) if args.len() >= 3 => (input, output),
            _ => return Err(EngineError::run_failed("Malformed argument list", None)),
        };

        let duration = *self.run_duration.read().await;
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }

        let stem = remove_file_extension(output);
        if let Some(message) = self.failures.read().await.get(stem) {
            return Err(EngineError::run_failed(message.clone(), None));
        }

        let mut files = self.files.write().await;
        let Some(source) = files.get(input).cloned() else {
            return Err(EngineError::run_failed(
                format!("{}: No such file or directory", input),
                None,
            ));
        };

        if *self.produce_output.read().await {
            let bytes = match self.output_bytes.read().await.as_ref() {
                Some(bytes) => bytes.clone(),
                None => source,
            };
            files.insert(output.clone(), bytes);
        }

        Ok(())
    }
}

#[async_trait]
impl Engine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stage(&self, name: &str, bytes: &[u8]) -> Result<(), EngineError> {
        self.files
            .write()
            .await
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn run(&self, args: &[String]) -> Result<(), EngineError> {
        let active = self.active_runs.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_runs.fetch_max(active, Ordering::SeqCst);

        let result = self.execute(args).await;

        self.active_runs.fetch_sub(1, Ordering::SeqCst);
        self.runs.write().await.push(RecordedRun {
            args: args.to_vec(),
            success: result.is_ok(),
        });
        result
    }

    async fn retrieve(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        self.files
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::OutputMissing {
                name: name.to_string(),
            })
    }

    async fn discard(&self, name: &str) -> Result<(), EngineError> {
        self.files.write().await.remove(name);
        Ok(())
    }
}
