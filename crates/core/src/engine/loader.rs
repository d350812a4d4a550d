//! One-shot engine loader.

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

use super::error::EngineError;
use super::traits::Engine;

/// Observable state of an [`EngineLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderState {
    /// Initialization has not finished (or not started).
    NotLoaded,
    /// The engine is ready for conversions.
    Ready,
    /// Initialization failed; the reason is kept for the rest of the process.
    Failed(String),
}

type Initialization<E> = Shared<BoxFuture<'static, Result<Arc<E>, String>>>;

/// Produces a single shared engine handle, initializing it at most once.
///
/// The outcome of the first [`load`](Self::load) is cached, including failures:
/// a failed engine is never re-initialized within the process. Every caller
/// polls the same initialization, so a caller that gives up waiting leaves it
/// for the next one to finish.
pub struct EngineLoader<E: Engine> {
    init: Initialization<E>,
}

impl<E: Engine + 'static> EngineLoader<E> {
    /// Creates a loader that runs `init` on first use.
    pub fn new<F>(init: F) -> Self
    where
        F: Future<Output = Result<E, EngineError>> + Send + 'static,
    {
        let init = async move {
            match init.await {
                Ok(engine) => {
                    info!("Engine '{}' ready", engine.name());
                    Ok(Arc::new(engine))
                }
                Err(e) => {
                    error!("Failed to load engine: {}", e);
                    Err(e.to_string())
                }
            }
        };

        Self {
            init: init.boxed().shared(),
        }
    }

    /// Creates a loader around an engine that is already initialized.
    pub fn ready(engine: E) -> Self {
        let init = futures::future::ready(Ok::<_, String>(Arc::new(engine))).boxed().shared();
        // Resolve now so state() and handle() see the engine immediately.
        let _ = init.clone().now_or_never();
        Self { init }
    }

    /// Waits for the engine, driving the initializer if nobody else is.
    pub async fn load(&self) -> Result<Arc<E>, EngineError> {
        self.init.clone().await.map_err(EngineError::init_failed)
    }

    /// Returns the engine if it is ready, without waiting.
    pub fn handle(&self) -> Option<Arc<E>> {
        match self.init.peek() {
            Some(Ok(engine)) => Some(Arc::clone(engine)),
            _ => None,
        }
    }

    /// Current loader state.
    pub fn state(&self) -> LoaderState {
        match self.init.peek() {
            None => LoaderState::NotLoaded,
            Some(Ok(_)) => LoaderState::Ready,
            Some(Err(reason)) => LoaderState::Failed(reason.clone()),
        }
    }
}
