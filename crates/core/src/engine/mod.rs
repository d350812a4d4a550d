//! Transcoding engine access.
//!
//! The engine is an opaque collaborator consumed through three operations:
//! `stage` bytes into its workspace, `run` it with an argument list, and
//! `retrieve` the produced bytes. [`FfmpegEngine`] drives a native ffmpeg binary;
//! [`EngineLoader`] hands out one shared instance per process.
//!
//! # Example
//!
//! ```ignore
//! use fluxlura_core::engine::{EngineConfig, EngineLoader, FfmpegEngine};
//!
//! let loader = EngineLoader::new(FfmpegEngine::load(EngineConfig::default()));
//! let engine = loader.load().await?;
//! engine.stage("input.wav", &bytes).await?;
//! engine.run(&args).await?;
//! let mp3 = engine.retrieve("song.mp3").await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod loader;
mod traits;

pub use config::EngineConfig;
pub use error::EngineError;
pub use ffmpeg::FfmpegEngine;
pub use loader::{EngineLoader, LoaderState};
pub use traits::Engine;
