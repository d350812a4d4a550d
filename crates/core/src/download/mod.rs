//! Saving converted files.
//!
//! The [`Saver`] trait is the download surface: individual saves and
//! download-all both go through it. [`FsSaver`] writes into a directory and,
//! like a browser download manager, never clobbers an existing file unless
//! configured to.

mod config;
mod error;
mod fs_saver;
mod traits;

pub use config::OutputConfig;
pub use error::DownloadError;
pub use fs_saver::FsSaver;
pub use traits::{SavedFile, Saver};
