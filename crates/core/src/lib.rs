pub mod catalogue;
pub mod config;
pub mod download;
pub mod engine;
pub mod invoker;
pub mod orchestrator;
pub mod testing;
pub mod util;

pub use catalogue::{FormatSpec, MediaKind};
pub use config::{load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError};
pub use download::{DownloadError, FsSaver, OutputConfig, SavedFile, Saver};
pub use engine::{Engine, EngineConfig, EngineError, EngineLoader, FfmpegEngine, LoaderState};
pub use invoker::{Blob, ConversionRequest, ConvertError, ConvertedFile};
pub use orchestrator::{
    BatchEvent, BatchOrchestrator, BatchReport, ConversionItem, DownloadReport, ItemId, ItemStatus,
    Notification, OrchestratorConfig, OrchestratorError, UploadOutcome, UploadedFile,
};
pub use util::{bytes_to_size, compress_file_name, FileIcon};
