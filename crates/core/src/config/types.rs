use serde::{Deserialize, Serialize};

pub use crate::download::OutputConfig;
pub use crate::engine::EngineConfig;
pub use crate::orchestrator::OrchestratorConfig;

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}
