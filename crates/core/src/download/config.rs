//! Configuration for saving converted files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the file system saver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory converted files are written to.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Replace existing files instead of picking a free `name (n).ext`.
    #[serde(default)]
    pub overwrite: bool,
}

fn default_dir() -> PathBuf {
    PathBuf::from("converted")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            overwrite: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OutputConfig::default();
        assert_eq!(config.dir, PathBuf::from("converted"));
        assert!(!config.overwrite);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            dir = "/srv/out"
            overwrite = true
        "#;
        let config: OutputConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.dir, PathBuf::from("/srv/out"));
        assert!(config.overwrite);
    }
}
