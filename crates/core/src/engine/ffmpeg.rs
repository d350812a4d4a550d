//! FFmpeg-backed engine implementation.

use async_trait::async_trait;
use regex_lite::Regex;
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

use super::config::EngineConfig;
use super::error::EngineError;
use super::traits::Engine;

/// Lines of ffmpeg stderr kept in a run failure.
const STDERR_TAIL_LINES: usize = 20;

/// Engine that runs a native ffmpeg binary against a private workspace directory.
pub struct FfmpegEngine {
    config: EngineConfig,
    binary: PathBuf,
    version: String,
    workspace: PathBuf,
    // Held so the temporary workspace lives as long as the engine.
    _temp_dir: Option<TempDir>,
}

impl FfmpegEngine {
    /// Locates and validates ffmpeg, then prepares the workspace.
    pub async fn load(config: EngineConfig) -> Result<Self, EngineError> {
        let binary = which::which(&config.ffmpeg_path).map_err(|_| EngineError::NotFound {
            path: config.ffmpeg_path.clone(),
        })?;

        let output = Command::new(&binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                EngineError::init_failed(format!("failed to execute {}: {}", binary.display(), e))
            })?;

        if !output.status.success() {
            return Err(EngineError::init_failed(format!(
                "{} -version exited with code: {:?}",
                binary.display(),
                output.status.code()
            )));
        }

        let version = Self::parse_version(&String::from_utf8_lossy(&output.stdout))
            .unwrap_or_else(|| "unknown".to_string());

        let (workspace, temp_dir) = match &config.workspace_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await.map_err(|e| {
                    EngineError::init_failed(format!(
                        "failed to create workspace {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
                (dir.clone(), None)
            }
            None => {
                let temp_dir = tempfile::Builder::new()
                    .prefix("fluxlura-engine-")
                    .tempdir()
                    .map_err(|e| {
                        EngineError::init_failed(format!("failed to create workspace: {}", e))
                    })?;
                (temp_dir.path().to_path_buf(), Some(temp_dir))
            }
        };

        info!(
            "Loaded ffmpeg {} from {:?} (workspace: {:?})",
            version, binary, workspace
        );

        Ok(Self {
            config,
            binary,
            version,
            workspace,
            _temp_dir: temp_dir,
        })
    }

    /// Version string reported by `ffmpeg -version`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Directory the engine reads inputs from and writes outputs to.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    fn parse_version(output: &str) -> Option<String> {
        let re = Regex::new(r"ffmpeg version (\S+)").ok()?;
        re.captures(output)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Resolves a workspace file name, refusing anything that is not a plain name.
    /// Names starting with `-` are refused too, since ffmpeg would read them as options.
    fn workspace_path(&self, name: &str) -> Result<PathBuf, EngineError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !name.starts_with('-') => {
                Ok(self.workspace.join(name))
            }
            _ => Err(EngineError::InvalidName {
                name: name.to_string(),
            }),
        }
    }

    /// Global flags followed by the caller's argument list, untouched.
    fn build_args(&self, args: &[String]) -> Vec<String> {
        let mut full = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-y".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
        ];
        full.extend(args.iter().cloned());
        full
    }

    fn stderr_tail(stderr: &[u8]) -> Option<String> {
        let text = String::from_utf8_lossy(stderr);
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            return None;
        }
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        Some(lines[start..].join("\n"))
    }
}

#[async_trait]
impl Engine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn stage(&self, name: &str, bytes: &[u8]) -> Result<(), EngineError> {
        let path = self.workspace_path(name)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| EngineError::StageFailed {
                name: name.to_string(),
                source,
            })?;
        debug!("Staged {} ({} bytes)", name, bytes.len());
        Ok(())
    }

    async fn run(&self, args: &[String]) -> Result<(), EngineError> {
        // The last argument is the output file.
        if let Some(output) = args.last() {
            self.workspace_path(output)?;
        }

        let full_args = self.build_args(args);
        debug!("Running ffmpeg {}", full_args.join(" "));

        let output = Command::new(&self.binary)
            .current_dir(&self.workspace)
            .args(&full_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EngineError::NotFound {
                        path: self.binary.clone(),
                    }
                } else {
                    EngineError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(EngineError::run_failed(
                format!("FFmpeg exited with code: {:?}", output.status.code()),
                Self::stderr_tail(&output.stderr),
            ));
        }

        Ok(())
    }

    async fn retrieve(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        let path = self.workspace_path(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(EngineError::OutputMissing {
                name: name.to_string(),
            }),
            Err(e) => Err(EngineError::Io(e)),
        }
    }

    async fn discard(&self, name: &str) -> Result<(), EngineError> {
        let path = self.workspace_path(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EngineError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_in(dir: &Path) -> FfmpegEngine {
        FfmpegEngine {
            config: EngineConfig::default(),
            binary: PathBuf::from("ffmpeg"),
            version: "test".to_string(),
            workspace: dir.to_path_buf(),
            _temp_dir: None,
        }
    }

    #[test]
    fn test_parse_version() {
        let output = "ffmpeg version 6.1.1-3ubuntu5 Copyright (c) 2000-2023 the FFmpeg developers\nbuilt with gcc 13";
        assert_eq!(
            FfmpegEngine::parse_version(output),
            Some("6.1.1-3ubuntu5".to_string())
        );
        assert_eq!(FfmpegEngine::parse_version("not ffmpeg"), None);
    }

    #[test]
    fn test_workspace_path_rejects_non_plain_names() {
        let engine = engine_in(Path::new("/tmp/ws"));
        assert_eq!(
            engine.workspace_path("input.png").unwrap(),
            PathBuf::from("/tmp/ws/input.png")
        );
        for bad in ["", "..", ".", "../escape.png", "nested/file.png", "/etc/passwd", "-y.jpg"] {
            assert!(
                matches!(
                    engine.workspace_path(bad),
                    Err(EngineError::InvalidName { .. })
                ),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_build_args_keeps_caller_args_verbatim() {
        let engine = engine_in(Path::new("/tmp/ws"));
        let args: Vec<String> = ["-i", "input.png", "-q:v", "2", "photo.jpg"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let full = engine.build_args(&args);
        assert_eq!(&full[..5], &["-hide_banner", "-nostdin", "-y", "-loglevel", "error"]);
        assert_eq!(&full[5..], args.as_slice());
    }

    #[test]
    fn test_stderr_tail() {
        assert_eq!(FfmpegEngine::stderr_tail(b""), None);
        assert_eq!(FfmpegEngine::stderr_tail(b"\n  \n"), None);

        let long: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let tail = FfmpegEngine::stderr_tail(long.as_bytes()).unwrap();
        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
        assert!(tail.ends_with("line 29"));
    }

    #[tokio::test]
    async fn test_workspace_file_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(dir.path());

        engine.stage("input.wav", b"RIFF....WAVE").await.unwrap();
        assert!(dir.path().join("input.wav").exists());
        assert_eq!(engine.retrieve("input.wav").await.unwrap(), b"RIFF....WAVE");

        engine.discard("input.wav").await.unwrap();
        assert!(!dir.path().join("input.wav").exists());
        // Discarding twice is fine
        engine.discard("input.wav").await.unwrap();
    }

    #[tokio::test]
    async fn test_retrieve_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(dir.path());

        let err = engine.retrieve("never.mp3").await.unwrap_err();
        assert!(matches!(err, EngineError::OutputMissing { name } if name == "never.mp3"));
    }

    #[tokio::test]
    async fn test_run_refuses_output_that_looks_like_an_option() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(dir.path());
        let args: Vec<String> = ["-i", "input.png", "-y.jpg"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let err = engine.run(&args).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidName { name } if name == "-y.jpg"));
    }

    #[tokio::test]
    async fn test_load_with_missing_binary() {
        let config = EngineConfig::with_path(PathBuf::from("/nonexistent/bin/ffmpeg-xyz"));
        let result = FfmpegEngine::load(config).await;
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }
}
