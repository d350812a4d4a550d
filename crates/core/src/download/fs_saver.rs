//! File system saver implementation.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::config::OutputConfig;
use super::error::DownloadError;
use super::traits::{SavedFile, Saver};
use crate::invoker::ConvertedFile;
use crate::util::{file_extension, remove_file_extension};

/// Upper bound on `name (n).ext` attempts before giving up.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Saves converted files into a directory.
pub struct FsSaver {
    config: OutputConfig,
}

impl FsSaver {
    /// Creates a new saver with the given configuration.
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// `photo.jpg` -> `photo (n).jpg`.
    fn numbered_name(output_name: &str, n: u32) -> String {
        let extension = file_extension(output_name);
        if extension.is_empty() {
            format!("{} ({})", output_name, n)
        } else {
            format!("{} ({}).{}", remove_file_extension(output_name), n, extension)
        }
    }

    fn validate_name(name: &str) -> Result<(), DownloadError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => Err(DownloadError::InvalidName {
                name: name.to_string(),
            }),
        }
    }

    /// Writes to the first free name, never replacing an existing file.
    async fn write_new(&self, output_name: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                output_name.to_string()
            } else {
                Self::numbered_name(output_name, attempt)
            };
            let path = self.config.dir.join(&name);

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!("{:?} exists, trying another name", path);
                    continue;
                }
                Err(source) => return Err(DownloadError::WriteFailed { path, source }),
            };

            file.write_all(bytes)
                .await
                .map_err(|source| DownloadError::WriteFailed {
                    path: path.clone(),
                    source,
                })?;
            file.flush().await?;
            return Ok(path);
        }

        Err(DownloadError::InvalidName {
            name: output_name.to_string(),
        })
    }
}

#[async_trait]
impl Saver for FsSaver {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn save(&self, file: &ConvertedFile) -> Result<SavedFile, DownloadError> {
        Self::validate_name(&file.output_name)?;

        fs::create_dir_all(&self.config.dir)
            .await
            .map_err(|_| DownloadError::OutputDirectoryFailed {
                path: self.config.dir.clone(),
            })?;

        let bytes = file.blob.bytes();
        let path = if self.config.overwrite {
            let path = self.config.dir.join(&file.output_name);
            fs::write(&path, bytes)
                .await
                .map_err(|source| DownloadError::WriteFailed {
                    path: path.clone(),
                    source,
                })?;
            path
        } else {
            self.write_new(&file.output_name, bytes).await?
        };

        info!("Saved {} to {:?}", file.output_name, path);

        Ok(SavedFile {
            output_name: file.output_name.clone(),
            path,
            size_bytes: bytes.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::Blob;
    use tempfile::TempDir;

    fn converted(name: &str, bytes: &[u8]) -> ConvertedFile {
        ConvertedFile {
            output_name: name.to_string(),
            blob: Blob::new("image", bytes.to_vec()),
            source_extension: "png".to_string(),
            target_extension: "jpg".to_string(),
            duration_ms: 5,
        }
    }

    fn saver_in(dir: &Path, overwrite: bool) -> FsSaver {
        FsSaver::new(OutputConfig {
            dir: dir.to_path_buf(),
            overwrite,
        })
    }

    #[test]
    fn test_numbered_name() {
        assert_eq!(FsSaver::numbered_name("photo.jpg", 1), "photo (1).jpg");
        assert_eq!(FsSaver::numbered_name("a.b.mp3", 2), "a.b (2).mp3");
        assert_eq!(FsSaver::numbered_name("noext", 3), "noext (3)");
    }

    #[tokio::test]
    async fn test_save_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested/out");
        let saver = saver_in(&dir, false);

        let saved = saver.save(&converted("photo.jpg", b"jpeg")).await.unwrap();
        assert_eq!(saved.path, dir.join("photo.jpg"));
        assert_eq!(saved.size_bytes, 4);
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn test_save_picks_free_name() {
        let temp = TempDir::new().unwrap();
        let saver = saver_in(temp.path(), false);

        let first = saver.save(&converted("photo.jpg", b"one")).await.unwrap();
        let second = saver.save(&converted("photo.jpg", b"two")).await.unwrap();
        let third = saver.save(&converted("photo.jpg", b"three")).await.unwrap();

        assert_eq!(first.path, temp.path().join("photo.jpg"));
        assert_eq!(second.path, temp.path().join("photo (1).jpg"));
        assert_eq!(third.path, temp.path().join("photo (2).jpg"));
        assert_eq!(std::fs::read(&first.path).unwrap(), b"one");
    }

    #[tokio::test]
    async fn test_save_overwrite() {
        let temp = TempDir::new().unwrap();
        let saver = saver_in(temp.path(), true);

        saver.save(&converted("photo.jpg", b"one")).await.unwrap();
        let saved = saver.save(&converted("photo.jpg", b"two")).await.unwrap();

        assert_eq!(saved.path, temp.path().join("photo.jpg"));
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_save_rejects_path_names() {
        let temp = TempDir::new().unwrap();
        let saver = saver_in(temp.path(), false);

        let result = saver.save(&converted("../escape.jpg", b"x")).await;
        assert!(matches!(result, Err(DownloadError::InvalidName { .. })));
    }
}
