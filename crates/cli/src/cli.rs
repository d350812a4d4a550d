//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use fluxlura_core::MediaKind;

#[derive(Parser)]
#[command(name = "fluxlura")]
#[command(version, about = "Convert images, audio and video with ffmpeg", long_about = None)]
pub struct Cli {
    /// Configuration file. Defaults to ./fluxlura.toml when present.
    #[arg(long, global = true, env = "FLUXLURA_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the formats files can be converted to.
    Formats {
        /// Only list one group (image, video, audio).
        #[arg(long)]
        kind: Option<MediaKind>,

        /// Show the engine arguments used for each format.
        #[arg(long)]
        args: bool,
    },

    /// Convert files, one at a time, and save the results.
    Convert {
        /// Files to convert, optionally with a per-file target (`clip.mov:mp4`).
        #[arg(value_name = "FILE[:TARGET]", required = true)]
        inputs: Vec<InputSpec>,

        /// Target format for files without their own.
        #[arg(short = 't', long = "to")]
        to: Option<String>,

        /// Directory to save converted files in.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace existing files instead of picking a new name.
        #[arg(long)]
        overwrite: bool,

        /// Print the final item list as JSON on stdout.
        #[arg(long)]
        json: bool,
    },
}

/// One `FILE[:TARGET]` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub path: PathBuf,
    pub target: Option<String>,
}

impl FromStr for InputSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("empty input".to_string());
        }

        // A suffix that looks like a bare extension is a target, anything else
        // (drive letters, paths with colons) stays part of the path.
        if let Some((path, target)) = s.rsplit_once(':') {
            let is_extension = !target.is_empty()
                && target.chars().all(|c| c.is_ascii_alphanumeric());
            if is_extension && path.len() > 1 {
                return Ok(Self {
                    path: PathBuf::from(path),
                    target: Some(target.to_string()),
                });
            }
        }

        Ok(Self {
            path: PathBuf::from(s),
            target: None,
        })
    }
}
