mod cli;
mod convert;
mod formats;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fluxlura_core::{load_config, load_config_from_env, validate_config, Config};

use cli::{Cli, Commands};

/// Config file picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "fluxlura.toml";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Formats { kind, args } => {
            formats::print_formats(kind, args);
            Ok(())
        }
        Commands::Convert {
            inputs,
            to,
            output,
            overwrite,
            json,
        } => {
            let mut config = resolve_config(cli.config.as_deref())?;
            if let Some(dir) = output {
                config.output.dir = dir;
            }
            if overwrite {
                config.output.overwrite = true;
            }

            let options = convert::ConvertOptions {
                default_target: to,
                json,
            };
            convert::run(config, inputs, options).await
        }
    }
}

fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None if fallback.exists() => Some(fallback),
        None => None,
    };

    let config = match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_config_from_env().context("Failed to load config from environment")?,
    };

    validate_config(&config).context("Configuration validation failed")?;
    info!("Engine binary: {:?}", config.engine.ffmpeg_path);
    info!("Output directory: {:?}", config.output.dir);
    Ok(config)
}
