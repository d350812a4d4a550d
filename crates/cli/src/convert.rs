//! `fluxlura convert`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use fluxlura_core::catalogue;
use fluxlura_core::engine::EngineLoader;
use fluxlura_core::{
    bytes_to_size, compress_file_name, BatchEvent, BatchOrchestrator, Config, ConversionItem,
    FfmpegEngine, FileIcon, FsSaver, UploadedFile,
};

use crate::cli::InputSpec;

const PROGRESS_TEMPLATE: &str = "{spinner} [{bar:30}] {pos}/{len} {wide_msg}";

pub struct ConvertOptions {
    /// Target for inputs that do not name their own.
    pub default_target: Option<String>,
    pub json: bool,
}

pub async fn run(config: Config, inputs: Vec<InputSpec>, options: ConvertOptions) -> Result<()> {
    // Start loading the engine while the inputs are read.
    let loader = Arc::new(EngineLoader::new(FfmpegEngine::load(config.engine.clone())));
    tokio::spawn({
        let loader = Arc::clone(&loader);
        async move {
            if let Err(e) = loader.load().await {
                debug!("Eager engine load failed: {}", e);
            }
        }
    });

    let orchestrator = BatchOrchestrator::new(config.orchestrator.clone(), loader);

    let mut files = Vec::with_capacity(inputs.len());
    let mut targets = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let file = UploadedFile::from_path(&input.path)
            .await
            .with_context(|| format!("Failed to read {:?}", input.path))?;
        // Only accepted files become items, in upload order.
        if catalogue::accepts(&file.media_type, &file.name) {
            let target = input
                .target
                .clone()
                .or_else(|| options.default_target.clone());
            targets.push((file.name.clone(), target));
        }
        files.push(file);
    }

    let outcome = orchestrator.upload(files).await;
    if !outcome.rejected.is_empty() {
        let notification = BatchEvent::UploadRejected {
            file_names: outcome.rejected.clone(),
        }
        .notification();
        if let Some(n) = notification {
            eprintln!("{}: {}", n.title, n.description);
        }
        for name in &outcome.rejected {
            eprintln!("  skipped {}", name);
        }
    }
    if outcome.added.is_empty() {
        bail!("No files to convert");
    }

    for (id, (name, target)) in outcome.added.iter().zip(targets) {
        let Some(target) = target else {
            bail!("No target format for {} (use FILE:TARGET or --to)", name);
        };
        orchestrator
            .select_target(*id, &target)
            .await
            .with_context(|| format!("Cannot convert {} to {}", name, target))?;
    }

    for item in orchestrator.items().await {
        print_item(&item);
    }

    let events = orchestrator.subscribe();
    let bar = progress_bar(outcome.added.len() as u64);
    let progress = tokio::spawn(drive_progress(events, bar.clone()));

    let result = orchestrator.convert().await;
    bar.finish_and_clear();
    progress.abort();
    let report = result.context("Conversion failed")?;

    for item in orchestrator.items().await {
        if let Some(message) = item.error() {
            eprintln!("failed  {}: {}", item.file_name, message);
        }
    }

    let saver = FsSaver::new(config.output.clone());
    let downloads = orchestrator.download_all(&saver).await;
    for saved in &downloads.saved {
        println!("saved   {}", saved.path.display());
    }
    for failure in &downloads.failed {
        eprintln!("unsaved {}: {}", failure.output_name, failure.message);
    }

    if options.json {
        let items = orchestrator.items().await;
        println!(
            "{}",
            serde_json::to_string_pretty(&items).context("Failed to serialize items")?
        );
    }

    println!(
        "{} converted, {} failed, {} saved",
        report.converted,
        report.failed,
        downloads.saved.len()
    );

    if report.failed > 0 || !downloads.failed.is_empty() {
        bail!(
            "{} conversion(s) and {} save(s) failed",
            report.failed,
            downloads.failed.len()
        );
    }
    Ok(())
}

fn print_item(item: &ConversionItem) {
    let icon = FileIcon::for_media_type(&item.media_type);
    let name = compress_file_name(&item.file_name).unwrap_or_else(|_| item.file_name.clone());
    let size = bytes_to_size(item.size_bytes as i64).unwrap_or_default();
    println!(
        "{:<6} {:<18} {:>10}  -> {}",
        icon.glyph(),
        name,
        size,
        item.target.as_deref().unwrap_or("?")
    );
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

async fn drive_progress(
    mut events: tokio::sync::broadcast::Receiver<BatchEvent>,
    bar: ProgressBar,
) {
    loop {
        match events.recv().await {
            Ok(BatchEvent::ItemStarted { file_name, .. }) => {
                bar.set_message(format!("converting {}", file_name));
            }
            Ok(BatchEvent::Progress { completed, .. }) => {
                bar.set_position(completed as u64);
            }
            Ok(event @ BatchEvent::ItemFailed { .. }) => {
                if let Some(n) = event.notification() {
                    bar.println(format!("{}: {}", n.title, n.description));
                }
            }
            Ok(BatchEvent::BatchFinished { .. }) | Err(RecvError::Closed) => break,
            Ok(_) => {}
            Err(RecvError::Lagged(missed)) => {
                warn!("Progress display missed {} event(s)", missed);
            }
        }
    }
}
