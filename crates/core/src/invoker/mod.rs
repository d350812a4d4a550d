//! Conversion invoker.
//!
//! Runs one item through the engine: stage the source bytes, invoke the engine
//! with `[-i, input, ...catalogue args, output]`, read the output back and wrap
//! it as a [`Blob`]. Staged and produced files are removed from the engine
//! workspace before returning, whatever the outcome.

mod error;
mod types;

pub use error::ConvertError;
pub use types::{Blob, ConversionRequest, ConvertedFile};

use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalogue::{self, UNKNOWN_MEDIA_TYPE};
use crate::engine::Engine;
use crate::util::{file_extension, remove_file_extension};

/// Engine flag introducing the input file.
pub const INPUT_MARKER: &str = "-i";

/// Workspace name for staged input, derived from the source extension.
pub fn staged_input_name(source_extension: &str, job_id: Uuid) -> String {
    if source_extension.is_empty() {
        format!("input-{}", job_id.simple())
    } else {
        format!("input-{}.{}", job_id.simple(), source_extension)
    }
}

/// Output name: the source name with its extension replaced by `target`.
pub fn output_name(file_name: &str, target: &str) -> String {
    format!("{}.{}", remove_file_extension(file_name), target)
}

/// Full engine argument list for one conversion.
pub fn build_args(input_name: &str, output_name: &str, target: &str) -> Vec<String> {
    let mut args = vec![INPUT_MARKER.to_string(), input_name.to_string()];
    args.extend(catalogue::engine_args(target));
    args.push(output_name.to_string());
    args
}

/// Converts one file through the engine.
///
/// The engine error message is carried unchanged in the returned error.
pub async fn convert<E>(
    engine: &E,
    request: ConversionRequest<'_>,
) -> Result<ConvertedFile, ConvertError>
where
    E: Engine + ?Sized,
{
    let start = Instant::now();
    let source_extension = file_extension(request.file_name).to_string();
    let input_name = staged_input_name(&source_extension, Uuid::new_v4());
    let output_name = output_name(request.file_name, request.target);
    let args = build_args(&input_name, &output_name, request.target);

    debug!(
        "Converting {} -> {} via {}",
        request.file_name,
        output_name,
        engine.name()
    );

    let outcome = run_job(engine, &request, &input_name, &output_name, &args).await;

    for name in [&input_name, &output_name] {
        if let Err(e) = engine.discard(name).await {
            warn!("Failed to clean {} from engine workspace: {}", name, e);
        }
    }

    let data = outcome?;
    let blob = Blob::new(blob_media_type(request.media_type), data);
    let duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Converted {} -> {} ({} bytes, {} ms)",
        request.file_name,
        output_name,
        blob.len(),
        duration_ms
    );

    Ok(ConvertedFile {
        output_name,
        blob,
        source_extension,
        target_extension: request.target.to_string(),
        duration_ms,
    })
}

async fn run_job<E>(
    engine: &E,
    request: &ConversionRequest<'_>,
    input_name: &str,
    output_name: &str,
    args: &[String],
) -> Result<Vec<u8>, ConvertError>
where
    E: Engine + ?Sized,
{
    engine.stage(input_name, request.data).await?;
    engine.run(args).await?;
    let data = engine.retrieve(output_name).await?;
    if data.is_empty() {
        return Err(ConvertError::EmptyOutput {
            name: output_name.to_string(),
        });
    }
    Ok(data)
}

/// Blobs are typed with the top-level type of the source (`image/png` -> `image`).
fn blob_media_type(source_media_type: &str) -> &str {
    match source_media_type.split('/').next() {
        Some(top) if !top.trim().is_empty() => top.trim(),
        _ => UNKNOWN_MEDIA_TYPE,
    }
}
