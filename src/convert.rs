//! Batch conversion entry points and the worker pool.
//!
//! ## Pool model
//!
//! Each file becomes one [`ConversionTask`] executed on Tokio's blocking
//! thread pool (`spawn_blocking`): reading, hashing, rasterising and JPEG
//! encoding are all blocking work. `buffer_unordered(config.workers)` caps
//! how many tasks are in flight, which is the effective pool size.
//!
//! Tasks share nothing mutable. The config and the rasteriser are behind
//! `Arc`s, every task writes its own output files, and the only contended
//! operation is directory creation, which is idempotent. A task that
//! panics surfaces as a `JoinError` and is turned into a failed
//! [`FileResult`] for that file alone.

use crate::config::ConversionConfig;
use crate::error::{FileError, Pdf2JpgError};
use crate::output::{BatchOutput, FileResult};
use crate::pipeline::collect;
use crate::pipeline::render::{self, Rasterizer};
use crate::pipeline::target::{find_name_collisions, resolve_target, OutputTarget};
use crate::report;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert every PDF under `input_root` to JPG images.
///
/// This is the primary entry point for the library. It removes the previous
/// error log, collects the input files, runs the pool, then writes the
/// new error log if anything failed. A log that cannot be written is only
/// a warning; `output.error_log` then stays `None`.
///
/// # Returns
/// `Ok(BatchOutput)` once every file has been attempted, even if some
/// failed (check `output.stats.failed_files`, or call
/// [`BatchOutput::into_result`]).
///
/// # Errors
/// Returns `Err(Pdf2JpgError)` only for fatal errors:
/// - no PDF files under `input_root`
/// - the previous error log cannot be removed
pub async fn convert_dir(
    input_root: impl AsRef<Path>,
    config: &ConversionConfig,
    rasterizer: Arc<dyn Rasterizer>,
) -> Result<BatchOutput, Pdf2JpgError> {
    let input_root = input_root.as_ref();
    info!("Starting batch conversion: {}", input_root.display());

    if let Some(ref log) = config.error_log {
        report::reset_error_log(log)?;
    }

    let files = collect::collect_pdfs(input_root)?;
    let mut output = convert_files(files, input_root, config, rasterizer).await;

    match report::report(&output, config.error_log.as_deref()) {
        Ok(written) => output.error_log = written,
        Err(e) => warn!("{}", e),
    }
    Ok(output)
}

/// Synchronous wrapper around [`convert_dir`].
///
/// Creates a Tokio runtime internally.
pub fn convert_dir_sync(
    input_root: impl AsRef<Path>,
    config: &ConversionConfig,
    rasterizer: Arc<dyn Rasterizer>,
) -> Result<BatchOutput, Pdf2JpgError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2JpgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_dir(input_root, config, rasterizer))
}

/// Run the worker pool over an already-collected file list.
///
/// Every path in `files` yields exactly one [`FileResult`]; results come
/// back in submission order. Does not touch the error log.
pub async fn convert_files(
    files: Vec<PathBuf>,
    input_root: &Path,
    config: &ConversionConfig,
    rasterizer: Arc<dyn Rasterizer>,
) -> BatchOutput {
    let start = Instant::now();
    let total_files = files.len();
    debug!(
        "Dispatching {} files to {} workers",
        total_files, config.workers
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total_files);
    }

    let collisions = find_name_collisions(
        &files,
        input_root,
        config.output_dir.as_deref(),
        config.flatten,
        config.naming,
    );
    let shared_config = Arc::new(config.clone());
    let input_root: Arc<Path> = Arc::from(input_root);

    let tasks = files
        .into_iter()
        .zip(collisions)
        .enumerate()
        .map(|(index, (source, collides_with))| {
            let task = ConversionTask {
                index,
                source,
                input_root: Arc::clone(&input_root),
                config: Arc::clone(&shared_config),
                collides_with,
            };
            let rasterizer = Arc::clone(&rasterizer);
            async move { run_task(task, rasterizer).await }
        });

    let results: Vec<FileResult> = stream::iter(tasks)
        .buffer_unordered(config.workers.max(1))
        .collect()
        .await;

    let output = BatchOutput::from_results(results, start.elapsed().as_millis() as u64);

    info!(
        "Batch complete: {}/{} files, {} images, {}ms",
        output.stats.converted_files,
        output.stats.total_files,
        output.stats.total_images,
        output.stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total_files, output.stats.converted_files);
    }

    output
}

/// One source file paired with the run's configuration.
#[derive(Debug, Clone)]
pub struct ConversionTask {
    /// 0-based submission position.
    pub index: usize,
    pub source: PathBuf,
    pub input_root: Arc<Path>,
    pub config: Arc<ConversionConfig>,
    /// Earlier file in the batch that claims the same output names.
    pub collides_with: Option<PathBuf>,
}

impl ConversionTask {
    /// Convert the file: read → resolve target → open → create dir → render.
    ///
    /// A task with `collides_with` set fails before touching the file.
    ///
    /// Never fails; errors are recorded in the returned [`FileResult`].
    pub fn run(&self, rasterizer: &dyn Rasterizer) -> FileResult {
        let start = Instant::now();
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_file_start(self.index, &self.source);
        }
        debug!("Converting {}", self.source.display());

        let resolved = match self.collides_with {
            Some(ref other) => Err(FileError::NameCollision {
                other: other.clone(),
            }),
            None => self.read_and_resolve(),
        };

        let (target_dir, outcome) = match resolved {
            Ok((bytes, target)) => {
                let outcome = self.render(rasterizer, &bytes, &target);
                (Some(target.dir), outcome)
            }
            Err(e) => (None, Err(e)),
        };

        let (images, error) = match outcome {
            Ok(images) => (images, None),
            Err(e) => (Vec::new(), Some(e)),
        };

        FileResult {
            index: self.index,
            source: self.source.clone(),
            target_dir,
            images,
            error,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn read_and_resolve(&self) -> Result<(Vec<u8>, OutputTarget), FileError> {
        let bytes = std::fs::read(&self.source).map_err(|e| FileError::Read {
            detail: e.to_string(),
        })?;

        let target = resolve_target(
            &self.source,
            &self.input_root,
            self.config.output_dir.as_deref(),
            self.config.flatten,
            self.config.naming,
            &bytes,
        );
        Ok((bytes, target))
    }

    fn render(
        &self,
        rasterizer: &dyn Rasterizer,
        bytes: &[u8],
        target: &OutputTarget,
    ) -> Result<Vec<PathBuf>, FileError> {
        let document = rasterizer.open(bytes)?;
        target.ensure_dir()?;
        render::render_document(
            document.as_ref(),
            target,
            self.config.quality,
            self.config.jpeg_quality,
        )
    }
}

/// Execute `task` on the blocking pool and report its outcome.
async fn run_task(task: ConversionTask, rasterizer: Arc<dyn Rasterizer>) -> FileResult {
    let index = task.index;
    let source = task.source.clone();
    let config = Arc::clone(&task.config);

    let result = tokio::task::spawn_blocking(move || task.run(rasterizer.as_ref()))
        .await
        .unwrap_or_else(|e| FileResult {
            index,
            source: source.clone(),
            target_dir: None,
            images: Vec::new(),
            error: Some(FileError::TaskPanicked {
                detail: e.to_string(),
            }),
            duration_ms: 0,
        });

    match result.error {
        None => {
            debug!(
                "Converted {} → {} images",
                source.display(),
                result.images.len()
            );
            if let Some(ref cb) = config.progress_callback {
                cb.on_file_complete(index, &source, result.images.len());
            }
        }
        Some(ref e) => {
            warn!("Failed {}: {}", source.display(), e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_file_error(index, &source, &e.to_string());
            }
        }
    }

    result
}
