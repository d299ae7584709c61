//! Error aggregation: the error-log file and the end-of-run summary.
//!
//! The log is removed when a run starts, so a clean run never leaves a stale
//! log from an earlier, failing one behind. It is written once, after every
//! worker has finished, with one line per failed file:
//!
//! ```text
//! error: cannot open document: FormatError, file: docs/broken.pdf
//! ```

use crate::error::Pdf2JpgError;
use crate::output::BatchOutput;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Delete the error log left by a previous run. A missing file is fine.
pub fn reset_error_log(path: &Path) -> Result<(), Pdf2JpgError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Pdf2JpgError::ErrorLogWriteFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Write `lines` to `path`, replacing any existing content.
pub fn write_error_log(path: &Path, lines: &[String]) -> Result<(), Pdf2JpgError> {
    let to_err = |source| Pdf2JpgError::ErrorLogWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(path).map_err(to_err)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{line}").map_err(to_err)?;
    }
    writer.flush().map_err(to_err)
}

/// Log the summary, then persist failures when an error log is configured.
///
/// Returns the path of the log when one was written. The summary is logged
/// even if writing the log fails.
pub fn report(
    output: &BatchOutput,
    error_log: Option<&Path>,
) -> Result<Option<PathBuf>, Pdf2JpgError> {
    let stats = &output.stats;

    if !output.has_failures() {
        info!(
            "Converted {}/{} files ({} images) in {}ms",
            stats.converted_files, stats.total_files, stats.total_images, stats.total_duration_ms
        );
        return Ok(None);
    }

    let lines = output.error_log_lines();
    warn!("{}", lines.join("\n"));
    warn!("{}/{} files failed", stats.failed_files, stats.total_files);

    match error_log {
        Some(path) => {
            write_error_log(path, &lines)?;
            info!("Failures listed in {}", path.display());
            Ok(Some(path.to_path_buf()))
        }
        None => Ok(None),
    }
}
