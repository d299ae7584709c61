//! Result types produced by a batch conversion.

use crate::error::{FileError, Pdf2JpgError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of converting one source file.
///
/// Exactly one `FileResult` exists per collected PDF. `index` is the file's
/// submission position, so results can be matched back to their input even
/// though workers complete in any order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// 0-based position in the collected file list.
    pub index: usize,
    /// The source PDF.
    pub source: PathBuf,
    /// Directory the images went to, once resolved.
    pub target_dir: Option<PathBuf>,
    /// Written images in page order. Empty when `error` is set.
    pub images: Vec<PathBuf>,
    /// Why the file failed, if it did.
    pub error: Option<FileError>,
    /// Wall-clock time spent on this file.
    pub duration_ms: u64,
}

impl FileResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The line this result contributes to the error log, if it failed.
    pub fn error_log_line(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|e| format!("error: {}, file: {}", e, self.source.display()))
    }
}

/// Aggregate counters for a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_files: usize,
    pub converted_files: usize,
    pub failed_files: usize,
    /// JPG files written across all successful files.
    pub total_images: usize,
    pub total_duration_ms: u64,
}

/// Everything a batch produced, in submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    pub files: Vec<FileResult>,
    pub stats: BatchStats,
    /// Where the failures were written. `None` when nothing failed, no log
    /// is configured, or the log could not be written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log: Option<PathBuf>,
}

impl BatchOutput {
    /// Build the output from per-file results, sorting them back into
    /// submission order and computing the stats.
    pub fn from_results(mut files: Vec<FileResult>, total_duration_ms: u64) -> Self {
        files.sort_by_key(|f| f.index);

        let converted_files = files.iter().filter(|f| f.is_success()).count();
        let stats = BatchStats {
            total_files: files.len(),
            converted_files,
            failed_files: files.len() - converted_files,
            total_images: files.iter().map(|f| f.images.len()).sum(),
            total_duration_ms,
        };

        Self {
            files,
            stats,
            error_log: None,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileResult> {
        self.files.iter().filter(|f| !f.is_success())
    }

    pub fn successes(&self) -> impl Iterator<Item = &FileResult> {
        self.files.iter().filter(|f| f.is_success())
    }

    pub fn has_failures(&self) -> bool {
        self.stats.failed_files > 0
    }

    /// Error-log lines for every failed file, in submission order.
    pub fn error_log_lines(&self) -> Vec<String> {
        self.files.iter().filter_map(FileResult::error_log_line).collect()
    }

    /// Treat any file failure as an error.
    pub fn into_result(self) -> Result<Self, Pdf2JpgError> {
        if self.has_failures() {
            Err(Pdf2JpgError::PartialFailure {
                success: self.stats.converted_files,
                failed: self.stats.failed_files,
                total: self.stats.total_files,
            })
        } else {
            Ok(self)
        }
    }
}
