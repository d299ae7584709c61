//! Input discovery: every `.pdf` file under the input root.
//!
//! The walk follows the directory tree as-is (no symlink following) and
//! matches the extension case-insensitively, so `scan.PDF` is picked up too.
//! Entries the walker cannot read are skipped rather than failing the run;
//! one unreadable subdirectory should not hide the rest of the tree.

use crate::error::Pdf2JpgError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Recursively collect all PDF files under `input_root`.
///
/// The list is sorted so the submission order (and therefore the order of
/// results and of the error log) is stable across runs.
///
/// # Errors
/// [`Pdf2JpgError::NoInputFiles`] when nothing matched, which also covers a
/// root that does not exist.
pub fn collect_pdfs(input_root: &Path) -> Result<Vec<PathBuf>, Pdf2JpgError> {
    // min_depth(1): a root that is itself a file yields nothing.
    let mut pdfs: Vec<PathBuf> = WalkDir::new(input_root)
        .min_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && is_pdf(e.path()))
        .map(|e| e.into_path())
        .collect();

    if pdfs.is_empty() {
        return Err(Pdf2JpgError::NoInputFiles {
            root: input_root.to_path_buf(),
        });
    }

    pdfs.sort();
    info!("Found {} PDF files under {}", pdfs.len(), input_root.display());
    Ok(pdfs)
}

/// `true` when the path's extension is `pdf`, ignoring case.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
