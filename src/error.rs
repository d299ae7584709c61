//! Error types for the edgequake-pdf2jpg library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2JpgError`]: **Fatal**: the batch cannot proceed at all (no PDFs
//!   under the input root, invalid configuration, pdfium not available).
//!   Returned as `Err(Pdf2JpgError)` from the top-level `convert*` functions.
//!
//! * [`FileError`]: **Non-fatal**: a single file failed (corrupt PDF,
//!   unwritable output directory) but every other file is unaffected. Stored
//!   inside [`crate::output::FileResult`] so the batch report lists it and
//!   the error log gets one line for it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdf2jpg library.
///
/// File-level failures use [`FileError`] and are stored in
/// [`crate::output::FileResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Pdf2JpgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input root contains no `.pdf` files (or does not exist).
    #[error("No PDF files found under '{root}'\nCheck the input directory path.")]
    NoInputFiles { root: PathBuf },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
pdf2jpg does not download or bundle pdfium; a copy must be installed.\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the pdf2jpg executable.\n\
  • Install pdfium system-wide (prebuilt binaries: https://github.com/bblanchon/pdfium-binaries).\n"
    )]
    PdfiumBindingFailed(String),

    // ── Report errors ─────────────────────────────────────────────────────
    /// Could not remove or write the error log.
    #[error("Failed to write error log '{path}': {source}")]
    ErrorLogWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Some files converted but at least one failed.
    ///
    /// Returned by [`crate::output::BatchOutput::into_result`] when the
    /// caller wants to treat any file failure as an error.
    #[error("{failed}/{total} files failed during conversion")]
    PartialFailure {
        success: usize,
        failed: usize,
        total: usize,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single source file.
///
/// The `Display` text is what ends up in the error log, so every variant
/// reads as a self-contained sentence fragment.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileError {
    /// The source file could not be read.
    #[error("cannot read file: {detail}")]
    Read { detail: String },

    /// The target directory could not be created.
    #[error("cannot create output directory '{}': {detail}", path.display())]
    OutputDir { path: PathBuf, detail: String },

    /// pdfium rejected the document (corrupt, truncated, not a PDF).
    #[error("cannot open document: {detail}")]
    Open { detail: String },

    /// The document is encrypted and needs a password.
    #[error("document is password-protected")]
    PasswordProtected,

    /// The document opened but has no pages.
    #[error("document has no pages")]
    EmptyDocument,

    /// Rasterisation of one page failed.
    #[error("page {page}: rasterisation failed: {detail}")]
    Render { page: usize, detail: String },

    /// JPEG encoding of one page failed.
    #[error("page {page}: JPEG encoding failed: {detail}")]
    Encode { page: usize, detail: String },

    /// Writing or moving an output image failed.
    #[error("cannot write '{}': {detail}", path.display())]
    Write { path: PathBuf, detail: String },

    /// Another source in the batch resolves to the same output names.
    #[error("output name collides with '{}'", other.display())]
    NameCollision { other: PathBuf },

    /// The worker running this file panicked.
    #[error("worker panicked: {detail}")]
    TaskPanicked { detail: String },
}
