//! # edgequake-pdf2jpg
//!
//! Rasterise every PDF under a directory tree to JPG images, in parallel.
//!
//! Each page becomes one JPG. Output either mirrors the input hierarchy or is
//! flattened into a single directory, with content-hash (or random-suffix)
//! names so files that share a name never overwrite each other. One broken
//! PDF never stops the batch: it is listed in `errors.log` and every other
//! file is still converted.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input dir
//!  │
//!  ├─ 1. Collect  walk the tree, keep *.pdf (case-insensitive)
//!  ├─ 2. Dispatch bounded worker pool, one file per task (spawn_blocking)
//!  │     ├─ resolve output dir + base name
//!  │     ├─ rasterise pages via pdfium
//!  │     └─ encode JPEGs, publish the whole set atomically
//!  └─ 3. Report   errors.log + summary, results in submission order
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2jpg::{bind_pdfium, convert_dir, ConversionConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rasterizer = Arc::new(bind_pdfium()?);
//!     let config = ConversionConfig::builder()
//!         .output_dir("out")
//!         .flatten(true)
//!         .build()?;
//!     let output = convert_dir("docs", &config, rasterizer).await?;
//!     eprintln!("{}/{} files, {} images",
//!         output.stats.converted_files,
//!         output.stats.total_files,
//!         output.stats.total_images);
//!     Ok(())
//! }
//! ```
//!
//! ## PDFium
//!
//! The pdfium shared library is not downloaded or bundled. Point
//! `PDFIUM_LIB_PATH` at an existing `libpdfium`, place it next to the
//! executable or in the working directory, or install it system-wide
//! (see [`engine`] for the search order).
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2jpg` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, NamingScheme};
pub use convert::{convert_dir, convert_dir_sync, convert_files, ConversionTask};
pub use engine::{bind_pdfium, bind_pdfium_from_path};
pub use error::{FileError, Pdf2JpgError};
pub use output::{BatchOutput, BatchStats, FileResult};
pub use pipeline::collect::collect_pdfs;
pub use pipeline::render::{PdfiumRasterizer, RasterDocument, Rasterizer};
pub use pipeline::target::{resolve_target, OutputTarget};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
