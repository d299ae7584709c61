//! Progress-callback trait for per-file conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the worker pool picks up and finishes each file.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2jpg::{ConversionProgressCallback, ConversionConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     images: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, _index: usize, path: &Path, images: usize) {
//!         self.images.fetch_add(images, Ordering::SeqCst);
//!         eprintln!("{} → {} images", path.display(), images);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { images: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the worker pool as it processes each file.
///
/// Implementations must be `Send + Sync`: `on_file_start`,
/// `on_file_complete` and `on_file_error` are invoked from worker threads,
/// possibly at the same time. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, after collection, before any file is dispatched.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called on the worker thread just before a file is read.
    ///
    /// `index` is the file's 0-based submission position.
    fn on_file_start(&self, index: usize, path: &Path) {
        let _ = (index, path);
    }

    /// Called when every image of a file has been written.
    fn on_file_complete(&self, index: usize, path: &Path, images: usize) {
        let _ = (index, path, images);
    }

    /// Called when a file fails; `error` is the failure description, the
    /// same text that follows `error: ` in the error log.
    fn on_file_error(&self, index: usize, path: &Path, error: &str) {
        let _ = (index, path, error);
    }

    /// Called once after all files have been attempted.
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
