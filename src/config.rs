//! Configuration types for batch PDF-to-JPG conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The config is constructed once, then
//! shared read-only (behind an `Arc`) with every worker; nothing in the
//! pipeline reads ambient process state such as CLI arguments.

use crate::error::Pdf2JpgError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Scale applied to single-page documents, which are rendered at the
/// engine's native resolution (1 PDF point → 1 pixel).
pub const DEFAULT_SCALE: f32 = 1.0;

/// Upper bound for [`ConversionConfig::quality`]. A scale of 10 already
/// turns an A4 page into a ~6000 × 8400 px bitmap.
pub const MAX_QUALITY: f32 = 10.0;

/// Default error-log file name, relative to the working directory.
pub const DEFAULT_ERROR_LOG: &str = "errors.log";

/// Configuration for a batch conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2jpg::{ConversionConfig, NamingScheme};
///
/// let config = ConversionConfig::builder()
///     .output_dir("out")
///     .flatten(true)
///     .quality(2.5)
///     .workers(4)
///     .naming(NamingScheme::ContentHash)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Root directory for converted images.
    ///
    /// `None` writes images next to each source file (mirrored mode) or into
    /// the input root itself (flattened mode).
    pub output_dir: Option<PathBuf>,

    /// Write every image into one directory instead of mirroring the input
    /// hierarchy. Default: false.
    pub flatten: bool,

    /// Rasterisation scale applied to both axes of multi-page documents.
    /// Range: (0, 10]. Default: 2.0.
    ///
    /// 1.0 renders at 72 DPI, 2.0 at 144 DPI. Single-page documents are
    /// always rendered at [`DEFAULT_SCALE`].
    pub quality: f32,

    /// Number of files converted in parallel. Default: available parallelism.
    pub workers: usize,

    /// How output base names are derived. Default: [`NamingScheme::ContentHash`].
    pub naming: NamingScheme,

    /// JPEG encoder quality, 1–100. Default: 90.
    pub jpeg_quality: u8,

    /// Where failed files are listed. Default: `errors.log` in the working
    /// directory. `None` disables the log file (failures are still reported).
    pub error_log: Option<PathBuf>,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            flatten: false,
            quality: 2.0,
            workers: default_workers(),
            naming: NamingScheme::default(),
            jpeg_quality: 90,
            error_log: Some(PathBuf::from(DEFAULT_ERROR_LOG)),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("output_dir", &self.output_dir)
            .field("flatten", &self.flatten)
            .field("quality", &self.quality)
            .field("workers", &self.workers)
            .field("naming", &self.naming)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("error_log", &self.error_log)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Number of parallel execution units, falling back to 1 when the platform
/// cannot tell.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn flatten(mut self, v: bool) -> Self {
        self.config.flatten = v;
        self
    }

    /// Validated in [`build`](Self::build); not clamped, so a typo such as
    /// `-q 0` is reported instead of silently changed.
    pub fn quality(mut self, scale: f32) -> Self {
        self.config.quality = scale;
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = n.max(1);
        self
    }

    pub fn naming(mut self, scheme: NamingScheme) -> Self {
        self.config.naming = scheme;
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn error_log(mut self, path: Option<PathBuf>) -> Self {
        self.config.error_log = path;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2JpgError> {
        let c = &self.config;
        if !c.quality.is_finite() || c.quality <= 0.0 || c.quality > MAX_QUALITY {
            return Err(Pdf2JpgError::InvalidConfig(format!(
                "quality must be in (0, {MAX_QUALITY}], got {}",
                c.quality
            )));
        }
        if c.workers == 0 {
            return Err(Pdf2JpgError::InvalidConfig("workers must be ≥ 1".into()));
        }
        if c.flatten && c.naming == NamingScheme::Stem {
            return Err(Pdf2JpgError::InvalidConfig(
                "stem naming cannot be combined with flattened output: \
                 files sharing a name would overwrite each other"
                    .into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How the base file name of each output image set is derived.
///
/// One scheme applies to a whole run. In flattened mode the scheme is what
/// keeps `reports/2023/summary.pdf` and `reports/2024/summary.pdf` apart.
///
/// | Scheme | Example | Deterministic |
/// |--------|---------|---------------|
/// | `ContentHash` | `3f9a1c0b7d22-page1.jpg` | yes |
/// | `RandomSuffix` | `summary_482913-page1.jpg` | no |
/// | `Stem` | `summary-page1.jpg` | yes (mirrored mode only) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NamingScheme {
    /// First 12 hex characters of the blake3 hash of the file bytes. (default)
    #[default]
    ContentHash,
    /// Original stem plus `_` and a random six-digit number.
    RandomSuffix,
    /// Original stem unchanged.
    Stem,
}
