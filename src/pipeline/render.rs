//! PDF rasterisation: open a document from bytes and render its pages.
//!
//! The rendering engine sits behind two small traits, [`Rasterizer`] and
//! [`RasterDocument`]. [`PdfiumRasterizer`] is the production engine; tests
//! plug in a fake so the batch logic runs without the native library.
//!
//! pdfium is bound once per process (see [`crate::engine`]) and shared by
//! every worker. With the `thread_safe` feature of `pdfium-render`, calls
//! into the library are serialised internally, so workers still overlap on
//! file I/O and JPEG encoding while rasterisation itself takes turns.

use crate::config::DEFAULT_SCALE;
use crate::error::FileError;
use crate::pipeline::target::OutputTarget;
use crate::pipeline::write::StagedImages;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// A PDF engine able to open documents from raw bytes.
pub trait Rasterizer: Send + Sync {
    /// Parse `bytes` into a renderable document.
    ///
    /// Corrupt or encrypted input is reported as [`FileError::Open`] or
    /// [`FileError::PasswordProtected`].
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RasterDocument + 'a>, FileError>;
}

/// An opened document.
pub trait RasterDocument {
    fn page_count(&self) -> usize;

    /// Render the page at 0-based `index`, scaling both axes by `scale`
    /// (1.0 = one pixel per PDF point).
    fn render_page(&self, index: usize, scale: f32) -> Result<DynamicImage, FileError>;
}

/// Render every page of `document` and publish the images under `target`.
///
/// * more than one page: each page at `quality`, named `{base}-page{N}.jpg`
/// * exactly one page: at [`DEFAULT_SCALE`], named `{base}.jpg`
///
/// Either all images of the document are written or none are.
pub fn render_document(
    document: &dyn RasterDocument,
    target: &OutputTarget,
    quality: f32,
    jpeg_quality: u8,
) -> Result<Vec<PathBuf>, FileError> {
    let total_pages = document.page_count();
    if total_pages == 0 {
        return Err(FileError::EmptyDocument);
    }
    debug!("Document has {} pages", total_pages);

    let mut staged = StagedImages::new();

    if total_pages == 1 {
        let image = document.render_page(0, DEFAULT_SCALE)?;
        staged.stage(&image, target.single_image_path(), jpeg_quality, 1)?;
    } else {
        for idx in 0..total_pages {
            let page_num = idx + 1;
            let image = document.render_page(idx, quality)?;
            staged.stage(&image, target.page_image_path(page_num), jpeg_quality, page_num)?;
        }
    }

    staged.commit()
}

// ── pdfium ───────────────────────────────────────────────────────────────

/// [`Rasterizer`] backed by a bound pdfium library.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    pub fn new(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RasterDocument + 'a>, FileError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    FileError::PasswordProtected
                } else {
                    FileError::Open { detail: err_str }
                }
            })?;

        info!("PDF loaded: {} pages", document.pages().len());
        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl RasterDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, index: usize, scale: f32) -> Result<DynamicImage, FileError> {
        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|e| FileError::Render {
                page: index + 1,
                detail: format!("{:?}", e),
            })?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| FileError::Render {
                page: index + 1,
                detail: format!("{:?}", e),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );

        Ok(image)
    }
}
