//! JPEG output: encode rendered pages and publish them as one set.
//!
//! Each page is encoded straight into a hidden temporary file inside its
//! target directory. Nothing becomes visible under its final name until
//! [`StagedImages::commit`] runs, and a dropped `StagedImages` deletes its
//! temporaries, so a document that fails on page 7 of 10 leaves no
//! `-page1.jpg` … `-page6.jpg` behind.

use crate::error::FileError;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Encode `image` as a baseline JPEG.
///
/// JPEG has no alpha channel; RGBA renders are flattened to RGB first.
pub fn encode_jpeg<W: Write>(
    image: &DynamicImage,
    quality: u8,
    writer: W,
) -> Result<(), image::ImageError> {
    let rgb = image.to_rgb8();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(writer, quality))
}

/// Images encoded to temporary files, waiting to be moved into place.
#[derive(Default)]
pub struct StagedImages {
    staged: Vec<(NamedTempFile, PathBuf)>,
}

impl StagedImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Encode `image` into a temporary file next to `dest`.
    ///
    /// `page` is only used for error reporting.
    pub fn stage(
        &mut self,
        image: &DynamicImage,
        dest: PathBuf,
        jpeg_quality: u8,
        page: usize,
    ) -> Result<(), FileError> {
        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::Builder::new()
            .prefix(".pdf2jpg-")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|e| FileError::Write {
                path: dest.clone(),
                detail: e.to_string(),
            })?;

        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            encode_jpeg(image, jpeg_quality, &mut writer).map_err(|e| FileError::Encode {
                page,
                detail: e.to_string(),
            })?;
            writer.flush().map_err(|e| FileError::Write {
                path: dest.clone(),
                detail: e.to_string(),
            })?;
        }

        debug!(
            "Staged page {} ({}x{} px) for {}",
            page,
            image.width(),
            image.height(),
            dest.display()
        );
        self.staged.push((tmp, dest));
        Ok(())
    }

    /// Rename every staged file to its final name.
    ///
    /// If a rename fails, images already moved into place by this call are
    /// removed again and the remaining temporaries are deleted on drop.
    pub fn commit(self) -> Result<Vec<PathBuf>, FileError> {
        let mut published: Vec<PathBuf> = Vec::with_capacity(self.staged.len());

        for (tmp, dest) in self.staged {
            if let Err(e) = tmp.persist(&dest) {
                for path in &published {
                    if let Err(rm) = std::fs::remove_file(path) {
                        warn!("Could not roll back {}: {}", path.display(), rm);
                    }
                }
                return Err(FileError::Write {
                    path: dest,
                    detail: e.error.to_string(),
                });
            }
            published.push(dest);
        }

        Ok(published)
    }
}
