//! Locating and binding the pdfium shared library.
//!
//! Search order (first hit wins):
//!
//! 1. `PDFIUM_LIB_PATH`: explicit path to `libpdfium.{so,dylib}` / `pdfium.dll`
//! 2. the directory containing the running executable
//! 3. the current working directory
//! 4. the system library search path
//!
//! The library is bound once per process; the returned [`PdfiumRasterizer`]
//! is then shared by every worker.

use crate::error::Pdf2JpgError;
use crate::pipeline::render::PdfiumRasterizer;
use pdfium_render::prelude::Pdfium;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable pointing at an existing pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind pdfium following the search order above.
pub fn bind_pdfium() -> Result<PdfiumRasterizer, Pdf2JpgError> {
    let mut attempts: Vec<String> = Vec::new();

    for candidate in candidate_paths() {
        if !candidate.exists() {
            continue;
        }
        match Pdfium::bind_to_library(&candidate) {
            Ok(bindings) => {
                info!("Bound pdfium from {}", candidate.display());
                return Ok(PdfiumRasterizer::new(Pdfium::new(bindings)));
            }
            Err(e) => {
                debug!("pdfium at {} rejected: {:?}", candidate.display(), e);
                attempts.push(format!("{}: {:?}", candidate.display(), e));
            }
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            info!("Bound system pdfium library");
            Ok(PdfiumRasterizer::new(Pdfium::new(bindings)))
        }
        Err(e) => {
            attempts.push(format!("system library: {:?}", e));
            Err(Pdf2JpgError::PdfiumBindingFailed(attempts.join("; ")))
        }
    }
}

/// Bind pdfium from an explicit library path, skipping the search.
pub fn bind_pdfium_from_path(path: &Path) -> Result<PdfiumRasterizer, Pdf2JpgError> {
    Pdfium::bind_to_library(path)
        .map(|bindings| PdfiumRasterizer::new(Pdfium::new(bindings)))
        .map_err(|e| {
            Pdf2JpgError::PdfiumBindingFailed(format!("{}: {:?}", path.display(), e))
        })
}

/// Library paths to try before falling back to the system search path.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(p) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !p.is_empty() {
            paths.push(PathBuf::from(p));
        }
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(Pdfium::pdfium_platform_library_name_at_path(&exe_dir));
    }

    paths.push(Pdfium::pdfium_platform_library_name_at_path("./"));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_is_tried_first() {
        std::env::set_var(PDFIUM_LIB_PATH_ENV, "/opt/pdfium/lib/libpdfium.so");
        let paths = candidate_paths();
        std::env::remove_var(PDFIUM_LIB_PATH_ENV);
        assert_eq!(paths[0], PathBuf::from("/opt/pdfium/lib/libpdfium.so"));
    }

    #[test]
    fn working_directory_is_always_a_candidate() {
        let paths = candidate_paths();
        let last = paths.last().unwrap();
        assert!(last.to_string_lossy().contains("pdfium"));
    }

    #[test]
    fn missing_explicit_library_fails_cleanly() {
        let err = bind_pdfium_from_path(Path::new("/definitely/not/libpdfium.so"))
            .err()
            .expect("binding a missing library must fail");
        assert!(matches!(err, Pdf2JpgError::PdfiumBindingFailed(_)));
    }
}
