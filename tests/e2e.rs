//! End-to-end tests against the real pdfium engine.
//!
//! These need a pdfium shared library (see `PDFIUM_LIB_PATH`) and are gated
//! behind the `E2E_ENABLED` environment variable so they do not run in CI
//! unless explicitly requested. The PDFs are generated on the fly.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=./libpdfium.so cargo test --test e2e -- --nocapture

use edgequake_pdf2jpg::{
    bind_pdfium, convert_dir, ConversionConfig, FileError, NamingScheme,
};
use std::path::Path;
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Bind pdfium, or skip the test when e2e runs are off or no library exists.
macro_rules! e2e_rasterizer {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        match bind_pdfium() {
            Ok(r) => Arc::new(r),
            Err(e) => {
                println!("SKIP: {e}");
                return;
            }
        }
    }};
}

/// A valid PDF with `pages` blank 200×100pt pages.
fn minimal_pdf(pages: usize) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", i + 3)).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages
    ));
    for _ in 0..pages {
        objects.push("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 100] >>".to_string());
    }

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_at = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for off in offsets {
        pdf.push_str(&format!("{off:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    pdf.into_bytes()
}

fn write(path: &Path, bytes: &[u8]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_convert_mirrored_tree() {
    let rasterizer = e2e_rasterizer!();
    let tmp = tempfile::tempdir().unwrap();
    let docs = tmp.path().join("docs");
    write(&docs.join("a.pdf"), &minimal_pdf(1));
    write(&docs.join("sub/b.pdf"), &minimal_pdf(3));
    let out = tmp.path().join("out");

    let config = ConversionConfig::builder()
        .output_dir(&out)
        .naming(NamingScheme::Stem)
        .error_log(Some(tmp.path().join("errors.log")))
        .build()
        .unwrap();
    let output = convert_dir(&docs, &config, rasterizer).await.unwrap();

    assert_eq!(output.stats.converted_files, 2);
    assert_eq!(output.stats.total_images, 4);

    // Single page at scale 1.0, multi-page at the default quality 2.0.
    let single = image::open(out.join("a.jpg")).unwrap();
    assert_eq!((single.width(), single.height()), (200, 100));
    for n in 1..=3 {
        let page = image::open(out.join(format!("sub/b-page{n}.jpg"))).unwrap();
        assert_eq!((page.width(), page.height()), (400, 200));
    }
}

#[tokio::test]
async fn test_corrupt_pdf_is_isolated() {
    let rasterizer = e2e_rasterizer!();
    let tmp = tempfile::tempdir().unwrap();
    let docs = tmp.path().join("docs");
    write(&docs.join("good.pdf"), &minimal_pdf(2));
    write(&docs.join("bad.pdf"), b"%PDF-1.4\nthis is not a pdf body");
    let out = tmp.path().join("out");
    let log = tmp.path().join("errors.log");

    let config = ConversionConfig::builder()
        .output_dir(&out)
        .flatten(true)
        .error_log(Some(log.clone()))
        .build()
        .unwrap();
    let output = convert_dir(&docs, &config, rasterizer).await.unwrap();

    assert_eq!(output.stats.converted_files, 1);
    assert_eq!(output.stats.failed_files, 1);
    assert!(matches!(
        output.failures().next().unwrap().error,
        Some(FileError::Open { .. })
    ));
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 2);

    let content = std::fs::read_to_string(&log).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("bad.pdf"));
}

#[test]
fn test_minimal_pdf_is_well_formed() {
    let pdf = minimal_pdf(2);
    let text = String::from_utf8(pdf).unwrap();
    assert!(text.starts_with("%PDF-1.4"));
    assert!(text.contains("/Count 2"));
    assert!(text.trim_end().ends_with("%%EOF"));
}
