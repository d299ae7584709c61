//! Per-file pipeline stages.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the rendering engine can be swapped without touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//! collect ──▶ target ──▶ render ──▶ write
//! (walkdir)   (paths)    (pdfium)   (jpeg, atomic)
//! ```
//!
//! 1. [`collect`]: find every `.pdf` under the input root
//! 2. [`target`]: output directory and base name for one file
//! 3. [`render`]: rasterise the pages through a [`render::Rasterizer`]
//! 4. [`write`]: encode JPEGs into temporaries and publish them together

pub mod collect;
pub mod render;
pub mod target;
pub mod write;
