//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. The
//! [`operations`](super::operations) module plans them and the
//! [`backend`](super::backend) executes them, so a mock backend can stand in
//! for the pixel work in tests.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 85). Clamped on construction.
//! - [`Filter`]: Resampling filter for a resize.
//! - [`ResizeParams`]: Output path, exact target dimensions, filter, quality.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Resampling filter.
///
/// The main listing image uses [`Filter::Nearest`]: smoother filters
/// distort some source images at large downscale factors. Thumbnails use
/// [`Filter::Bicubic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Bicubic,
}

/// Parameters for one resize-and-encode job.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub filter: Filter,
    pub quality: Quality,
}
