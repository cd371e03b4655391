//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations a listing needs:
//! decode a source image once, then resize-and-encode it any number of
//! times. It is `Sync` so one decoded image can feed concurrent jobs.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::ResizeParams;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Decode the image at `path`.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Resize `source` to exactly `params.width` x `params.height` and write
    /// it as a JPEG to `params.output`.
    fn resize(&self, source: &DynamicImage, params: &ResizeParams) -> Result<(), BackendError>;
}
