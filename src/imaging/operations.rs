//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take
//! a listing's image settings, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{scale_to_width, thumbnail_dimensions};
use super::params::{Filter, Quality, ResizeParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Size and quality settings for a listing's two derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivativeConfig {
    /// Main image width; height follows the source aspect ratio.
    pub image_width: u32,
    /// Thumbnail width (0 = derive from height).
    pub thumb_width: u32,
    /// Thumbnail height (0 = derive from width).
    pub thumb_height: u32,
    pub quality: Quality,
}

impl Default for DerivativeConfig {
    fn default() -> Self {
        Self {
            image_width: 500,
            thumb_width: 0,
            thumb_height: 0,
            quality: Quality::default(),
        }
    }
}

/// Plan the main and thumbnail jobs without executing them.
pub fn plan_derivatives(
    source_dims: (u32, u32),
    main_output: &Path,
    thumb_output: &Path,
    config: &DerivativeConfig,
) -> (ResizeParams, ResizeParams) {
    let (main_w, main_h) = scale_to_width(source_dims, config.image_width);
    let (thumb_w, thumb_h) =
        thumbnail_dimensions(source_dims, (config.thumb_width, config.thumb_height));

    let main = ResizeParams {
        output: main_output.to_path_buf(),
        width: main_w,
        height: main_h,
        filter: Filter::Nearest,
        quality: config.quality,
    };
    let thumb = ResizeParams {
        output: thumb_output.to_path_buf(),
        width: thumb_w,
        height: thumb_h,
        filter: Filter::Bicubic,
        quality: config.quality,
    };
    (main, thumb)
}

/// Decode `source` once and write both derivatives concurrently.
///
/// Both jobs always run to completion. If both fail, the main image's
/// error is the one returned.
pub fn create_derivatives(
    backend: &dyn ImageBackend,
    source: &Path,
    main_output: &Path,
    thumb_output: &Path,
    config: &DerivativeConfig,
) -> Result<()> {
    let img = backend.decode(source)?;
    let (main, thumb) = plan_derivatives(
        (img.width(), img.height()),
        main_output,
        thumb_output,
        config,
    );

    let (main_result, thumb_result) = rayon::join(
        || backend.resize(&img, &main),
        || backend.resize(&img, &thumb),
    );
    main_result?;
    thumb_result
}
