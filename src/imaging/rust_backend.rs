//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG) | `image::ImageReader` with format sniffing |
//! | Resize | `DynamicImage::resize_exact` (`Nearest` / `CatmullRom`) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, ImageBackend};
use super::params::{Filter, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Backend built on the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn filter_type(filter: Filter) -> FilterType {
    match filter {
        Filter::Nearest => FilterType::Nearest,
        Filter::Bicubic => FilterType::CatmullRom,
    }
}

/// Encode as baseline JPEG. The encoder has no alpha support, so the image
/// is flattened to RGB first.
///
/// The buffer is flushed explicitly: a write error on the final flush would
/// otherwise be lost on drop.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100) as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to encode {}: {}", path.display(), e))
        })?;
    writer.flush()?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        let decode_error = |message: String| BackendError::Decode {
            path: path.display().to_string(),
            message,
        };
        ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| decode_error(e.to_string()))
    }

    fn resize(&self, source: &DynamicImage, params: &ResizeParams) -> Result<(), BackendError> {
        let resized = source.resize_exact(params.width, params.height, filter_type(params.filter));
        save_jpeg(&resized, &params.output, params.quality.value())
    }
}
