//! Image derivative cache for incremental builds.
//!
//! JPEG encoding is the only expensive part of a build. Listing images are
//! re-encoded only when their source changed since the last build; otherwise
//! the derivatives from a previous build are copied into the new output.
//!
//! # Design
//!
//! The cache root mirrors the output tree, so by default it *is* the
//! previously published site: `<cache>/listing/42/shot.jpg` is the main
//! image written by the last build for `listing/42/shot.html`.
//!
//! ## Freshness
//!
//! Freshness is keyed on modification time only. The cached pair is reused
//! when the cached **main** image exists and its mtime is at or after the
//! source image's mtime. The thumbnail is assumed to travel with it; if it
//! is missing the copy fails and the caller falls back to encoding.
//!
//! Encoding settings are not part of the key: after changing `image_width`
//! or `quality`, touch the sources or clear the output to force re-encoding.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix appended to the output stem for thumbnails.
pub const THUMB_SUFFIX: &str = "_thumb";

/// Paths of the main image and thumbnail under some root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivativePaths {
    pub main: PathBuf,
    pub thumb: PathBuf,
}

impl DerivativePaths {
    /// Derivative locations for an output stem such as `/listing/42/shot`.
    ///
    /// A leading `/` on the stem is ignored: paths always resolve inside `root`.
    pub fn under(root: &Path, output_stem: &str) -> Self {
        let stem = output_stem.trim_start_matches('/');
        Self {
            main: root.join(format!("{stem}.jpg")),
            thumb: root.join(format!("{stem}{THUMB_SUFFIX}.jpg")),
        }
    }
}

/// Whether a cached main image can stand in for one encoded from `source`.
///
/// Returns `Ok(false)` when the cached file does not exist. Failing to stat
/// the source is an error, since encoding would fail the same way.
pub fn is_fresh(source: &Path, cached_main: &Path) -> io::Result<bool> {
    let cached = match fs::metadata(cached_main) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    let source_modified = fs::metadata(source)?.modified()?;
    Ok(cached.modified()? >= source_modified)
}

/// Copy both cached derivatives into place.
pub fn copy_cached(cached: &DerivativePaths, output: &DerivativePaths) -> io::Result<()> {
    fs::copy(&cached.main, &output.main)?;
    fs::copy(&cached.thumb, &output.thumb)?;
    Ok(())
}

/// How a listing's images were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    Cached,
    Encoded,
}

/// Summary of cache performance for a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImageStats {
    pub cached: u32,
    pub encoded: u32,
}

impl ImageStats {
    pub fn record(&mut self, outcome: ImageOutcome) {
        match outcome {
            ImageOutcome::Cached => self.cached += 1,
            ImageOutcome::Encoded => self.encoded += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.cached + self.encoded
    }
}

impl fmt::Display for ImageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cached > 0 {
            write!(
                f,
                "{} cached, {} encoded ({} total)",
                self.cached,
                self.encoded,
                self.total()
            )
        } else {
            write!(f, "{} encoded", self.encoded)
        }
    }
}
