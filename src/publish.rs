//! Atomic publish.
//!
//! A build never writes into the live output directory. Everything goes to
//! a fresh staging directory inside the source root:
//!
//! ```text
//! site/
//! ├── _site/               # live output, untouched while writing
//! └── _tmpsite_a1B2c3/     # this build
//! ```
//!
//! Only after every item is written does the staging directory replace the
//! output: the old output is renamed aside to `<staging>_old`, then the
//! staging directory is renamed into place. Every `_tmpsite_*` entry left in
//! the source root (the renamed-aside output, or staging from failed builds)
//! is then removed.
//!
//! Renames only work within one filesystem, so the output directory must
//! live on the same filesystem as the source root.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Name prefix of staging directories.
pub const TEMP_PREFIX: &str = "_tmpsite_";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("refusing to delete {0}: not a staging directory")]
    NotStaging(PathBuf),
}

/// Create a fresh, uniquely named staging directory in `input_root`.
pub fn create_staging_dir(input_root: &Path) -> Result<PathBuf, PublishError> {
    let dir = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempdir_in(input_root)?
        .keep();
    debug!(path = %dir.display(), "created staging directory");
    Ok(dir)
}

/// Path the current output is moved to while the swap happens.
pub fn aside_path(staging: &Path) -> PathBuf {
    let mut name = OsString::from(staging.as_os_str());
    name.push("_old");
    PathBuf::from(name)
}

/// Replace `output` with `staging`.
///
/// Moving the old output aside is best-effort; the final rename is not.
pub fn swap_into_place(staging: &Path, output: &Path) -> Result<(), PublishError> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    if output.exists() {
        let aside = aside_path(staging);
        if let Err(e) = fs::rename(output, &aside) {
            warn!(output = %output.display(), error = %e, "could not move old output aside");
        }
    }
    fs::rename(staging, output)?;
    debug!(output = %output.display(), "published");
    Ok(())
}

/// Delete one staging entry, refusing anything whose path lacks the prefix.
pub fn remove_staging_entry(path: &Path) -> Result<(), PublishError> {
    if !path.to_string_lossy().contains(TEMP_PREFIX) {
        return Err(PublishError::NotStaging(path.to_path_buf()));
    }
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Remove every `_tmpsite_*` entry directly inside `input_root`.
///
/// A failed deletion is logged and skipped. Returns how many were removed.
pub fn remove_stale_staging(input_root: &Path) -> Result<usize, PublishError> {
    let mut removed = 0;
    for entry in fs::read_dir(input_root)? {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
            continue;
        }
        let path = entry.path();
        match remove_staging_entry(&path) {
            Ok(()) => removed += 1,
            Err(PublishError::Io(e)) => {
                warn!(path = %path.display(), error = %e, "could not remove staging directory");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(removed)
}
