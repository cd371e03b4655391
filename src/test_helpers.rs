//! Shared test utilities for the trowel test suite.
//!
//! Fixture builders that lay out small source trees on disk, plus lookup
//! helpers that panic with a clear message instead of returning `Option`.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_file(&tmp.path().join("_posts/2024-01-05-hello.html"), "hi");
//! write_png(&tmp.path().join("_shots/1-a.png"), 40, 30);
//!
//! let post = find_item(collection.items(), "2024/01/05/hello.html");
//! assert_eq!(post.kind(), "post");
//! ```

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::content::Content;

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Write a gradient PNG of the given size, creating parent directories.
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 200])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Set a file's modification time.
pub fn set_mtime(path: &Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

// =========================================================================
// Lookup helpers
// =========================================================================

/// Find an item by output path. Panics with the available paths if missing.
pub fn find_item<'a>(items: &'a [Content], output_path: &str) -> &'a Content {
    items
        .iter()
        .find(|c| c.output_path() == output_path)
        .unwrap_or_else(|| {
            panic!(
                "item '{}' not found. Available: {:?}",
                output_path,
                output_paths(items)
            )
        })
}

/// Output paths of `items`, in order.
pub fn output_paths(items: &[Content]) -> Vec<&str> {
    items.iter().map(Content::output_path).collect()
}

/// A metadata value of a collection item as a string.
///
/// Panics if the item is not a collection item or the key is missing.
pub fn metadata_str<'a>(item: &'a Content, key: &str) -> &'a str {
    let entry = item
        .entry()
        .unwrap_or_else(|| panic!("'{}' is not a collection item", item.output_path()));
    entry
        .metadata
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| {
            panic!(
                "'{}' has no string metadata '{}'. Keys: {:?}",
                item.output_path(),
                key,
                entry.metadata.keys().collect::<Vec<_>>()
            )
        })
}
