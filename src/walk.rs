//! Top-level directory walk.
//!
//! Turns the source tree into content items. Entries whose name begins with
//! `.` or `_` are skipped, and for directories their whole subtree is
//! skipped too: that keeps `_config.yml`, `_layouts/`, collection
//! directories, the default `_site` output and `_tmpsite_*` staging
//! directories out of the published site.
//!
//! Siblings are visited in file-name order and a directory always comes
//! before its contents. Symlinks are followed, so a linked directory is
//! published like a real one; link loops and dangling links are logged and
//! skipped.

use crate::content::{Content, EntryInfo};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{trace, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("{path} is not inside the source root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// The root itself is never hidden, whatever its name.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name.starts_with('_'))
}

/// `/`-separated form of a root-relative path.
fn output_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Walk `root` and classify every entry that belongs in the output.
///
/// Unreadable entries are logged and skipped.
pub fn walk(root: &Path) -> Result<Vec<Content>, WalkError> {
    let mut items = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| WalkError::OutsideRoot {
                path: entry.path().to_path_buf(),
                root: root.to_path_buf(),
            })?;
        let info = EntryInfo::new(
            entry.path(),
            output_path(relative),
            entry.file_type().is_dir(),
        );
        match Content::classify(info) {
            Some(content) => {
                trace!(path = %content.output_path(), kind = content.kind(), "walked");
                items.push(content);
            }
            None => trace!(path = %entry.path().display(), "excluded"),
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{output_paths, write_file};
    use tempfile::TempDir;

    #[test]
    fn walk_skips_hidden_and_underscore_entries() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write_file(&root.join("index.html"), "");
        write_file(&root.join(".git/config"), "");
        write_file(&root.join(".hidden.html"), "");
        write_file(&root.join("_config.yml"), "");
        write_file(&root.join("_posts/2024-01-05-a.html"), "");
        write_file(&root.join("_site/index.html"), "");
        write_file(&root.join("blog/_draft.html"), "");
        write_file(&root.join("blog/feed.xml"), "");

        let items = walk(root).unwrap();
        assert_eq!(output_paths(&items), ["blog", "blog/feed.xml", "index.html"]);
    }

    #[test]
    fn walk_classifies_entries() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write_file(&root.join("css/site.css"), "");
        write_file(&root.join("img/logo.png"), "");
        write_file(&root.join("about.htm"), "");
        write_file(&root.join("main.rs"), "");

        let items = walk(root).unwrap();
        let kinds: Vec<_> = items
            .iter()
            .map(|c| (c.output_path(), c.kind()))
            .collect();
        assert_eq!(
            kinds,
            [
                ("about.htm", "html"),
                ("css", "directory"),
                ("css/site.css", "text"),
                ("img", "directory"),
                ("img/logo.png", "file"),
            ]
        );
    }

    #[test]
    fn walk_keeps_source_paths() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("a/b/c.txt"), "");
        let items = walk(tmp.path()).unwrap();
        let file = items.iter().find(|c| c.output_path() == "a/b/c.txt").unwrap();
        assert_eq!(file.info().source_path, tmp.path().join("a/b/c.txt"));
        assert!(!file.info().is_dir);
    }

    #[cfg(unix)]
    #[test]
    fn walk_follows_symlinked_directories() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("site");
        write_file(&tmp.path().join("shared/logo.png"), "");
        write_file(&root.join("index.html"), "");
        symlink(tmp.path().join("shared"), root.join("assets")).unwrap();
        symlink(tmp.path().join("missing"), root.join("dangling")).unwrap();

        let items = walk(&root).unwrap();
        assert_eq!(output_paths(&items), ["assets", "assets/logo.png", "index.html"]);
        assert_eq!(items[0].kind(), "directory");
        assert!(items[0].info().is_dir);
        assert_eq!(items[1].kind(), "file");
    }

    #[cfg(unix)]
    #[test]
    fn walk_skips_symlink_loops() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("a/page.html"), "");
        symlink(tmp.path().join("a"), tmp.path().join("a/again")).unwrap();

        let items = walk(tmp.path()).unwrap();
        assert_eq!(output_paths(&items), ["a", "a/page.html"]);
    }

    #[test]
    fn walk_empty_root() {
        let tmp = TempDir::new().unwrap();
        assert!(walk(tmp.path()).unwrap().is_empty());
    }
}
