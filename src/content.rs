//! The content model: one value per filesystem entry destined for output.
//!
//! Every entry starts life as an [`EntryInfo`] (where it comes from, where it
//! goes). The walker or a collection generator then turns it into one of the
//! [`Content`] variants:
//!
//! | Variant | Source | Output |
//! |---|---|---|
//! | `Directory` | any directory | created |
//! | `File` | any other extension | byte copy |
//! | `Text` | `.xml`, `.css` | rendered, no escaping, no layouts |
//! | `Html` | `.html`, `.htm` | rendered, escaped, layouts |
//! | `Post` | `YYYY-MM-DD-slug.html` in a post collection | rendered with collection metadata |
//! | `Listing` | `NNN-slug.html` in a listing collection | rendered + two JPEG derivatives |
//!
//! Every variant goes through the same two phases: `read` (parse and compile,
//! nothing written) and `write` (produce output under a target directory).

use crate::cache::ImageOutcome;
use crate::collection::CollectionEntry;
use crate::document::Document;
use crate::front_matter::FrontMatterError;
use crate::imaging::{BackendError, ImageBackend};
use crate::listing::Listing;
use crate::post::Post;
use crate::template::{Markup, TemplateData, TemplateError, TemplateSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{path}: {source}")]
    FrontMatter {
        path: String,
        source: FrontMatterError,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("{0}: template was never compiled")]
    NotCompiled(String),
    #[error("no image for listing {0} (looked for .png and .jpg)")]
    MissingImage(String),
    #[error("image error: {0}")]
    Image(#[from] BackendError),
}

/// Where an entry comes from and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Location on disk.
    pub source_path: PathBuf,
    /// `/`-separated path relative to the output root. Generators rewrite it.
    pub output_path: String,
    pub is_dir: bool,
}

impl EntryInfo {
    pub fn new(source_path: impl Into<PathBuf>, output_path: impl Into<String>, is_dir: bool) -> Self {
        Self {
            source_path: source_path.into(),
            output_path: output_path.into(),
            is_dir,
        }
    }

    /// Lowercased extension of the source file.
    pub fn extension(&self) -> Option<String> {
        self.source_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    /// Source file name without its extension.
    pub fn file_stem(&self) -> String {
        self.source_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Whether the source is an `.html` / `.htm` file.
    pub fn is_html(&self) -> bool {
        matches!(self.extension().as_deref(), Some("html" | "htm"))
    }

    /// Target location under `dir`. A leading `/` on the output path never
    /// escapes `dir`.
    pub fn destination(&self, dir: &Path) -> PathBuf {
        dir.join(self.output_path.trim_start_matches('/'))
    }
}

/// Everything a write needs besides the item itself.
pub struct WriteContext<'a> {
    /// Root the item is written under.
    pub output_dir: &'a Path,
    /// Root of a previous build whose image derivatives may be reused.
    pub cache_dir: &'a Path,
    pub templates: &'a TemplateSet,
    pub data: &'a TemplateData,
    pub images: &'a dyn ImageBackend,
}

/// What a successful write produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Written {
    Directory,
    File,
    Document,
    Listing(ImageOutcome),
}

/// One output-bound entry.
#[derive(Debug)]
pub enum Content {
    Directory(EntryInfo),
    File(EntryInfo),
    Text(Document),
    Html(Document),
    Post(Post),
    Listing(Listing),
}

impl Content {
    /// Classify a walked entry by kind and extension.
    ///
    /// Returns `None` for files that never reach the output (`.rs` sources).
    pub fn classify(info: EntryInfo) -> Option<Self> {
        if info.is_dir {
            return Some(Self::Directory(info));
        }
        match info.extension().as_deref() {
            Some("html" | "htm") => Some(Self::Html(Document::new(info, Markup::Html))),
            Some("xml" | "css") => Some(Self::Text(Document::new(info, Markup::Text))),
            Some("rs") => None,
            _ => Some(Self::File(info)),
        }
    }

    pub fn info(&self) -> &EntryInfo {
        match self {
            Self::Directory(info) | Self::File(info) => info,
            Self::Text(doc) | Self::Html(doc) => &doc.info,
            Self::Post(post) => &post.document.info,
            Self::Listing(listing) => &listing.document.info,
        }
    }

    pub fn output_path(&self) -> &str {
        &self.info().output_path
    }

    /// Short kind name for logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Directory(_) => "directory",
            Self::File(_) => "file",
            Self::Text(_) => "text",
            Self::Html(_) => "html",
            Self::Post(_) => "post",
            Self::Listing(_) => "listing",
        }
    }

    /// Collection metadata and ordering key, for items that have them.
    pub fn entry(&self) -> Option<&CollectionEntry> {
        match self {
            Self::Post(post) => Some(&post.entry),
            Self::Listing(listing) => Some(&listing.entry),
            _ => None,
        }
    }

    pub fn entry_mut(&mut self) -> Option<&mut CollectionEntry> {
        match self {
            Self::Post(post) => Some(&mut post.entry),
            Self::Listing(listing) => Some(&mut listing.entry),
            _ => None,
        }
    }

    /// Parse front matter and compile templates. Writes nothing.
    pub fn read(&mut self, templates: &mut TemplateSet, data: &TemplateData) -> Result<(), ContentError> {
        match self {
            Self::Directory(_) | Self::File(_) => Ok(()),
            Self::Text(doc) | Self::Html(doc) => doc.read(templates),
            Self::Post(post) => post.read(templates, data),
            Self::Listing(listing) => listing.read(templates, data),
        }
    }

    /// Produce this item's output under `ctx.output_dir`.
    pub fn write(&self, ctx: &WriteContext<'_>) -> Result<Written, ContentError> {
        match self {
            Self::Directory(info) => {
                fs::create_dir_all(info.destination(ctx.output_dir))?;
                Ok(Written::Directory)
            }
            Self::File(info) => {
                let dest = info.destination(ctx.output_dir);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(&info.source_path, &dest)?;
                Ok(Written::File)
            }
            Self::Text(doc) | Self::Html(doc) => {
                doc.write(ctx)?;
                Ok(Written::Document)
            }
            Self::Post(post) => {
                post.write(ctx)?;
                Ok(Written::Document)
            }
            Self::Listing(listing) => listing.write(ctx).map(Written::Listing),
        }
    }
}
