//! Named collections of generated content.
//!
//! A collection reads the files directly inside its directory (no
//! recursion), hands each to its generator, reads the results, and orders
//! them:
//!
//! - **Posts**: by date, newest first.
//! - **Listings**: by id, highest first.
//! - Anything else, or a post next to a listing: by output path.
//!
//! The sort is stable, so items with equal keys keep file-name order.
//! After sorting, every collection item gets `prev` / `next` links to its
//! neighbours' output paths, and the metadata of all of them is published
//! to the template data under the collection's name.

use crate::config::{CollectionConfig, SiteConfig};
use crate::content::{Content, ContentError, EntryInfo, WriteContext, Written};
use crate::front_matter::FrontMatter;
use crate::generator::{GenerateError, Generator, GeneratorRegistry};
use crate::template::{TemplateData, TemplateSet};
use chrono::NaiveDate;
use serde_json::Value;
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("collection '{collection}': {path}: {source}")]
    Generate {
        collection: String,
        path: String,
        source: GenerateError,
    },
    #[error("collection '{collection}': {source}")]
    Content {
        collection: String,
        source: ContentError,
    },
}

/// Ordering key of a collection item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date(NaiveDate),
    Id(u64),
}

impl SortKey {
    /// Newest first. `None` when the keys are of different kinds.
    pub fn newest_first(&self, other: &SortKey) -> Option<Ordering> {
        match (self, other) {
            (SortKey::Date(a), SortKey::Date(b)) => Some(b.cmp(a)),
            (SortKey::Id(a), SortKey::Id(b)) => Some(b.cmp(a)),
            _ => None,
        }
    }
}

/// What makes a content item a collection item: its ordering key and the
/// metadata it exports to templates.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionEntry {
    pub sort_key: SortKey,
    pub metadata: FrontMatter,
}

impl CollectionEntry {
    pub fn new(sort_key: SortKey) -> Self {
        Self {
            sort_key,
            metadata: FrontMatter::new(),
        }
    }
}

/// Collection ordering, falling back to output path order.
fn compare(a: &Content, b: &Content) -> Ordering {
    let keyed = match (a.entry(), b.entry()) {
        (Some(x), Some(y)) => x.sort_key.newest_first(&y.sort_key),
        _ => None,
    };
    keyed.unwrap_or_else(|| a.output_path().cmp(b.output_path()))
}

/// Set `prev` / `next` on every collection item from its neighbours.
///
/// Neighbours are positional: a non-collection item between two posts is
/// still the neighbour of both.
fn link_neighbours(items: &mut [Content]) {
    let paths: Vec<String> = items.iter().map(|c| c.output_path().to_string()).collect();
    for (i, item) in items.iter_mut().enumerate() {
        let Some(entry) = item.entry_mut() else {
            continue;
        };
        if i > 0 {
            entry.metadata.insert("prev".into(), paths[i - 1].clone().into());
        }
        if let Some(next) = paths.get(i + 1) {
            entry.metadata.insert("next".into(), next.clone().into());
        }
    }
}

pub struct Collection {
    pub name: String,
    pub config: CollectionConfig,
    generate: Generator,
    items: Vec<Content>,
}

impl Collection {
    /// Bind `name` to its configured generator.
    ///
    /// Returns `None` when the registry has no generator of that name; the
    /// collection is then skipped.
    pub fn new(name: &str, config: &CollectionConfig, registry: &GeneratorRegistry) -> Option<Self> {
        let Some(generate) = registry.get(&config.generator) else {
            debug!(
                collection = name,
                generator = %config.generator,
                "no such generator, collection skipped"
            );
            return None;
        };
        Some(Self {
            name: name.to_string(),
            config: config.clone(),
            generate,
            items: Vec::new(),
        })
    }

    /// Source directory, relative to the site root.
    pub fn dir(&self) -> String {
        self.config.source_dir(&self.name)
    }

    /// Items in collection order. Empty until read.
    pub fn items(&self) -> &[Content] {
        &self.items
    }

    /// Files directly under `dir`, sorted by name. Missing dir → empty.
    fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Generate, read, order, and link this collection's items, then
    /// publish their metadata into `data` under the collection name.
    pub fn read(
        &mut self,
        input_root: &Path,
        site: &SiteConfig,
        templates: &mut TemplateSet,
        data: &mut TemplateData,
    ) -> Result<(), CollectionError> {
        let dir = input_root.join(self.dir());
        let mut items = Vec::new();
        for path in Self::list_files(&dir)? {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let info = EntryInfo::new(path.clone(), file_name, false);
            match (self.generate)(site, &self.config, info) {
                Ok(content) => items.push(content),
                Err(GenerateError::Ignore) => {}
                Err(e) => {
                    return Err(CollectionError::Generate {
                        collection: self.name.clone(),
                        path: path.display().to_string(),
                        source: e,
                    });
                }
            }
        }

        for item in &mut items {
            item.read(templates, data)
                .map_err(|e| CollectionError::Content {
                    collection: self.name.clone(),
                    source: e,
                })?;
        }

        items.sort_by(compare);
        link_neighbours(&mut items);

        let metadata: Vec<Value> = items
            .iter()
            .filter_map(Content::entry)
            .map(|entry| Value::Object(entry.metadata.clone()))
            .collect();
        if !metadata.is_empty() {
            data.insert(self.name.clone(), Value::Array(metadata));
        }

        info!(collection = %self.name, items = items.len(), "read collection");
        self.items = items;
        Ok(())
    }

    /// Write every item in order, stopping at the first failure.
    pub fn write(&self, ctx: &WriteContext<'_>) -> Result<Vec<Written>, CollectionError> {
        self.items
            .iter()
            .map(|item| {
                item.write(ctx).map_err(|e| CollectionError::Content {
                    collection: self.name.clone(),
                    source: e,
                })
            })
            .collect()
    }
}
