//! Build orchestration.
//!
//! A build runs these stages in order; any failure stops it:
//!
//! ```text
//! 1. config       _config.yml over stock defaults
//! 2. walk         top-level content (skips . and _ entries)
//! 3. layouts      _layouts/* into the template set
//! 4. read         front matter + template compile for every document
//! 5. collections  generate, read, order, link; metadata into template data
//! 6. stage        fresh _tmpsite_* directory in the source root
//! 7. write        top-level content, then each collection
//! 8. publish      swap staging into the output location
//! 9. cleanup      remove every _tmpsite_* entry
//! ```
//!
//! Stages 1–5 only read. The live output directory is not touched until
//! stage 8, so a failed build leaves the previous site as it was.
//! [`check`] runs stages 1–5 only.

use crate::cache::ImageStats;
use crate::collection::{Collection, CollectionError};
use crate::config::{self, ConfigError, SiteConfig};
use crate::content::{Content, ContentError, WriteContext, Written};
use crate::generator::GeneratorRegistry;
use crate::imaging::{ImageBackend, RustBackend};
use crate::publish::{self, PublishError};
use crate::template::{LAYOUTS_DIR, TemplateData, TemplateError, TemplateSet};
use crate::walk::{self, WalkError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Output directory name used when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "_site";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Walk error: {0}")]
    Walk(#[from] WalkError),
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

/// Where to read from and write to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub source: PathBuf,
    /// Defaults to `<source>/_site`.
    pub output: Option<PathBuf>,
    /// Defaults to the output directory.
    pub cache_dir: Option<PathBuf>,
}

impl BuildOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: None,
            cache_dir: None,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.source.join(DEFAULT_OUTPUT_DIR))
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| self.output_dir())
    }
}

/// Summary of a finished build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub documents: usize,
    pub directories: usize,
    pub files: usize,
    pub layouts: usize,
    /// Item count per collection, in build order.
    pub collections: Vec<(String, usize)>,
    pub images: ImageStats,
    pub stale_removed: usize,
    pub output: PathBuf,
}

impl BuildReport {
    fn record(&mut self, written: Written) {
        match written {
            Written::Directory => self.directories += 1,
            Written::File => self.files += 1,
            Written::Document => self.documents += 1,
            Written::Listing(outcome) => {
                self.documents += 1;
                self.images.record(outcome);
            }
        }
    }
}

/// Summary of a read-only check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub content: usize,
    pub layouts: usize,
    pub collections: Vec<(String, usize)>,
}

/// Everything read before anything is written.
struct Prepared {
    templates: TemplateSet,
    data: TemplateData,
    layouts: usize,
    content: Vec<Content>,
    collections: Vec<Collection>,
}

impl Prepared {
    fn collection_counts(&self) -> Vec<(String, usize)> {
        self.collections
            .iter()
            .map(|c| (c.name.clone(), c.items().len()))
            .collect()
    }
}

fn prepare(source: &Path, registry: &GeneratorRegistry) -> Result<Prepared, BuildError> {
    let config: SiteConfig = config::load_config(source)?;
    info!(source = %source.display(), collections = config.collections.len(), "loaded config");

    let mut content = walk::walk(source)?;
    info!(items = content.len(), "walked source tree");

    let mut templates = TemplateSet::new();
    let layouts = templates.load_layouts(&source.join(LAYOUTS_DIR))?;
    info!(layouts, "loaded layouts");

    let mut data = config.template_data();
    for item in &mut content {
        item.read(&mut templates, &data)?;
    }

    let mut collections: Vec<Collection> = config
        .collections
        .iter()
        .filter_map(|(name, collection)| Collection::new(name, collection, registry))
        .collect();
    for collection in &mut collections {
        collection.read(source, &config, &mut templates, &mut data)?;
    }

    Ok(Prepared {
        templates,
        data,
        layouts,
        content,
        collections,
    })
}

/// Validate config, content, and collections without writing anything.
pub fn check(options: &BuildOptions, registry: &GeneratorRegistry) -> Result<CheckReport, BuildError> {
    let prepared = prepare(&options.source, registry)?;
    Ok(CheckReport {
        content: prepared.content.len(),
        layouts: prepared.layouts,
        collections: prepared.collection_counts(),
    })
}

/// Build and publish the site with the standard image backend.
pub fn build(options: &BuildOptions, registry: &GeneratorRegistry) -> Result<BuildReport, BuildError> {
    build_with_backend(options, registry, &RustBackend::new())
}

fn write_all(
    prepared: &Prepared,
    ctx: &WriteContext<'_>,
    report: &mut BuildReport,
) -> Result<(), BuildError> {
    for item in &prepared.content {
        report.record(item.write(ctx)?);
    }
    for collection in &prepared.collections {
        for written in collection.write(ctx)? {
            report.record(written);
        }
        info!(collection = %collection.name, items = collection.items().len(), "wrote collection");
    }
    Ok(())
}

/// Build and publish the site, encoding images with `images`.
pub fn build_with_backend(
    options: &BuildOptions,
    registry: &GeneratorRegistry,
    images: &dyn ImageBackend,
) -> Result<BuildReport, BuildError> {
    let source = options.source.as_path();
    let output = options.output_dir();
    let cache_dir = options.cache_dir();
    let prepared = prepare(source, registry)?;

    let staging = publish::create_staging_dir(source)?;
    info!(staging = %staging.display(), "writing site");

    let mut report = BuildReport {
        layouts: prepared.layouts,
        collections: prepared.collection_counts(),
        output: output.clone(),
        ..BuildReport::default()
    };
    let ctx = WriteContext {
        output_dir: &staging,
        cache_dir: &cache_dir,
        templates: &prepared.templates,
        data: &prepared.data,
        images,
    };
    write_all(&prepared, &ctx, &mut report)?;

    publish::swap_into_place(&staging, &output)?;
    report.stale_removed = publish::remove_stale_staging(source)?;
    info!(
        output = %output.display(),
        documents = report.documents,
        images = %report.images,
        "build complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::write_file;
    use std::fs;
    use tempfile::TempDir;

    fn registry() -> GeneratorRegistry {
        GeneratorRegistry::with_builtins().unwrap()
    }

    #[test]
    fn options_defaults() {
        let options = BuildOptions::new("/site");
        assert_eq!(options.output_dir(), PathBuf::from("/site/_site"));
        assert_eq!(options.cache_dir(), PathBuf::from("/site/_site"));

        let options = BuildOptions {
            output: Some("/www".into()),
            ..BuildOptions::new("/site")
        };
        assert_eq!(options.cache_dir(), PathBuf::from("/www"));
    }

    #[test]
    fn build_counts_written_items() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write_file(&root.join("index.html"), "{{#each posts}}{{title}};{{/each}}");
        write_file(&root.join("css/site.css"), "body{}");
        write_file(&root.join("robots.txt"), "ok");
        write_file(&root.join("_posts/2024-01-05-a.html"), "---\ntitle: A\n---\na");

        let report = build_with_backend(&BuildOptions::new(root), &registry(), &MockBackend::new()).unwrap();
        assert_eq!(report.documents, 3);
        assert_eq!(report.directories, 1);
        assert_eq!(report.files, 1);
        assert_eq!(report.collections, [("posts".to_string(), 1)]);
        assert_eq!(report.output, root.join("_site"));
        assert_eq!(fs::read_to_string(root.join("_site/index.html")).unwrap(), "A;");
    }

    #[test]
    fn check_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write_file(&root.join("index.html"), "hi");
        write_file(&root.join("_posts/2024-01-05-a.html"), "a");

        let report = check(&BuildOptions::new(root), &registry()).unwrap();
        assert_eq!(report.content, 1);
        assert_eq!(report.collections, [("posts".to_string(), 1)]);

        let entries: Vec<_> = fs::read_dir(root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert!(!entries.iter().any(|n| n.starts_with(publish::TEMP_PREFIX)));
        assert!(!root.join(DEFAULT_OUTPUT_DIR).exists());
    }

    #[test]
    fn invalid_config_fails_before_staging() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("_config.yml"), "collections:\n  posts:\n    quality: 0\n");
        let err = build_with_backend(&BuildOptions::new(tmp.path()), &registry(), &MockBackend::new())
            .unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
