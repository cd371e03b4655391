//! Image-backed listings.
//!
//! A listing is an HTML file plus a companion image with the same stem:
//!
//! ```text
//! _gallery/
//! ├── 042-harbour.html     # front matter + body
//! └── 042-harbour.png      # or .jpg
//! ```
//!
//! With `path: gallery` this produces:
//!
//! ```text
//! gallery/42/harbour.html
//! gallery/42/harbour.jpg          # image_width wide, nearest neighbour
//! gallery/42/harbour_thumb.jpg    # thumb_width x thumb_height, bicubic
//! ```
//!
//! Listings are ordered by id, highest first. The exported metadata is the
//! front matter plus `id`, `url`, `img`, `thumb`, `content`, and the
//! `prev` / `next` links.

use crate::cache::{self, DerivativePaths, ImageOutcome};
use crate::collection::{CollectionEntry, SortKey};
use crate::config::{CollectionConfig, SiteConfig};
use crate::content::{Content, ContentError, EntryInfo, WriteContext};
use crate::document::Document;
use crate::front_matter::FrontMatter;
use crate::generator::{GenerateError, build_url};
use crate::imaging::{DerivativeConfig, create_derivatives};
use crate::naming::{ListingName, parse_listing_name};
use crate::template::{Markup, TemplateData, TemplateSet};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Companion image extensions, in lookup order.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg"];

#[derive(Debug)]
pub struct Listing {
    pub document: Document,
    pub name: ListingName,
    pub url: String,
    pub img: String,
    pub thumb: String,
    pub images: DerivativeConfig,
    pub entry: CollectionEntry,
}

/// The `listing` generator.
pub fn generate_listing(
    _site: &SiteConfig,
    config: &CollectionConfig,
    mut info: EntryInfo,
) -> Result<Content, GenerateError> {
    if !info.is_html() {
        return Err(GenerateError::Ignore);
    }
    let name = parse_listing_name(&info.file_stem())?;
    let stem = name.stem_under(&config.path);
    info.output_path = format!("{stem}.html");

    // Listing URLs are always site-root relative.
    let url = build_url("", &info.output_path)?;
    let img = build_url("", &format!("{stem}.jpg"))?;
    let thumb = build_url("", &format!("{stem}{}.jpg", cache::THUMB_SUFFIX))?;

    Ok(Content::Listing(Listing {
        document: Document::new(info, Markup::Html),
        entry: CollectionEntry::new(SortKey::Id(name.id)),
        name,
        url,
        img,
        thumb,
        images: DerivativeConfig {
            image_width: config.image_width,
            thumb_width: config.thumb_width,
            thumb_height: config.thumb_height,
            quality: config.jpeg_quality(),
        },
    }))
}

impl Listing {
    /// Compile the body and build the exported metadata.
    pub fn read(&mut self, templates: &mut TemplateSet, data: &TemplateData) -> Result<(), ContentError> {
        self.document.read(templates)?;
        let front_matter = &self.document.front_matter;
        let content = self.document.render_body(templates, data, front_matter)?;

        let metadata = &mut self.entry.metadata;
        metadata.clone_from(front_matter);
        metadata.insert("id".into(), self.name.id.into());
        metadata.insert("url".into(), self.url.clone().into());
        metadata.insert("img".into(), self.img.clone().into());
        metadata.insert("thumb".into(), self.thumb.clone().into());
        metadata.insert("content".into(), content.into());
        Ok(())
    }

    /// Front matter with the exported metadata merged on top.
    pub fn page(&self) -> FrontMatter {
        let mut page = self.document.front_matter.clone();
        page.extend(self.entry.metadata.clone());
        page
    }

    /// Output stem (`/gallery/42/harbour`), shared by the page and images.
    fn output_stem(&self) -> &str {
        let path = &self.document.info.output_path;
        path.strip_suffix(".html").unwrap_or(path)
    }

    /// The companion image: `<stem>.png`, else `<stem>.jpg`.
    pub fn source_image(&self) -> Result<PathBuf, ContentError> {
        let source = &self.document.info.source_path;
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| source.with_extension(ext))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| ContentError::MissingImage(source.display().to_string()))
    }

    pub fn write(&self, ctx: &WriteContext<'_>) -> Result<ImageOutcome, ContentError> {
        self.document.write_with_page(ctx, &self.page())?;
        self.write_images(ctx)
    }

    fn write_images(&self, ctx: &WriteContext<'_>) -> Result<ImageOutcome, ContentError> {
        let source = self.source_image()?;
        let output = DerivativePaths::under(ctx.output_dir, self.output_stem());
        let cached = DerivativePaths::under(ctx.cache_dir, self.output_stem());

        if let Some(parent) = output.main.parent() {
            fs::create_dir_all(parent)?;
        }

        if cache::is_fresh(&source, &cached.main)? {
            match cache::copy_cached(&cached, &output) {
                Ok(()) => {
                    debug!(listing = %self.url, "images cached");
                    return Ok(ImageOutcome::Cached);
                }
                Err(e) => warn!(listing = %self.url, error = %e, "cached images unusable, re-encoding"),
            }
        }

        create_derivatives(ctx.images, &source, &output.main, &output.thumb, &self.images)?;
        debug!(listing = %self.url, "images encoded");
        Ok(ImageOutcome::Encoded)
    }
}
