//! Dated blog posts.
//!
//! `_posts/2024-01-05-hello.html` becomes `2024/01/05/hello.html`. Each post
//! exports a metadata record for other templates, available as a list under
//! the collection's name, newest first:
//!
//! | Key | Example |
//! |---|---|
//! | `title` | front matter `title` (null when absent) |
//! | `date` | `2024-01-05` |
//! | `xmldate` | `2024-01-05T00:00:00+00:00` |
//! | `url` | `https://example.com/2024/01/05/hello.html` |
//! | `atomid` | `https://example.com/2024-01-05-hello` |
//! | `content` | body rendered without a layout |
//! | `prev` / `next` | output paths of the neighbouring posts |
//!
//! When the post itself is written, `page` is its front matter with this
//! record merged on top.

use crate::collection::{CollectionEntry, SortKey};
use crate::config::{CollectionConfig, SiteConfig};
use crate::content::{Content, ContentError, EntryInfo, WriteContext};
use crate::document::Document;
use crate::front_matter::FrontMatter;
use crate::generator::{GenerateError, build_url};
use crate::naming::{PostName, parse_post_name};
use crate::template::{Markup, TemplateData, TemplateSet};
use serde_json::Value;

#[derive(Debug)]
pub struct Post {
    pub document: Document,
    pub name: PostName,
    pub url: String,
    pub atomid: String,
    pub entry: CollectionEntry,
}

/// The `post` generator.
pub fn generate_post(
    site: &SiteConfig,
    _config: &CollectionConfig,
    mut info: EntryInfo,
) -> Result<Content, GenerateError> {
    if !info.is_html() {
        return Err(GenerateError::Ignore);
    }
    let name = parse_post_name(&info.file_stem())?;
    info.output_path = name.output_path();
    let url = build_url(&site.url, &info.output_path)?;
    let atomid = build_url(&site.url, &name.atom_key())?;

    Ok(Content::Post(Post {
        document: Document::new(info, Markup::Html),
        entry: CollectionEntry::new(SortKey::Date(name.date)),
        name,
        url,
        atomid,
    }))
}

impl Post {
    /// Compile the body and build the exported metadata, `content` included.
    pub fn read(&mut self, templates: &mut TemplateSet, data: &TemplateData) -> Result<(), ContentError> {
        self.document.read(templates)?;
        let front_matter = &self.document.front_matter;
        let content = self.document.render_body(templates, data, front_matter)?;

        let metadata = &mut self.entry.metadata;
        metadata.insert(
            "title".into(),
            front_matter.get("title").cloned().unwrap_or(Value::Null),
        );
        metadata.insert("date".into(), self.name.date_string().into());
        metadata.insert("xmldate".into(), self.name.xml_date().into());
        metadata.insert("url".into(), self.url.clone().into());
        metadata.insert("atomid".into(), self.atomid.clone().into());
        metadata.insert("content".into(), content.into());
        Ok(())
    }

    /// Front matter with the exported metadata merged on top.
    pub fn page(&self) -> FrontMatter {
        let mut page = self.document.front_matter.clone();
        page.extend(self.entry.metadata.clone());
        page
    }

    pub fn write(&self, ctx: &WriteContext<'_>) -> Result<(), ContentError> {
        self.document.write_with_page(ctx, &self.page())
    }
}
