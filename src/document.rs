//! Front-matter-aware templated documents.
//!
//! A [`Document`] is read once (front matter parsed, body compiled under its
//! output path) and rendered at write time against a fresh
//! [`RenderContext`]: the site data plus its `page`.

use crate::content::{ContentError, EntryInfo, WriteContext};
use crate::front_matter::{self, FrontMatter};
use crate::template::{Markup, RenderContext, TemplateData, TemplateSet};
use std::fs;
use tracing::debug;

#[derive(Debug)]
pub struct Document {
    pub info: EntryInfo,
    pub markup: Markup,
    /// Empty until read; never absent.
    pub front_matter: FrontMatter,
    compiled: bool,
}

impl Document {
    pub fn new(info: EntryInfo, markup: Markup) -> Self {
        Self {
            info,
            markup,
            front_matter: FrontMatter::new(),
            compiled: false,
        }
    }

    /// Registered template name: the output path at read time.
    pub fn template_name(&self) -> &str {
        &self.info.output_path
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// The layout this document is rendered through, if any.
    ///
    /// Plain-text documents never use layouts.
    pub fn layout(&self) -> Option<&str> {
        match self.markup {
            Markup::Html => front_matter::layout(&self.front_matter),
            Markup::Text => None,
        }
    }

    /// Parse front matter and compile the body.
    pub fn read(&mut self, templates: &mut TemplateSet) -> Result<(), ContentError> {
        let source = fs::read_to_string(&self.info.source_path)?;
        let (front_matter, body) =
            front_matter::split(&source).map_err(|e| ContentError::FrontMatter {
                path: self.info.source_path.display().to_string(),
                source: e,
            })?;
        templates.compile(self.markup, &self.info.output_path, body)?;
        self.front_matter = front_matter;
        self.compiled = true;
        Ok(())
    }

    fn ensure_compiled(&self) -> Result<(), ContentError> {
        if self.compiled {
            Ok(())
        } else {
            Err(ContentError::NotCompiled(self.info.output_path.clone()))
        }
    }

    /// Render the body alone, ignoring any layout.
    pub fn render_body(
        &self,
        templates: &TemplateSet,
        site: &TemplateData,
        page: &FrontMatter,
    ) -> Result<String, ContentError> {
        self.ensure_compiled()?;
        Ok(templates.render(
            self.markup,
            self.template_name(),
            &RenderContext::new(site, page),
        )?)
    }

    /// Render the full output, through the layout chain when one is set.
    pub fn render(
        &self,
        templates: &TemplateSet,
        site: &TemplateData,
        page: &FrontMatter,
    ) -> Result<String, ContentError> {
        match self.layout() {
            Some(layout) => {
                self.ensure_compiled()?;
                Ok(templates.render_with_layout(self.template_name(), layout, site, page)?)
            }
            None => self.render_body(templates, site, page),
        }
    }

    /// Render with `page` as the page data and write to the output.
    pub fn write_with_page(&self, ctx: &WriteContext<'_>, page: &FrontMatter) -> Result<(), ContentError> {
        let rendered = self.render(ctx.templates, ctx.data, page)?;
        let dest = self.info.destination(ctx.output_dir);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, rendered)?;
        debug!(path = %self.info.output_path, "wrote document");
        Ok(())
    }

    /// Render with the document's own front matter as `page`.
    pub fn write(&self, ctx: &WriteContext<'_>) -> Result<(), ContentError> {
        self.write_with_page(ctx, &self.front_matter)
    }
}
