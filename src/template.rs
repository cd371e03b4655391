//! Template compilation, rendering, and layouts.
//!
//! Every document body is a [Handlebars](https://handlebarsjs.com/) template,
//! compiled once when the document is read and rendered at write time.
//!
//! Two registries are kept apart:
//!
//! | Registry | Used for | Escaping | Layouts |
//! |---|---|---|---|
//! | [`Markup::Html`] | `.html` / `.htm` documents and `_layouts/` | HTML (`{{{raw}}}` opts out) | yes |
//! | [`Markup::Text`] | `.xml` / `.css` documents | none | no |
//!
//! ## Render context
//!
//! Templates see the site-wide data at the top level and their own front
//! matter under `page`:
//!
//! ```text
//! {{title}}            site config key
//! {{#each posts}}...   collection metadata, newest first
//! {{page.title}}       this document's front matter
//! ```
//!
//! The context is composed fresh for every render, so no render ever sees
//! another document's `page`.
//!
//! ## Layouts
//!
//! Every file directly under `_layouts/` is a layout, named by its file
//! stem (`_layouts/post.html` is `post`). A document opts in with
//! `layout: post` in its front matter. The document body is rendered first
//! and handed to the layout as `content`, so layouts insert it with
//! `{{{content}}}`. A layout may itself declare a `layout`, forming a chain
//! rendered innermost-first.

use crate::front_matter::{self, FrontMatterError};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Site-wide template data: config keys plus collection metadata.
pub type TemplateData = Map<String, Value>;

/// Directory holding layouts, relative to the source root.
pub const LAYOUTS_DIR: &str = "_layouts";

/// Longest allowed layout chain. Anything deeper is treated as a cycle.
pub const MAX_LAYOUT_DEPTH: usize = 16;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("template '{name}' failed to compile: {source}")]
    Compile {
        name: String,
        source: Box<handlebars::TemplateError>,
    },
    #[error("template '{name}' failed to render: {source}")]
    Render {
        name: String,
        source: handlebars::RenderError,
    },
    #[error("unknown layout '{0}'")]
    UnknownLayout(String),
    #[error("layout chain from '{0}' is nested too deeply; is there a cycle?")]
    LayoutTooDeep(String),
    #[error("layout '{name}': {source}")]
    LayoutFrontMatter {
        name: String,
        source: FrontMatterError,
    },
}

/// Which registry a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    /// HTML-escaped output, layouts available.
    Html,
    /// Verbatim output, no layouts.
    Text,
}

/// Data one render sees.
#[derive(Debug, Serialize)]
pub struct RenderContext<'a> {
    #[serde(flatten)]
    pub site: &'a TemplateData,
    pub page: &'a Map<String, Value>,
    /// Inner rendered output; only set when rendering a layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'a str>,
}

impl<'a> RenderContext<'a> {
    pub fn new(site: &'a TemplateData, page: &'a Map<String, Value>) -> Self {
        Self {
            site,
            page,
            content: None,
        }
    }
}

/// All compiled templates for one build.
pub struct TemplateSet {
    markup: Handlebars<'static>,
    text: Handlebars<'static>,
    /// Layout name → parent layout name.
    layouts: BTreeMap<String, Option<String>>,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::new()
    }
}

fn layout_template_name(layout: &str) -> String {
    format!("{LAYOUTS_DIR}/{layout}")
}

impl TemplateSet {
    pub fn new() -> Self {
        let mut text = Handlebars::new();
        text.register_escape_fn(handlebars::no_escape);
        Self {
            markup: Handlebars::new(),
            text,
            layouts: BTreeMap::new(),
        }
    }

    fn registry(&self, markup: Markup) -> &Handlebars<'static> {
        match markup {
            Markup::Html => &self.markup,
            Markup::Text => &self.text,
        }
    }

    /// Compile `source` and register it under `name`, replacing any
    /// previous template of that name.
    pub fn compile(&mut self, markup: Markup, name: &str, source: &str) -> Result<(), TemplateError> {
        let registry = match markup {
            Markup::Html => &mut self.markup,
            Markup::Text => &mut self.text,
        };
        registry
            .register_template_string(name, source)
            .map_err(|e| TemplateError::Compile {
                name: name.to_string(),
                source: Box::new(e),
            })
    }

    pub fn contains(&self, markup: Markup, name: &str) -> bool {
        self.registry(markup).has_template(name)
    }

    /// Render a compiled template against `context`.
    pub fn render<T: Serialize>(
        &self,
        markup: Markup,
        name: &str,
        context: &T,
    ) -> Result<String, TemplateError> {
        self.registry(markup)
            .render(name, context)
            .map_err(|e| TemplateError::Render {
                name: name.to_string(),
                source: e,
            })
    }

    /// Names of the loaded layouts, sorted.
    pub fn layout_names(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    /// Forget every loaded layout.
    pub fn clear_layouts(&mut self) {
        for name in std::mem::take(&mut self.layouts).into_keys() {
            self.markup.unregister_template(&layout_template_name(&name));
        }
    }

    /// Replace the loaded layouts with the files directly under `dir`.
    ///
    /// A missing directory means no layouts. Subdirectories and dotfiles are
    /// skipped. Returns the number of layouts loaded.
    pub fn load_layouts(&mut self, dir: &Path) -> Result<usize, TemplateError> {
        self.clear_layouts();
        if !dir.is_dir() {
            return Ok(0);
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if entry.file_type()?.is_file() && !name.to_string_lossy().starts_with('.') {
                paths.push(entry.path());
            }
        }
        paths.sort();

        for path in paths {
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };
            let source = fs::read_to_string(&path)?;
            let (front_matter, body) =
                front_matter::split(&source).map_err(|e| TemplateError::LayoutFrontMatter {
                    name: stem.clone(),
                    source: e,
                })?;
            self.compile(Markup::Html, &layout_template_name(&stem), body)?;
            let parent = front_matter::layout(&front_matter).map(str::to_string);
            debug!(layout = %stem, parent = ?parent, "loaded layout");
            self.layouts.insert(stem, parent);
        }
        Ok(self.layouts.len())
    }

    /// Resolve a layout reference to its loaded name.
    ///
    /// `post` and `post.html` both refer to `_layouts/post.html`.
    fn resolve_layout<'s>(&'s self, reference: &str) -> Option<(&'s str, Option<&'s str>)> {
        let lookup = |key: &str| {
            self.layouts
                .get_key_value(key)
                .map(|(name, parent)| (name.as_str(), parent.as_deref()))
        };
        lookup(reference).or_else(|| {
            Path::new(reference)
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(lookup)
        })
    }

    /// Render markup template `name`, then wrap the result in `layout` and
    /// each of its ancestors in turn.
    pub fn render_with_layout(
        &self,
        name: &str,
        layout: &str,
        site: &TemplateData,
        page: &Map<String, Value>,
    ) -> Result<String, TemplateError> {
        let mut output = self.render(Markup::Html, name, &RenderContext::new(site, page))?;

        let mut next = Some(layout);
        let mut depth = 0;
        while let Some(reference) = next {
            if depth == MAX_LAYOUT_DEPTH {
                return Err(TemplateError::LayoutTooDeep(layout.to_string()));
            }
            let (layout_name, parent) = self
                .resolve_layout(reference)
                .ok_or_else(|| TemplateError::UnknownLayout(reference.to_string()))?;
            let context = RenderContext {
                site,
                page,
                content: Some(&output),
            };
            output = self.render(Markup::Html, &layout_template_name(layout_name), &context)?;
            next = parent;
            depth += 1;
        }
        Ok(output)
    }
}
