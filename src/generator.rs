//! Collection generators.
//!
//! A generator turns one file from a collection directory into a typed
//! content item, or declines it with [`GenerateError::Ignore`]. Generators
//! are plain functions looked up by name in a [`GeneratorRegistry`] built at
//! startup:
//!
//! | Name | Accepts | Produces |
//! |---|---|---|
//! | `post` | `YYYY-MM-DD-slug.html` | [`Post`](crate::post::Post) at `YYYY/MM/DD/slug.html` |
//! | `listing` | `NNN-slug.html` | [`Listing`](crate::listing::Listing) at `/<path>/NNN/slug.html` |
//!
//! Both built-ins ignore files with other extensions, and fail on an
//! `.html`/`.htm` file whose name does not follow their convention.

use crate::config::{CollectionConfig, SiteConfig};
use crate::content::{Content, EntryInfo};
use crate::naming::NameError;
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum GenerateError {
    /// Not an error: the file is not part of the collection.
    #[error("ignored")]
    Ignore,
    #[error("bad file name: {0}")]
    Name(#[from] NameError),
    #[error("bad URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("generator '{0}' is already registered")]
    Duplicate(String),
}

/// Turns a raw collection entry into a content item.
pub type Generator = fn(&SiteConfig, &CollectionConfig, EntryInfo) -> Result<Content, GenerateError>;

/// Name-keyed generator table. One registration per name.
#[derive(Debug, Clone, Default)]
pub struct GeneratorRegistry {
    generators: BTreeMap<String, Generator>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `post` and `listing` generators.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register("post", crate::post::generate_post)?;
        registry.register("listing", crate::listing::generate_listing)?;
        Ok(registry)
    }

    pub fn register(&mut self, name: &str, generator: Generator) -> Result<(), RegistryError> {
        if self.generators.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.generators.insert(name.to_string(), generator);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Generator> {
        self.generators.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }
}

/// Placeholder origin for resolving against a relative base. Only the path
/// part of the result is kept.
const RELATIVE_ORIGIN: &str = "http://relative.invalid/";

/// Resolve `path` against `base` (RFC 3986 reference resolution).
///
/// - An empty base means `/`.
/// - An absolute base (`https://example.com/blog/`) yields an absolute URL.
/// - A relative base (`/blog/`) yields a path-only result.
///
/// ```
/// # use trowel::generator::build_url;
/// assert_eq!(build_url("https://example.com/", "2024/01/05/a.html").unwrap(),
///            "https://example.com/2024/01/05/a.html");
/// assert_eq!(build_url("", "2024/01/05/a.html").unwrap(), "/2024/01/05/a.html");
/// assert_eq!(build_url("/blog/", "a.html").unwrap(), "/blog/a.html");
/// ```
pub fn build_url(base: &str, path: &str) -> Result<String, url::ParseError> {
    let base = if base.is_empty() { "/" } else { base };
    match Url::parse(base) {
        Ok(absolute) => Ok(absolute.join(path)?.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let joined = Url::parse(RELATIVE_ORIGIN)?.join(base)?.join(path)?;
            Ok(joined[url::Position::BeforePath..].to_string())
        }
        Err(e) => Err(e),
    }
}
