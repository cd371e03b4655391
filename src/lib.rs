//! # Trowel
//!
//! A static site generator for plain pages, dated posts and image-backed
//! listings. The source directory is the site: every file is copied or
//! rendered to the same relative path in the output, and underscore
//! directories hold what is not published directly (config, layouts,
//! collections).
//!
//! # Build Pipeline
//!
//! ```text
//! 1. Read     _config.yml, walk, layouts, front matter, collections
//! 2. Write    every item into a fresh _tmpsite_* staging directory
//! 3. Publish  swap staging into place, remove stale staging
//! ```
//!
//! Reading happens entirely before writing, so every template can see every
//! collection: an `index.html` can loop over `posts` regardless of where it
//! sits in the tree. Writing never touches the live output, so a failed
//! build leaves the previous site in place.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`site`] | Build orchestration, [`site::build`] and [`site::check`] |
//! | [`config`] | `_config.yml` loading, merging over stock defaults, validation |
//! | [`walk`] | Top-level source walk, skipping `.` and `_` entries |
//! | [`content`] | The closed set of content kinds and their read/write behaviour |
//! | [`document`] | Template-backed documents: front matter, compile, render |
//! | [`front_matter`] | Leading `---` YAML block parsing |
//! | [`template`] | Handlebars registries and `_layouts/` resolution |
//! | [`collection`] | Underscore-directory collections: ordering and prev/next links |
//! | [`generator`] | Named constructors turning collection files into content |
//! | [`post`] | `YYYY-MM-DD-slug` posts |
//! | [`listing`] | `NNN-slug` listings with a companion image |
//! | [`naming`] | Filename conventions for posts and listings |
//! | [`imaging`] | Image decode/resize/encode behind the [`imaging::ImageBackend`] trait |
//! | [`cache`] | Derivative cache paths and mtime freshness |
//! | [`publish`] | Staging directories and the atomic output swap |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Two Escaping Modes
//!
//! HTML documents render with HTML escaping; `.xml` and `.css` render with
//! none, so feeds and stylesheets come out as written. Layouts are HTML only.
//!
//! ## Render Context Per Call
//!
//! Each render gets its own context built from the site data plus the
//! current `page`. Nothing is stashed in shared data between renders, so
//! rendering a document twice gives the same output.
//!
//! ## Generators Are Values
//!
//! Collections look up their generator in a [`generator::GeneratorRegistry`]
//! passed into the build. There is no global registration; a registry with
//! the built-in `post` and `listing` generators comes from
//! [`generator::GeneratorRegistry::with_builtins`].

pub mod cache;
pub mod collection;
pub mod config;
pub mod content;
pub mod document;
pub mod front_matter;
pub mod generator;
pub mod imaging;
pub mod listing;
pub mod naming;
pub mod output;
pub mod post;
pub mod publish;
pub mod site;
pub mod template;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;
