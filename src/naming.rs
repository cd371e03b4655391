//! Filename parsing for the two collection naming conventions.
//!
//! Collection entries encode their ordering key in the file stem:
//!
//! - **Posts** use a calendar date: `2024-01-05-hello` → date 2024-01-05, slug `hello`
//! - **Listings** use a numeric id: `042-my-shot` → id 42, slug `my-shot`
//!
//! Both parsers work on the stem only (no extension). A stem that does not
//! match its pattern is malformed input, not something to skip: deciding
//! which files belong to a collection is the generator's job, based on the
//! extension, before it ever gets here.
//!
//! ## Slugs
//!
//! A slug is one or more of `[0-9A-Za-z_-]`. Dashes are preserved verbatim,
//! since the slug becomes part of the output URL.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static POST_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})-([0-9A-Za-z_\-]+)$")
        .expect("post name pattern must compile")
});

static LISTING_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,10})-([0-9A-Za-z_\-]+)$")
        .expect("listing name pattern must compile")
});

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NameError {
    #[error("'{0}' does not match YYYY-MM-DD-slug")]
    BadPostName(String),
    #[error("'{0}' does not name a real calendar date")]
    BadDate(String),
    #[error("'{0}' does not match NNN-slug")]
    BadListingName(String),
}

/// Result of parsing a post stem like `2024-01-05-hello`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostName {
    pub date: NaiveDate,
    pub slug: String,
}

impl PostName {
    /// `YYYY-MM-DD`, zero padded.
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Output path relative to the site root: `YYYY/MM/DD/slug.html`.
    pub fn output_path(&self) -> String {
        format!("{}/{}.html", self.date.format("%Y/%m/%d"), self.slug)
    }

    /// Stable syndication key: `YYYY-MM-DD-slug`.
    pub fn atom_key(&self) -> String {
        format!("{}-{}", self.date_string(), self.slug)
    }

    /// Midnight UTC in `YYYY-MM-DDTHH:MM:SS+00:00` form, for feeds.
    pub fn xml_date(&self) -> String {
        self.date.format("%Y-%m-%dT00:00:00+00:00").to_string()
    }
}

/// Result of parsing a listing stem like `042-my-shot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingName {
    pub id: u64,
    pub slug: String,
}

impl ListingName {
    /// Directory-style path below the collection prefix: `<path>/<id>/<slug>`.
    ///
    /// The id is printed without leading zeros, so `042-x` and `42-x` map to
    /// the same location.
    pub fn stem_under(&self, prefix: &str) -> String {
        format!("/{}/{}/{}", prefix.trim_matches('/'), self.id, self.slug)
    }
}

/// Parse a post stem following the `YYYY-MM-DD-slug` convention.
///
/// - `"2024-01-05-hello"` → 2024-01-05, slug "hello"
/// - `"2024-13-99-x"` → [`NameError::BadDate`] (shape matches, date does not)
/// - `"hello"` → [`NameError::BadPostName`]
pub fn parse_post_name(stem: &str) -> Result<PostName, NameError> {
    let caps = POST_NAME
        .captures(stem)
        .ok_or_else(|| NameError::BadPostName(stem.to_string()))?;

    let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());
    let date = NaiveDate::parse_from_str(
        &format!("{}-{}-{}", field(1), field(2), field(3)),
        "%Y-%m-%d",
    )
    .map_err(|_| NameError::BadDate(stem.to_string()))?;

    Ok(PostName {
        date,
        slug: field(4).to_string(),
    })
}

/// Parse a listing stem following the `NNN-slug` convention (1–10 digits).
///
/// - `"42-my-shot"` → id 42, slug "my-shot"
/// - `"007-bond"` → id 7, slug "bond"
/// - `"12345678901-x"` → [`NameError::BadListingName`] (too many digits)
pub fn parse_listing_name(stem: &str) -> Result<ListingName, NameError> {
    let caps = LISTING_NAME
        .captures(stem)
        .ok_or_else(|| NameError::BadListingName(stem.to_string()))?;

    let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());
    // Ten decimal digits always fit in a u64.
    let id = field(1)
        .parse::<u64>()
        .map_err(|_| NameError::BadListingName(stem.to_string()))?;

    Ok(ListingName {
        id,
        slug: field(2).to_string(),
    })
}
