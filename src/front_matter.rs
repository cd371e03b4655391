//! YAML front matter.
//!
//! A document may open with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Hello
//! layout: post
//! ---
//! <p>{{page.title}}</p>
//! ```
//!
//! The fences must be the whole line (trailing `\r` tolerated). Anything
//! else at the top of the file means there is no front matter, and the
//! document still gets an empty mapping.

use serde_json::{Map, Value};
use thiserror::Error;

/// Front matter values, keyed by name.
pub type FrontMatter = Map<String, Value>;

const FENCE: &str = "---";

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("invalid YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("front matter must be a mapping, found {0}")]
    NotMapping(&'static str),
    #[error("front matter block is not closed by a `---` line")]
    Unterminated,
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == FENCE
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

fn parse_block(yaml: &str) -> Result<FrontMatter, FrontMatterError> {
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::new());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(FrontMatter::new()),
        other => Err(FrontMatterError::NotMapping(kind(&other))),
    }
}

/// Split `source` into its front matter and the remaining body.
///
/// - `"---\ntitle: x\n---\nbody"` → `{title: x}`, `"body"`
/// - `"body"` → `{}`, `"body"`
pub fn split(source: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let mut lines = source.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok((FrontMatter::new(), source));
    };
    if !is_fence(first) {
        return Ok((FrontMatter::new(), source));
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        let end = offset + line.len();
        if is_fence(line) {
            let front_matter = parse_block(&source[yaml_start..offset])?;
            return Ok((front_matter, &source[end..]));
        }
        offset = end;
    }
    Err(FrontMatterError::Unterminated)
}

/// The `layout` a front matter block asks for, if any.
///
/// Only a string counts, and the string `nil` turns layouts off.
pub fn layout(front_matter: &FrontMatter) -> Option<&str> {
    front_matter
        .get("layout")
        .and_then(Value::as_str)
        .filter(|name| *name != "nil")
}
