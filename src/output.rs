//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Collections
//!     posts: 12 items
//!     gallery: 40 items
//! Images: 38 cached, 2 encoded (40 total)
//! Wrote 55 documents, 3 directories, 9 files (2 layouts)
//! Removed 1 stale staging directory
//! Published to _site
//! ```
//!
//! ## Check
//!
//! ```text
//! Collections
//!     posts: 12 items
//! OK: 14 items, 2 layouts
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. Logging goes to stderr
//! through `tracing` and never mixes with these lines.

use crate::site::{BuildReport, CheckReport};

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 item`, `2 items`.
fn plural(count: usize, noun: &str) -> String {
    counted(count, noun, &format!("{noun}s"))
}

fn counted(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

fn collection_lines(collections: &[(String, usize)]) -> Vec<String> {
    if collections.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Collections".to_string()];
    for (name, count) in collections {
        lines.push(format!("{}{}: {}", indent(1), name, plural(*count, "item")));
    }
    lines
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = collection_lines(&report.collections);

    if report.images.total() > 0 {
        lines.push(format!("Images: {}", report.images));
    }

    lines.push(format!(
        "Wrote {}, {}, {} ({})",
        plural(report.documents, "document"),
        counted(report.directories, "directory", "directories"),
        plural(report.files, "file"),
        plural(report.layouts, "layout"),
    ));

    if report.stale_removed > 0 {
        lines.push(format!(
            "Removed {}",
            counted(
                report.stale_removed,
                "stale staging directory",
                "stale staging directories"
            )
        ));
    }

    lines.push(format!("Published to {}", report.output.display()));
    lines
}

/// Print the build report to stdout.
pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_report(report: &CheckReport) -> Vec<String> {
    let mut lines = collection_lines(&report.collections);
    let collected: usize = report.collections.iter().map(|(_, n)| n).sum();
    lines.push(format!(
        "OK: {}, {}",
        plural(report.content + collected, "item"),
        plural(report.layouts, "layout")
    ));
    lines
}

/// Print the check report to stdout.
pub fn print_check_report(report: &CheckReport) {
    for line in format_check_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
