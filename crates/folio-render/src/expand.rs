//! Inline template directives.
//!
//! Directives are bracketed tokens in the markdown source that are replaced
//! before the markdown transform runs:
//!
//! | Token                    | Replacement                                  |
//! |--------------------------|----------------------------------------------|
//! | `[template:title]`       | `title` metadata value                       |
//! | `[template:description]` | `description` metadata value                 |
//! | `[template:timestamp]`   | `<time>` markup, see [`time_markup`]         |
//! | `[template:dirlist]`     | Listing of child documents, see [`child_listing`] |
//!
//! Replacement happens in a single pass, so directive text that appears inside
//! a replacement value is left alone.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};

use crate::metadata::{Metadata, keys};
use crate::timestamp::time_markup;

/// Replaced by the document title.
pub const TITLE_TOKEN: &str = "[template:title]";
/// Replaced by the document description.
pub const DESCRIPTION_TOKEN: &str = "[template:description]";
/// Replaced by the creation/update `<time>` markup.
pub const TIMESTAMP_TOKEN: &str = "[template:timestamp]";
/// Replaced by a listing of child documents.
pub const DIRLIST_TOKEN: &str = "[template:dirlist]";

static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[template:(title|description|timestamp|dirlist)\]")
        .expect("invalid directive regex")
});

/// Replace every directive token in `raw`.
///
/// `metadata` must be extracted from `raw` itself. `document_dir` is the
/// directory holding the document; its immediate subdirectories containing
/// `source_name` are listed for `[template:dirlist]`. The listing is only
/// built when the token is present.
#[must_use]
pub fn expand(raw: &str, metadata: &Metadata, document_dir: &Path, source_name: &str) -> String {
    if !DIRECTIVE_PATTERN.is_match(raw) {
        return raw.to_owned();
    }

    let timestamp = raw
        .contains(TIMESTAMP_TOKEN)
        .then(|| timestamp_markup(metadata))
        .unwrap_or_default();
    let listing = raw
        .contains(DIRLIST_TOKEN)
        .then(|| child_listing(document_dir, source_name))
        .unwrap_or_default();

    DIRECTIVE_PATTERN
        .replace_all(raw, |caps: &Captures<'_>| match &caps[1] {
            "title" => metadata.get(keys::TITLE),
            "description" => metadata.get(keys::DESCRIPTION),
            "timestamp" => timestamp.as_str(),
            _ => listing.as_str(),
        })
        .into_owned()
}

/// `<time>` markup for a document, or empty if either timestamp is missing.
fn timestamp_markup(metadata: &Metadata) -> String {
    match (
        metadata.timestamp(keys::CREATE_TIMESTAMP),
        metadata.timestamp(keys::UPDATE_TIMESTAMP),
    ) {
        (Some(created), Some(updated)) => time_markup(created, updated),
        _ => String::new(),
    }
}

/// One child document in a listing.
struct ListingEntry {
    name: String,
    created: Option<DateTime<Utc>>,
    markdown: String,
}

/// Build a markdown listing of the child documents under `dir`.
///
/// Each immediate subdirectory containing `source_name` contributes an entry
/// made of a level-2 heading linking to it (if it has a title), its `<time>`
/// markup (if both timestamps parse) and its description (if non-empty).
/// Parts are separated by blank lines and every entry ends with one.
///
/// Entries are ordered newest first by creation timestamp; entries without
/// one come last. Ties are broken by directory name.
///
/// Unreadable children are skipped with a warning.
#[must_use]
pub fn child_listing(dir: &Path, source_name: &str) -> String {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "Failed to list child documents");
            return String::new();
        }
    };

    let mut children: Vec<ListingEntry> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|entry| {
            let source = entry.path().join(source_name);
            if !source.is_file() {
                return None;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match fs::read_to_string(&source) {
                Ok(text) => Some(listing_entry(name, &Metadata::from_markdown(&text))),
                Err(e) => {
                    tracing::warn!(path = %source.display(), error = %e, "Skipping unreadable child document");
                    None
                }
            }
        })
        .collect();

    children.sort_by(|a, b| match (a.created, b.created) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });

    children.into_iter().map(|child| child.markdown).collect()
}

fn listing_entry(name: String, metadata: &Metadata) -> ListingEntry {
    let mut parts = Vec::with_capacity(3);

    let title = metadata.get(keys::TITLE);
    if !title.is_empty() {
        parts.push(format!("## [{title}]({})", child_href(&name)));
    }
    let timestamp = timestamp_markup(metadata);
    if !timestamp.is_empty() {
        parts.push(timestamp);
    }
    let description = metadata.get(keys::DESCRIPTION);
    if !description.is_empty() {
        parts.push(description.to_owned());
    }

    let mut markdown = parts.join("\n\n");
    markdown.push_str("\n\n");

    ListingEntry {
        created: metadata.timestamp(keys::CREATE_TIMESTAMP),
        name,
        markdown,
    }
}

/// Relative link destination for a child directory.
///
/// Names that would break a bare markdown destination are wrapped in `<...>`.
fn child_href(name: &str) -> String {
    if name.contains(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>')) {
        format!("<./{name}/>")
    } else {
        format!("./{name}/")
    }
}
