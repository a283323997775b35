//! HTML normalization.

use scraper::Html;

/// Parse `html` as a full document and serialize it back.
///
/// Runs the HTML5 tree-building algorithm, so the output always has
/// `<html>`, `<head>` and `<body>` elements, unclosed elements are closed,
/// and attribute values are double-quoted. A doctype present in the input
/// is kept.
#[must_use]
pub fn normalize_html(html: &str) -> String {
    Html::parse_document(html).html()
}
