//! Metadata declared inside markdown documents.
//!
//! A declaration is a reference-style link definition whose label starts
//! with [`METADATA_PREFIX`]:
//!
//! ```markdown
//! [metadata:title]: . "Hello"
//! ```
//!
//! The key is the rest of the label (`title`), the value is the link title
//! (`Hello`). The destination is required by CommonMark syntax but ignored.
//! Definitions without a title, or with an empty key, are skipped.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use pulldown_cmark::Parser;

use crate::timestamp::parse_timestamp;

/// Label prefix that marks a link definition as a metadata declaration.
pub const METADATA_PREFIX: &str = "metadata:";

/// Well-known metadata keys.
pub mod keys {
    /// Page title.
    pub const TITLE: &str = "title";
    /// Page description.
    pub const DESCRIPTION: &str = "description";
    /// Creation timestamp (ISO-8601).
    pub const CREATE_TIMESTAMP: &str = "create-timestamp";
    /// Last update timestamp (ISO-8601).
    pub const UPDATE_TIMESTAMP: &str = "update-timestamp";
}

/// Key/value metadata extracted from a document.
///
/// Lookups of missing keys return an empty string rather than failing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

impl Metadata {
    /// Extract metadata from the link definitions collected by `parser`.
    ///
    /// Only the parser's reference definition table is read, so the event
    /// stream does not need to be consumed.
    #[must_use]
    pub fn extract(parser: &Parser<'_>) -> Self {
        let entries = parser
            .reference_definitions()
            .iter()
            .filter_map(|(label, def)| {
                let key = label.strip_prefix(METADATA_PREFIX)?.trim();
                let value = def.title.as_ref()?;
                (!key.is_empty()).then(|| (key.to_owned(), value.to_string()))
            })
            .collect();
        Self { entries }
    }

    /// Parse `text` and extract its metadata.
    #[must_use]
    pub fn from_markdown(text: &str) -> Self {
        Self::extract(&Parser::new(text))
    }

    /// Value for `key`, or an empty string if absent.
    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.entries.get(key).map_or("", String::as_str)
    }

    /// Parsed timestamp for `key`.
    ///
    /// Returns `None` if the key is absent or the value is not a valid
    /// ISO-8601 timestamp.
    #[must_use]
    pub fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        parse_timestamp(self.get(key))
    }

    /// Iterate over all entries, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no metadata was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extracts_declared_values() {
        let text = "\
[metadata:title]: . \"Hello\"
[metadata:description]: . \"World\"

Hi
";
        let meta = Metadata::from_markdown(text);

        assert_eq!(meta.get(keys::TITLE), "Hello");
        assert_eq!(meta.get(keys::DESCRIPTION), "World");
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn test_missing_key_is_empty() {
        let meta = Metadata::from_markdown("# Just a heading\n");

        assert!(meta.is_empty());
        assert_eq!(meta.get(keys::TITLE), "");
    }

    #[test]
    fn test_destination_is_ignored() {
        let text = "[metadata:title]: https://example.com/whatever \"Value\"\n";
        let meta = Metadata::from_markdown(text);

        assert_eq!(meta.get(keys::TITLE), "Value");
    }

    #[test]
    fn test_alternative_title_delimiters() {
        let text = "\
[metadata:a]: . 'single'
[metadata:b]: . (parens)
";
        let meta = Metadata::from_markdown(text);

        assert_eq!(meta.get("a"), "single");
        assert_eq!(meta.get("b"), "parens");
    }

    #[test]
    fn test_arbitrary_keys_are_kept() {
        let meta = Metadata::from_markdown("[metadata:author]: . \"Ada\"\n");

        assert_eq!(meta.iter().collect::<Vec<_>>(), vec![("author", "Ada")]);
    }

    #[test]
    fn test_skips_definitions_without_prefix() {
        let text = "\
[link]: https://example.com \"Example\"
[meta:title]: . \"Wrong prefix\"
";
        let meta = Metadata::from_markdown(text);

        assert!(meta.is_empty());
    }

    #[test]
    fn test_skips_definition_without_title() {
        let meta = Metadata::from_markdown("[metadata:title]: .\n");

        assert_eq!(meta.get(keys::TITLE), "");
        assert!(meta.is_empty());
    }

    #[test]
    fn test_skips_empty_key() {
        let meta = Metadata::from_markdown("[metadata:]: . \"orphan\"\n");

        assert!(meta.is_empty());
    }

    #[test]
    fn test_first_definition_wins() {
        let text = "\
[metadata:title]: . \"First\"
[metadata:title]: . \"Second\"
";
        let meta = Metadata::from_markdown(text);

        assert_eq!(meta.get(keys::TITLE), "First");
    }

    #[test]
    fn test_extract_from_existing_parser() {
        let text = "[metadata:title]: . \"Parsed\"\n\nBody\n";
        let parser = Parser::new(text);

        assert_eq!(Metadata::extract(&parser).get(keys::TITLE), "Parsed");
    }

    #[test]
    fn test_timestamp_parsing() {
        let text = "\
[metadata:create-timestamp]: . \"2024-03-01T09:00:00Z\"
[metadata:update-timestamp]: . \"not a date\"
";
        let meta = Metadata::from_markdown(text);

        assert_eq!(
            meta.timestamp(keys::CREATE_TIMESTAMP),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(meta.timestamp(keys::UPDATE_TIMESTAMP), None);
        assert_eq!(meta.timestamp("missing"), None);
    }
}
