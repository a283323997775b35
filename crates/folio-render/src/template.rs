//! Site-wide page template.
//!
//! The template is an HTML file with four placeholders:
//!
//! | Placeholder     | Value                              | Escaped |
//! |-----------------|------------------------------------|---------|
//! | `$name$`        | Site display name                  | yes     |
//! | `$title$`       | Document title                     | yes     |
//! | `$description$` | Document description               | yes     |
//! | `$content$`     | Rendered document HTML             | no      |
//!
//! Escaped values are safe inside both text and double-quoted attributes
//! (`<meta name="description" content="$description$">`).

use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(name|title|description|content)\$").expect("invalid placeholder regex")
});

/// Values substituted into a [`SiteTemplate`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PageValues<'a> {
    /// Site display name.
    pub name: &'a str,
    /// Document title.
    pub title: &'a str,
    /// Document description.
    pub description: &'a str,
    /// Rendered HTML body.
    pub content: &'a str,
}

/// Page template shared by every document of a site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteTemplate {
    source: String,
}

impl SiteTemplate {
    /// Read a template from disk.
    pub fn load(path: &Path) -> io::Result<Self> {
        fs::read_to_string(path).map(Self::from_string)
    }

    /// Create a template from its source text.
    #[must_use]
    pub fn from_string(source: String) -> Self {
        Self { source }
    }

    /// Template source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute all placeholders in a single pass.
    ///
    /// Placeholder text inside a substituted value is not expanded again.
    #[must_use]
    pub fn render(&self, values: &PageValues<'_>) -> String {
        let name = html_escape::encode_quoted_attribute(values.name);
        let title = html_escape::encode_quoted_attribute(values.title);
        let description = html_escape::encode_quoted_attribute(values.description);

        PLACEHOLDER_PATTERN
            .replace_all(&self.source, |caps: &Captures<'_>| match &caps[1] {
                "name" => &*name,
                "title" => &*title,
                "description" => &*description,
                _ => values.content,
            })
            .into_owned()
    }
}
