//! Markdown to HTML transform.

use pulldown_cmark::{Options, Parser, html};

/// Converts markdown text to an HTML fragment.
///
/// The renderer treats the transform as a black box. Implementations must be
/// safe to share between render threads.
pub trait MarkdownTransform: Send + Sync {
    /// Convert `markdown` to HTML.
    fn to_html(&self, markdown: &str) -> String;
}

/// [`MarkdownTransform`] backed by `pulldown-cmark`.
#[derive(Clone, Copy, Debug)]
pub struct PulldownTransform {
    gfm: bool,
}

impl PulldownTransform {
    /// Create a transform with GitHub Flavored Markdown extensions enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown extensions.
    ///
    /// When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    /// - Footnotes (`[^1]`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Parser options for the current configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES
        } else {
            Options::empty()
        }
    }
}

impl Default for PulldownTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownTransform for PulldownTransform {
    fn to_html(&self, markdown: &str) -> String {
        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, Parser::new_ext(markdown, self.parser_options()));
        output
    }
}

/// Remove a `<body>...</body>` wrapper around a transform's output.
///
/// Transforms that emit a full body element would otherwise nest a second
/// `<body>` inside the page template. Output without a wrapper is returned
/// unchanged.
#[must_use]
pub fn strip_body_wrapper(html: &str) -> &str {
    let trimmed = html.trim();
    trimmed
        .strip_prefix("<body>")
        .and_then(|rest| rest.strip_suffix("</body>"))
        .unwrap_or(html)
}
