//! Source-to-artifact rendering.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_cache::{DocumentPaths, Fingerprint, RenderCache, write_atomic};
use pulldown_cmark::Parser;

use crate::expand::expand;
use crate::markdown::{MarkdownTransform, PulldownTransform, strip_body_wrapper};
use crate::metadata::{Metadata, keys};
use crate::normalize::normalize_html;
use crate::template::{PageValues, SiteTemplate};

/// Settings shared by every document of a site.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Site display name, substituted for `$name$`.
    pub site_name: String,
    /// Path to the page template.
    pub template_path: PathBuf,
    /// File name of document sources (e.g. `index.md`), used for child listings.
    pub source_name: String,
}

/// Error returned by [`DocumentRenderer::render`].
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Source could not be read or inspected.
    #[error("Failed to read source {}: {source}", path.display())]
    Read {
        /// Source path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Page template could not be read.
    #[error("Failed to read template {}: {source}", path.display())]
    Template {
        /// Template path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Artifact could not be written.
    #[error("Failed to write artifact {}: {source}", path.display())]
    Write {
        /// Artifact path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Fingerprint record could not be written.
    #[error("Failed to record fingerprint {}: {source}", path.display())]
    Record {
        /// Record path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

/// Renders markdown documents into final HTML pages.
///
/// The template is read on every render so that edits to it take effect on
/// the next reload without rebuilding the renderer.
pub struct DocumentRenderer {
    config: RendererConfig,
    cache: Arc<dyn RenderCache>,
    transform: Box<dyn MarkdownTransform>,
}

impl DocumentRenderer {
    /// Create a renderer using [`PulldownTransform`].
    #[must_use]
    pub fn new(config: RendererConfig, cache: Arc<dyn RenderCache>) -> Self {
        Self {
            config,
            cache,
            transform: Box::new(PulldownTransform::new()),
        }
    }

    /// Replace the markdown transform.
    #[must_use]
    pub fn with_transform<T: MarkdownTransform + 'static>(mut self, transform: T) -> Self {
        self.transform = Box::new(transform);
        self
    }

    /// Renderer settings.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Cache used to record fingerprints.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn RenderCache> {
        &self.cache
    }

    /// Render `doc.source` into `doc.artifact` and record its fingerprint.
    ///
    /// The fingerprint is taken before the source is read. If the source
    /// changes while rendering, the recorded fingerprint no longer matches
    /// and the document stays stale. The fingerprint is recorded only after
    /// the artifact has been written, so a failure at any step never leaves
    /// a fresh-looking record behind.
    pub fn render(&self, doc: &DocumentPaths) -> Result<(), RenderError> {
        let read_error = |source| RenderError::Read {
            path: doc.source.clone(),
            source,
        };
        let fingerprint = Fingerprint::of(&doc.source).map_err(read_error)?;
        let text = fs::read_to_string(&doc.source).map_err(read_error)?;

        let template =
            SiteTemplate::load(&self.config.template_path).map_err(|source| RenderError::Template {
                path: self.config.template_path.clone(),
                source,
            })?;

        let document_dir = doc.source.parent().unwrap_or_else(|| Path::new("."));
        let html = self.render_text(&text, document_dir, &template);

        write_atomic(&doc.artifact, html.as_bytes()).map_err(|source| RenderError::Write {
            path: doc.artifact.clone(),
            source,
        })?;
        self.cache
            .record(doc, &fingerprint)
            .map_err(|source| RenderError::Record {
                path: doc.record.clone(),
                source,
            })?;

        tracing::debug!(path = %doc.source.display(), "Rendered document");
        Ok(())
    }

    /// Render markdown `text` into a complete HTML page.
    ///
    /// `document_dir` is the directory the document lives in, used to list
    /// child documents.
    #[must_use]
    pub fn render_text(&self, text: &str, document_dir: &Path, template: &SiteTemplate) -> String {
        let metadata = Metadata::extract(&Parser::new(text));
        let expanded = expand(text, &metadata, document_dir, &self.config.source_name);
        let body = self.transform.to_html(&expanded);

        let page = template.render(&PageValues {
            name: &self.config.site_name,
            title: metadata.get(keys::TITLE),
            description: metadata.get(keys::DESCRIPTION),
            content: strip_body_wrapper(&body),
        });
        normalize_html(&page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_cache::{NullCache, SidecarCache};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const TEMPLATE: &str = "<!DOCTYPE html>\
<html><head><title>$title$ | $name$</title>\
<meta name=\"description\" content=\"$description$\"></head>\
<body><main>$content$</main></body></html>";

    struct Site {
        tmp: TempDir,
        renderer: DocumentRenderer,
    }

    impl Site {
        fn new(cache: Arc<dyn RenderCache>) -> Self {
            let tmp = TempDir::new().unwrap();
            let template_path = tmp.path().join("template.html");
            fs::write(&template_path, TEMPLATE).unwrap();
            let renderer = DocumentRenderer::new(
                RendererConfig {
                    site_name: "Example".to_owned(),
                    template_path,
                    source_name: "index.md".to_owned(),
                },
                cache,
            );
            Self { tmp, renderer }
        }

        fn document(&self, rel: &str, source: &str) -> DocumentPaths {
            let dir = self.tmp.path().join(rel);
            fs::create_dir_all(&dir).unwrap();
            let doc = DocumentPaths::new(
                dir.join("index.md"),
                dir.join("index.html"),
                dir.join("index.json"),
            );
            fs::write(&doc.source, source).unwrap();
            doc
        }
    }

    const HELLO: &str = "\
[metadata:title]: . \"Hello\"
[metadata:description]: . \"World\"

Hi
";

    #[test]
    fn test_render_end_to_end() {
        let cache = Arc::new(SidecarCache::new());
        let site = Site::new(Arc::clone(&cache) as Arc<dyn RenderCache>);
        let doc = site.document("", HELLO);

        site.renderer.render(&doc).unwrap();

        let html = fs::read_to_string(&doc.artifact).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Hello | Example</title>"));
        assert!(html.contains("content=\"World\""));
        assert!(html.contains("<main><p>Hi</p>\n</main>"));
        assert_eq!(
            cache.fingerprint(&doc),
            Some(Fingerprint::of(&doc.source).unwrap())
        );
        assert!(!cache.is_stale(&doc));
    }

    #[test]
    fn test_metadata_definitions_not_rendered() {
        let site = Site::new(Arc::new(NullCache));
        let doc = site.document("", HELLO);

        site.renderer.render(&doc).unwrap();

        let html = fs::read_to_string(&doc.artifact).unwrap();
        assert!(!html.contains("metadata:"));
    }

    #[test]
    fn test_directives_expanded_before_markdown() {
        let site = Site::new(Arc::new(NullCache));
        let doc = site.document(
            "",
            "\
[metadata:title]: . \"Index\"

# [template:title]

[template:dirlist]
",
        );
        site.document(
            "post",
            "\
[metadata:title]: . \"Post\"
[metadata:description]: . \"About things\"
",
        );

        site.renderer.render(&doc).unwrap();

        let html = fs::read_to_string(&doc.artifact).unwrap();
        assert!(html.contains("<h1>Index</h1>"));
        assert!(html.contains("<h2><a href=\"./post/\">Post</a></h2>"));
        assert!(html.contains("<p>About things</p>"));
    }

    #[test]
    fn test_output_is_normalized() {
        let site = Site::new(Arc::new(NullCache));
        let doc = site.document("", "<div class=box>\n\nunclosed\n");

        site.renderer.render(&doc).unwrap();

        let html = fs::read_to_string(&doc.artifact).unwrap();
        assert!(html.contains("<div class=\"box\">"));
        assert!(html.contains("</div></main>"));
    }

    #[test]
    fn test_custom_transform() {
        struct Upper;
        impl MarkdownTransform for Upper {
            fn to_html(&self, markdown: &str) -> String {
                format!("<body>{}</body>", markdown.trim().to_uppercase())
            }
        }

        let site = Site::new(Arc::new(NullCache));
        let renderer = DocumentRenderer::new(site.renderer.config().clone(), Arc::new(NullCache))
            .with_transform(Upper);
        let doc = site.document("", "shout");

        renderer.render(&doc).unwrap();

        let html = fs::read_to_string(&doc.artifact).unwrap();
        assert!(html.contains("<main>SHOUT</main>"));
    }

    #[test]
    fn test_missing_source_is_read_error() {
        let site = Site::new(Arc::new(SidecarCache::new()));
        let doc = site.document("", HELLO);
        fs::remove_file(&doc.source).unwrap();

        let err = site.renderer.render(&doc).unwrap_err();

        assert!(matches!(err, RenderError::Read { .. }));
        assert!(!doc.artifact.exists());
        assert!(!doc.record.exists());
    }

    #[test]
    fn test_missing_template_is_template_error() {
        let cache = Arc::new(SidecarCache::new());
        let site = Site::new(Arc::clone(&cache) as Arc<dyn RenderCache>);
        let doc = site.document("", HELLO);
        fs::remove_file(site.tmp.path().join("template.html")).unwrap();

        let err = site.renderer.render(&doc).unwrap_err();

        assert!(matches!(err, RenderError::Template { .. }));
        assert!(cache.is_stale(&doc));
    }

    #[test]
    fn test_failed_render_keeps_previous_artifact() {
        let cache = Arc::new(SidecarCache::new());
        let site = Site::new(Arc::clone(&cache) as Arc<dyn RenderCache>);
        let doc = site.document("", HELLO);
        site.renderer.render(&doc).unwrap();
        let previous = fs::read_to_string(&doc.artifact).unwrap();

        fs::write(&doc.source, "changed").unwrap();
        fs::remove_file(site.tmp.path().join("template.html")).unwrap();
        assert!(site.renderer.render(&doc).is_err());

        assert_eq!(fs::read_to_string(&doc.artifact).unwrap(), previous);
        assert!(cache.is_stale(&doc));
    }

    #[test]
    fn test_template_edits_apply_on_next_render() {
        let site = Site::new(Arc::new(NullCache));
        let doc = site.document("", HELLO);
        site.renderer.render(&doc).unwrap();

        fs::write(
            site.tmp.path().join("template.html"),
            "<article>$title$</article>",
        )
        .unwrap();
        site.renderer.render(&doc).unwrap();

        let html = fs::read_to_string(&doc.artifact).unwrap();
        assert!(html.contains("<article>Hello</article>"));
    }
}
