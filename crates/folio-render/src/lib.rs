//! Document rendering for Folio.
//!
//! Turns a markdown source plus the shared site template into a final HTML page:
//!
//! ```text
//! index.md ──► Metadata::extract ──► expand directives ──► MarkdownTransform
//!                                                               │
//!        index.html ◄── normalize_html ◄── SiteTemplate::render ◄┘
//! ```
//!
//! # Metadata
//!
//! Documents declare metadata with reference-style link definitions whose
//! label starts with `metadata:`. The link title is the value; the destination
//! is ignored. Definitions produce no output in the rendered page.
//!
//! ```markdown
//! [metadata:title]: . "Release notes"
//! [metadata:description]: . "What changed in 2.0"
//! [metadata:create-timestamp]: . "2024-03-01T09:00:00Z"
//! [metadata:update-timestamp]: . "2024-03-02T12:30:00Z"
//! ```
//!
//! # Directives
//!
//! `[template:title]`, `[template:description]`, `[template:timestamp]` and
//! `[template:dirlist]` are replaced before the markdown transform. See
//! [`expand`] for details.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use folio_cache::{DocumentPaths, SidecarCache};
//! use folio_render::{DocumentRenderer, RendererConfig};
//!
//! let renderer = DocumentRenderer::new(
//!     RendererConfig {
//!         site_name: "Example".to_owned(),
//!         template_path: PathBuf::from("site/template.html"),
//!         source_name: "index.md".to_owned(),
//!     },
//!     Arc::new(SidecarCache::new()),
//! );
//! let doc = DocumentPaths::new(
//!     PathBuf::from("site/guide/index.md"),
//!     PathBuf::from("site/guide/index.html"),
//!     PathBuf::from("site/guide/index.json"),
//! );
//! renderer.render(&doc)?;
//! # Ok::<(), folio_render::RenderError>(())
//! ```

mod expand;
mod markdown;
mod metadata;
mod normalize;
mod renderer;
mod template;
mod timestamp;

pub use expand::{DESCRIPTION_TOKEN, DIRLIST_TOKEN, TIMESTAMP_TOKEN, TITLE_TOKEN, child_listing, expand};
pub use markdown::{MarkdownTransform, PulldownTransform, strip_body_wrapper};
pub use metadata::{METADATA_PREFIX, Metadata, keys};
pub use normalize::normalize_html;
pub use renderer::{DocumentRenderer, RenderError, RendererConfig};
pub use template::{PageValues, SiteTemplate};
pub use timestamp::{parse_timestamp, time_markup};
