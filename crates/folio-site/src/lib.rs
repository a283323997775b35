//! Content resolution for Folio sites.
//!
//! A site is a directory tree of markdown documents. Each directory holding a
//! source file (`index.md`) is a document; its rendered artifact and
//! fingerprint record live next to it. [`ContentResolver`] maps request paths
//! onto that tree:
//!
//! - Paths are sandboxed to the content root ([`sandbox`])
//! - Stale documents are re-rendered on demand, one render per document at a time
//! - Reserved files (sources, artifacts, records, template, status pages) are
//!   never served by path
//! - Status pages are resolved by code through [`ContentResolver::from_status`]
//!
//! # Example
//!
//! ```no_run
//! use folio_site::{ContentResolver, SiteOptions};
//!
//! let resolver = ContentResolver::new(SiteOptions::new("site", "Example"))?;
//! resolver.reload();
//! resolver.start_watcher()?;
//! let artifact = resolver.from_path("/guide/")?;
//! # Ok::<(), folio_site::ContentError>(())
//! ```

mod layout;
mod locks;
mod resolver;
pub mod sandbox;

pub use layout::{ReservedNames, SiteLayout};
pub use resolver::{ContentError, ContentResolver, ReloadSummary, SiteOptions};
pub use sandbox::SandboxError;
