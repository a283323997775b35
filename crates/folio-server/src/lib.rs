//! HTTP server for Folio sites.
//!
//! Serves each configured site with axum:
//! - `GET /` and `GET /{*path}` resolve through the site's content resolver
//! - Missing documents get the site's 404 page, failures its 500 page
//! - Responses are gzip-compressed and carry security and caching headers
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (folio-server)
//!                        │
//!                        ├─► spawn_blocking ──► ContentResolver::from_path
//!                        │                           │
//!                        │                           └─► render if stale
//!                        │
//!                        └─► ServeFile (artifact or static asset)
//!
//! ChangeWatcher thread ──► ContentResolver::reload (whole site)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use folio_config::SiteConfig;
use folio_site::{ContentResolver, SiteOptions};
use tokio::task::JoinSet;

pub use app::create_router;
pub use error::ServerError;

/// Run one site until Ctrl-C.
///
/// Renders the whole site, starts the change watcher, then serves on the
/// site's address. The watcher is stopped after the server shuts down.
///
/// # Errors
///
/// Returns an error if the site is misconfigured, the watcher cannot start,
/// or the address cannot be bound.
pub async fn run_site(site: SiteConfig) -> Result<(), ServerError> {
    let options = SiteOptions::new(&site.root, site.display_name()).with_cache(site.cache);
    let resolver = Arc::new(ContentResolver::new(options)?);

    let reloading = Arc::clone(&resolver);
    let summary = tokio::task::spawn_blocking(move || reloading.reload()).await?;
    if summary.failed > 0 {
        tracing::warn!(site = %site.name, failed = summary.failed, "Some documents failed to render");
    }
    resolver.start_watcher()?;

    let app = create_router(Arc::clone(&resolver), site.max_age);
    let served = serve(app, &site).await;

    resolver.stop_watcher();
    served
}

async fn serve(app: axum::Router, site: &SiteConfig) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(site.address()).await?;
    tracing::info!(site = %site.name, address = %listener.local_addr()?, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Run every site concurrently until Ctrl-C.
///
/// The first site to fail is reported; the others keep running until they
/// are shut down.
///
/// # Errors
///
/// Returns the first error any site returned.
pub async fn run_sites(sites: Vec<SiteConfig>) -> Result<(), ServerError> {
    let mut tasks = JoinSet::new();
    for site in sites {
        tasks.spawn(async move {
            let name = site.name.clone();
            run_site(site).await.inspect_err(|e| {
                tracing::error!(site = %name, error = %e, "Site stopped");
            })
        });
    }

    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        let error = match joined {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => e,
            Err(e) => ServerError::from(e),
        };
        first_error.get_or_insert(error);
    }
    first_error.map_or(Ok(()), Err)
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
