//! `folio serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_server::run_sites;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind every site to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config, single-site configs only).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output (request and render logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable the render cache (re-render on every request).
    #[arg(long)]
    no_cache: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or any site fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            cache_enabled: self.no_cache.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), sites = config.sites.len(), "Loaded configuration");
        }

        for site in &config.sites {
            output.site(
                &site.name,
                &format!("http://{} from {}", site.address(), site.root.display()),
            );
            if !site.cache {
                output.info("  Cache: disabled");
            }
            tracing::debug!(site = %site.name, cache = site.cache, max_age = site.max_age, "Site configured");
        }

        run_sites(config.sites).await?;
        Ok(())
    }
}
