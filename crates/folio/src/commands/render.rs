//! `folio render` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_site::{ContentResolver, SiteOptions};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render without writing fingerprint records.
    #[arg(long)]
    no_cache: bool,
}

impl RenderArgs {
    /// Render every document of every configured site once.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, a site is misconfigured, or
    /// any document fails to render.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            cache_enabled: self.no_cache.then_some(false),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let mut failed = 0;
        for site in &config.sites {
            let options =
                SiteOptions::new(&site.root, site.display_name()).with_cache(site.cache);
            let summary = ContentResolver::new(options)?.reload();

            output.site(&site.name, &format!("{} rendered", summary.rendered));
            if summary.failed > 0 {
                output.warning(&format!("  {} failed", summary.failed));
            }
            failed += summary.failed;
        }

        if failed > 0 {
            return Err(CliError::Render { failed });
        }
        output.success("Done");
        Ok(())
    }
}
