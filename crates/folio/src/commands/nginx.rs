//! `folio nginx` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use folio_config::Config;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the nginx command.
#[derive(Args)]
pub(crate) struct NginxArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl NginxArgs {
    /// Print or write the nginx reverse-proxy configuration for every site.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the output cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let nginx = config.to_nginx_config();

        if let Some(path) = &self.output {
            std::fs::write(path, &nginx)?;
            Output::new().success(&format!("Wrote {}", path.display()));
        } else {
            std::io::stdout().lock().write_all(nginx.as_bytes())?;
        }
        Ok(())
    }
}
