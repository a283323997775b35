//! CLI error types.

use folio_config::ConfigError;
use folio_server::ServerError;
use folio_site::ContentError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Content(#[from] ContentError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{failed} document(s) failed to render")]
    Render { failed: usize },
}
