//! Folio CLI - Markdown content engine.
//!
//! Provides commands for:
//! - `serve`: Serve every configured site
//! - `render`: Render every document of every site once
//! - `nginx`: Generate nginx reverse-proxy configuration

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{NginxArgs, RenderArgs, ServeArgs};
use error::CliError;
use output::Output;

/// Folio - Markdown content engine.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve every configured site.
    Serve(ServeArgs),
    /// Render every document once and exit.
    Render(RenderArgs),
    /// Print nginx reverse-proxy configuration for every site.
    Nginx(NginxArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Serve(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Serve(args) => tokio::runtime::Runtime::new()
            .map_err(CliError::from)
            .and_then(|rt| rt.block_on(args.execute())),
        Commands::Render(args) => args.execute(),
        Commands::Nginx(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
