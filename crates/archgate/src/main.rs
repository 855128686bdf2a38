//! Archgate CLI binary.

use anyhow::Result;
use archgate::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the archgate CLI.
///
/// Uses tokio's current_thread runtime: every command is a short sequence of
/// file reads and at most one journal append.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=archgate=debug,archgate_jsonl=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("archgate=info,archgate_jsonl=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting archgate CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Archgate CLI completed successfully");
    Ok(())
}
