use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use est_metrics::cli::Cli;
use est_metrics::core::Engine;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; reports go to stdout, logs to stderr
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(env_directives.as_deref(), cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    debug!("Starting est-metrics v{}", env!("CARGO_PKG_VERSION"));

    // Create the engine with configuration
    let engine = Engine::new(cli.config.as_deref()).await?;

    // Execute the requested command
    cli.execute(engine).await
}

/// `RUST_LOG` directives (or INFO), raised to DEBUG by `--verbose`
fn log_filter(env_directives: Option<&str>, verbose: bool) -> EnvFilter {
    let filter = env_directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    if verbose {
        filter.add_directive(LevelFilter::DEBUG.into())
    } else {
        filter
    }
}
