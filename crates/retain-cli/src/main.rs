use anyhow::Context;
use clap::Parser;
use retain_core::{RetainConfig, ReviewService};

mod cli;
mod commands;
mod feedback;
mod session;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("retain error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();
    init_tracing(cli.verbose)?;

    let config = load_config(&cli)?;
    let service = ReviewService::open(&config).with_context(|| {
        format!(
            "failed to open question database {}",
            config.database_path.display()
        )
    })?;

    commands::dispatch(cli.command, &service, &cli.tenant, &config).await
}

fn load_config(cli: &cli::Cli) -> anyhow::Result<RetainConfig> {
    let config = match &cli.config {
        Some(path) => RetainConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RetainConfig::default(),
    };
    let mut config = config.with_env_overrides()?;

    if let Some(db) = &cli.db {
        config.database_path = db.clone();
    }
    Ok(config)
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_env("RETAIN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
