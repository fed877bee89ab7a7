use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tweetshot::{setup_logging, AppConfig, Cli, CliRunner};

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    setup_logging(args.debug);

    info!("starting tweetshot v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(&args.config).with_context(|| {
        format!("unable to load configuration from {}", args.config.display())
    })?;

    let runner = CliRunner::new(config, &args)?;
    runner.run(args.command).await?;

    info!("finished");
    Ok(())
}
