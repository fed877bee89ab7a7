use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::config::AppConfig;
use crate::error::TweetshotError;
use crate::processor::TweetProcessor;
use crate::tweet::TweetBatch;

#[derive(Parser)]
#[command(name = "tweetshot")]
#[command(about = "Download tweets as rendered screenshot images")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, default_value = "config.json", help = "Application configuration file")]
    pub config: PathBuf,

    #[arg(long, help = "Destination directory override")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, help = "Filename template override")]
    pub template: Option<String>,

    #[arg(long, help = "Re-download tweets whose image already exists")]
    pub update: bool,

    #[arg(long, help = "Enable debug logging")]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process a tweets file end-to-end
    Batch {
        #[arg(short, long, help = "JSON file with tweets")]
        input: PathBuf,

        #[arg(long, help = "Write the updated tweets back to this JSON file")]
        save_to: Option<PathBuf>,
    },

    /// Screenshot one or more tweet URLs supplied directly
    Single {
        #[arg(required = true, help = "Tweet URLs")]
        urls: Vec<String>,
    },
}

pub struct CliRunner {
    config: AppConfig,
}

impl CliRunner {
    /// Apply command-line overrides to the configuration, then validate the
    /// result. Everything that can fail the run fails here, before any tweet
    /// is touched.
    pub fn new(mut config: AppConfig, args: &Cli) -> Result<Self, TweetshotError> {
        if let Some(output_dir) = &args.output_dir {
            config.download.path = output_dir.clone();
        }
        if let Some(template) = &args.template {
            config.download.name = template.clone();
        }
        if args.update {
            config.download.update = true;
        }
        config.validate()?;

        Ok(Self { config })
    }

    pub async fn run(self, command: Commands) -> Result<(), TweetshotError> {
        let batch = match &command {
            Commands::Batch { input, .. } => {
                let batch = TweetBatch::load(input)?;
                info!("read {} tweet(s) from {}", batch.tweets.len(), input.display());
                batch
            }
            Commands::Single { urls } => {
                let batch = TweetBatch::from_urls(urls)?;
                info!("read {} tweet(s) from the command line", batch.tweets.len());
                batch
            }
        };

        info!(
            "starting processor for headless browser {:?}",
            self.config.headless_browser.name
        );
        let mut processor = TweetProcessor::new(self.config).await?;
        let updated = processor.process_batch(batch).await;
        processor.shutdown().await;

        if let Commands::Batch {
            save_to: Some(path),
            ..
        } = &command
        {
            updated.save(path)?;
            info!("saved updated tweets to {}", path.display());
        }

        Ok(())
    }
}

pub fn setup_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}
