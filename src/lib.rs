//! # tweetshot
//!
//! Download tweets as rendered screenshot images. Each tweet URL is
//! normalized, its server-rendered embed markup is fetched, the markup is
//! rendered in a headless browser, and the page is captured after a settle
//! delay. The tweet text is extracted from the rendered page, and the saved
//! image can optionally be trimmed to its content and resized.
//!
//! Processing is sequential: one browser session is launched per run and
//! shared across the whole batch. Records whose image already exists are
//! skipped unless updates are forced, and a record that fails is kept
//! unmodified while the rest of the batch continues.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tweetshot::{AppConfig, TweetBatch, TweetProcessor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load(Path::new("config.json"))?;
//!     config.validate()?;
//!
//!     let batch = TweetBatch::from_urls(&["https://twitter.com/nasa/status/42"])?;
//!     let mut processor = TweetProcessor::new(config).await?;
//!     let updated = processor.process_batch(batch).await;
//!     processor.shutdown().await;
//!
//!     println!("captured {} tweet(s)", updated.tweets.len());
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Screenshot a single tweet
//! tweetshot --config config.json single https://twitter.com/nasa/status/42
//!
//! # Process a batch file and write the updated records back
//! tweetshot --config config.json batch --input tweets.json --save-to tweets.json
//! ```

/// Headless browser abstraction with two launchable variants
pub mod browser;

/// Command-line interface implementation
pub mod cli;

/// Application configuration and embed-option validation
pub mod config;

/// Embed endpoint client
pub mod embed;

/// Error types and classification
pub mod error;

/// Filename template expansion
pub mod filename;

/// Trim and resize post-processing
pub mod postprocess;

/// Batch processing pipeline
pub mod processor;

/// Tweet records and batch files
pub mod tweet;

/// Tweet URL parsing and canonicalization
pub mod tweet_url;

/// Utility helpers
pub mod utils;

#[cfg(test)]
mod tests;

pub use browser::*;
pub use cli::*;
pub use config::*;
pub use embed::*;
pub use error::*;
pub use filename::*;
pub use postprocess::*;
pub use processor::*;
pub use tweet::*;
pub use tweet_url::*;
pub use utils::*;
