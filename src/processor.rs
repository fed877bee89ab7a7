//! Tweet processing pipeline.
//!
//! Drives one record at a time through URL normalization, the skip check,
//! embed fetch, render, capture, text extraction and post-processing. The
//! batch loop is fail-soft: a record that errors is kept unmodified and the
//! run continues. Anything that should stop the run entirely is caught before
//! the first record, at configuration validation time.

use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::browser::{create_engine, RenderEngine};
use crate::config::AppConfig;
use crate::embed::EmbedClient;
use crate::error::TweetshotError;
use crate::filename::resolve_filename;
use crate::postprocess::{resize_image, trim_image};
use crate::tweet::{Tweet, TweetBatch};
use crate::tweet_url::TweetUrl;

/// Candidate selectors for the tweet text inside the rendered embed, most
/// specific first.
pub const TEXT_SELECTORS: &[&str] = &["blockquote > div:nth-of-type(2) > p", "blockquote > p"];

pub struct TweetProcessor {
    config: AppConfig,
    engine: Box<dyn RenderEngine>,
    embed_client: EmbedClient,
}

impl TweetProcessor {
    /// Launch the configured browser and build a processor around it.
    pub async fn new(config: AppConfig) -> Result<Self, TweetshotError> {
        let engine = create_engine(&config.headless_browser).await?;
        Ok(Self::with_parts(config, engine, EmbedClient::new()))
    }

    /// Assemble a processor from pre-built collaborators.
    pub fn with_parts(
        config: AppConfig,
        engine: Box<dyn RenderEngine>,
        embed_client: EmbedClient,
    ) -> Self {
        Self {
            config,
            engine,
            embed_client,
        }
    }

    /// A record is skipped when its image was already captured, the file is
    /// still present in the download directory, and updates were not forced.
    pub fn should_skip(&self, tweet: &Tweet) -> bool {
        !tweet.image.is_empty()
            && self.config.download.path.join(&tweet.image).exists()
            && !self.config.download.update
    }

    /// Process every record in order. Failed records are kept with their
    /// original fields; the loop never aborts mid-batch.
    pub async fn process_batch(&mut self, batch: TweetBatch) -> TweetBatch {
        let mut updated = TweetBatch::default();
        let mut done = 0usize;
        let mut skipped = 0usize;
        let mut failed = 0usize;

        for tweet in &batch.tweets {
            if self.should_skip(tweet) {
                info!("tweet {} already downloaded; skipping", tweet.url);
                skipped += 1;
                updated.tweets.push(tweet.clone());
                continue;
            }

            info!("tweet {} processing...", tweet.url);
            match self.process_tweet(tweet).await {
                Ok(processed) => {
                    if let Err(e) = self.post_process(&processed) {
                        // The capture itself succeeded, so the record stands.
                        warn!("post-processing failed for {}: {e}", processed.url);
                    }
                    info!("tweet {} saved to {}", processed.url, processed.image);
                    done += 1;
                    updated.tweets.push(processed);
                }
                Err(e) => {
                    error!("tweet {} failed: {e}", tweet.url);
                    failed += 1;
                    updated.tweets.push(tweet.clone());
                }
            }
        }

        info!("batch finished: {done} done, {skipped} skipped, {failed} failed");
        updated
    }

    /// Run one record through the full capture pipeline and return the
    /// updated copy.
    pub async fn process_tweet(&mut self, tweet: &Tweet) -> Result<Tweet, TweetshotError> {
        let tweet_url = TweetUrl::parse(&tweet.url)?;

        debug!("resolving image file name for {}", tweet_url.canonical);
        let filename = resolve_filename(
            &self.config.download.name,
            &tweet_url.author,
            &tweet_url.id,
            &self.config.download.path,
        )?;
        let image_path = self.config.download.path.join(&filename);

        debug!("fetching embed markup for {}", tweet_url.canonical);
        let options = self.config.twit_embed.clone().unwrap_or_default();
        let embed_html = self
            .embed_client
            .fetch_embed_html(&tweet_url.canonical, &options)
            .await?;

        debug!("rendering embed for {}", tweet_url.canonical);
        self.engine.render(&embed_html).await?;

        debug!("capturing {} to {}", tweet_url.canonical, image_path.display());
        let settle = Duration::from_secs(self.config.headless_browser.screenshot_delay);
        self.engine.screenshot(&image_path, settle).await?;

        let text = self.tweet_text().await;
        debug!("extracted text for {}: {text:?}", tweet_url.canonical);

        let mut updated = tweet.clone();
        updated.url = tweet_url.canonical;
        updated.text = text.unwrap_or_default();
        updated.image = filename;
        Ok(updated)
    }

    /// First non-empty text among the candidate selectors, or `None`. Missing
    /// text is never an error.
    async fn tweet_text(&mut self) -> Option<String> {
        for selector in TEXT_SELECTORS {
            if let Some(text) = self.engine.extract_text(selector).await {
                return Some(text);
            }
        }
        None
    }

    /// Apply the optional trim and resize steps to a captured image, in that
    /// order, in place.
    pub fn post_process(&self, tweet: &Tweet) -> Result<(), TweetshotError> {
        let Some(postprocess) = &self.config.postprocess else {
            return Ok(());
        };
        let image_path = self.config.download.path.join(&tweet.image);
        if postprocess.trim {
            debug!("trimming image for {}", tweet.url);
            trim_image(&image_path, None)?;
        }
        if postprocess.resize {
            debug!("resizing image for {}", tweet.url);
            resize_image(&image_path, None, &postprocess.resize_options)?;
        }
        Ok(())
    }

    /// Close the browser session. Must run on every exit path once the
    /// processor has been constructed.
    pub async fn shutdown(&mut self) {
        self.engine.close().await;
    }
}
