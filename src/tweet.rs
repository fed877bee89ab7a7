//! Tweet records and the order-preserving batch file around them.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TweetshotError;
use crate::tweet_url::TweetUrl;

/// One tweet in a batch. `image` holds the captured file name relative to the
/// download directory and stays empty until a capture succeeds; `text` stays
/// empty when extraction finds nothing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tweet {
    pub url: String,

    #[serde(default)]
    pub emoji: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub image: String,
}

impl Tweet {
    /// Build a record from a raw URL, canonicalizing it on the way in.
    pub fn from_url(raw: &str) -> Result<Self, TweetshotError> {
        let parsed = TweetUrl::parse(raw)?;
        Ok(Self {
            url: parsed.canonical,
            emoji: String::new(),
            text: String::new(),
            image: String::new(),
        })
    }
}

/// An ordered batch of tweets. Order is preserved across load and save; it
/// also drives `{no}` sequence numbering in filename templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TweetBatch {
    pub tweets: Vec<Tweet>,
}

impl TweetBatch {
    /// Load a batch file, validating and canonicalizing every URL before any
    /// record is processed.
    pub fn load(path: &Path) -> Result<Self, TweetshotError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TweetshotError::Validation(format!("tweets file {} can't be read: {e}", path.display()))
        })?;
        let mut batch: TweetBatch = serde_json::from_str(&content).map_err(|e| {
            TweetshotError::Validation(format!(
                "tweets file {} is not valid JSON: {e}",
                path.display()
            ))
        })?;
        for tweet in &mut batch.tweets {
            tweet.url = TweetUrl::parse(&tweet.url)?.canonical;
        }
        Ok(batch)
    }

    pub fn from_urls<S: AsRef<str>>(urls: &[S]) -> Result<Self, TweetshotError> {
        let tweets = urls
            .iter()
            .map(|url| Tweet::from_url(url.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tweets })
    }

    /// Serialize the batch back to disk with stable four-space indentation.
    pub fn save(&self, path: &Path) -> Result<(), TweetshotError> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        buffer.push(b'\n');
        std::fs::write(path, buffer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_round_trip_preserves_records_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tweets.json");
        std::fs::write(
            &source,
            r#"{"tweets": [
                {"url": "https://twitter.com/nasa/status/42", "emoji": "🚀", "image": "42.png"},
                {"url": "twitter.com/rustlang/status/7?s=20"}
            ]}"#,
        )
        .unwrap();

        let batch = TweetBatch::load(&source).unwrap();
        assert_eq!(batch.tweets.len(), 2);
        assert_eq!(batch.tweets[0].url, "https://twitter.com/nasa/status/42");
        assert_eq!(batch.tweets[0].emoji, "🚀");
        assert_eq!(batch.tweets[1].url, "https://twitter.com/rustlang/status/7");

        let copy = dir.path().join("copy.json");
        batch.save(&copy).unwrap();
        let reloaded = TweetBatch::load(&copy).unwrap();
        assert_eq!(reloaded, batch);
    }

    #[test]
    fn test_load_rejects_invalid_url() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tweets.json");
        std::fs::write(
            &source,
            r#"{"tweets": [{"url": "https://twitter.com/nasa/notstatus/42"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            TweetBatch::load(&source),
            Err(TweetshotError::Validation(_))
        ));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tweets.json");
        std::fs::write(&source, "{not json").unwrap();
        assert!(matches!(
            TweetBatch::load(&source),
            Err(TweetshotError::Validation(_))
        ));
    }
}
