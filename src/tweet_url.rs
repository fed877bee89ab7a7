//! Tweet URL parsing and canonicalization.
//!
//! Equivalent URLs (with or without protocol, with trailing photo paths or
//! tracking queries) all normalize to one canonical string, which is what the
//! skip check keys on. Trailing segments are dropped on purpose.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::TweetshotError;

pub const TWEET_DOMAIN: &str = "twitter.com";

fn tweet_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:(?P<protocol>https?)://)?(?P<domain>[A-Za-z0-9.-]+)/(?P<author>[A-Za-z0-9_]+)/status/(?P<id>[0-9]+)(?P<trailing>/\S+|\?\S+)?$",
        )
        .unwrap()
    })
}

/// A validated tweet URL, split into its identifying parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetUrl {
    pub canonical: String,
    pub author: String,
    pub id: String,
}

impl TweetUrl {
    pub fn parse(raw: &str) -> Result<Self, TweetshotError> {
        let captures = tweet_url_regex().captures(raw.trim()).ok_or_else(|| {
            TweetshotError::Validation(format!("incorrect tweet URL: {raw}"))
        })?;
        let domain = &captures["domain"];
        if domain != TWEET_DOMAIN {
            return Err(TweetshotError::Validation(format!(
                "incorrect tweet URL: domain {domain} is not {TWEET_DOMAIN}"
            )));
        }
        let author = captures["author"].to_string();
        let id = captures["id"].to_string();
        let canonical = format!("https://{TWEET_DOMAIN}/{author}/status/{id}");
        Ok(Self {
            canonical,
            author,
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalization_is_idempotent() {
        let decorated = [
            "https://twitter.com/nasa/status/42",
            "http://twitter.com/nasa/status/42",
            "twitter.com/nasa/status/42",
            "https://twitter.com/nasa/status/42/photo/1",
            "https://twitter.com/nasa/status/42?s=20&t=abc",
        ];
        for url in decorated {
            let parsed = TweetUrl::parse(url).unwrap();
            assert_eq!(parsed.canonical, "https://twitter.com/nasa/status/42");
            assert_eq!(parsed.author, "nasa");
            assert_eq!(parsed.id, "42");

            let reparsed = TweetUrl::parse(&parsed.canonical).unwrap();
            assert_eq!(reparsed.canonical, parsed.canonical);
        }
    }

    #[test]
    fn test_rejects_non_status_path() {
        assert!(TweetUrl::parse("https://twitter.com/nasa/notstatus/42").is_err());
    }

    #[test]
    fn test_rejects_foreign_domain() {
        let err = TweetUrl::parse("https://example.com/nasa/status/42").unwrap_err();
        assert!(matches!(err, TweetshotError::Validation(_)));
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(TweetUrl::parse("not a url").is_err());
        assert!(TweetUrl::parse("https://twitter.com/nasa/status/notanumber").is_err());
        assert!(TweetUrl::parse("").is_err());
    }
}
