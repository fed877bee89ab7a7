//! Client for the server-side embed endpoint.
//!
//! One GET per tweet; anything other than a 200 with an `html` field in the
//! body is a hard error for that record. Retry policy, if any, belongs to the
//! caller.

use crate::config::EmbedOptions;
use crate::error::TweetshotError;

pub const OEMBED_ENDPOINT: &str = "https://publish.twitter.com/oembed";

pub struct EmbedClient {
    client: reqwest::Client,
    endpoint: String,
}

impl EmbedClient {
    pub fn new() -> Self {
        Self::with_endpoint(OEMBED_ENDPOINT)
    }

    /// Use an alternate endpoint base. Query parameters are unchanged.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Fetch the embed markup for a canonical tweet URL, merging the URL into
    /// the caller-supplied option set.
    pub async fn fetch_embed_html(
        &self,
        tweet_url: &str,
        options: &EmbedOptions,
    ) -> Result<String, TweetshotError> {
        let mut params: Vec<(&str, &str)> =
            options.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        params.push(("url", tweet_url));

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| TweetshotError::remote_api("GET", &self.endpoint, 0, &e.to_string()))?;

        let request_url = response.url().to_string();
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TweetshotError::remote_api("GET", &request_url, status, &e.to_string()))?;

        decode_embed_response(&request_url, status, &body)
    }
}

impl Default for EmbedClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the embed markup from an endpoint response, or build the error
/// carrying the full request context.
pub fn decode_embed_response(
    url: &str,
    status: u16,
    body: &str,
) -> Result<String, TweetshotError> {
    if status != 200 {
        return Err(TweetshotError::remote_api("GET", url, status, body));
    }
    let payload: serde_json::Value = serde_json::from_str(body)
        .map_err(|_| TweetshotError::remote_api("GET", url, status, body))?;
    match payload.get("html").and_then(|html| html.as_str()) {
        Some(html) => Ok(html.to_string()),
        None => Err(TweetshotError::remote_api("GET", url, status, body)),
    }
}
