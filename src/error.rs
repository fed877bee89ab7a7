use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TweetshotError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{method} {url}: response {status} ({body})")]
    RemoteApi {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TweetshotError {
    /// Whether the batch loop may keep the record and continue, as opposed to
    /// aborting the whole run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TweetshotError::RemoteApi { .. }
                | TweetshotError::Render(_)
                | TweetshotError::ImageProcessing(_)
        )
    }

    pub fn remote_api(method: &str, url: &str, status: u16, body: &str) -> Self {
        TweetshotError::RemoteApi {
            method: method.to_string(),
            url: url.to_string(),
            status,
            body: body.to_string(),
        }
    }
}

impl From<std::io::Error> for TweetshotError {
    fn from(err: std::io::Error) -> Self {
        TweetshotError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TweetshotError {
    fn from(err: serde_json::Error) -> Self {
        TweetshotError::Serialization(err.to_string())
    }
}
