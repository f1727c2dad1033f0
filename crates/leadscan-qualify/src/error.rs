use thiserror::Error;

#[derive(Debug, Error)]
pub enum QualifyError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model API rate limited: {0}")]
    RateLimited(String),

    #[error("model returned no candidates")]
    EmptyResponse,

    #[error("model call exceeded {secs}s")]
    Timeout { secs: u64 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model reply for {0} held no JSON object")]
    Unparseable(&'static str),

    #[error("invalid model configuration: {0}")]
    Config(String),
}

impl QualifyError {
    /// Returns `true` for errors worth retrying after a back-off delay:
    /// network timeouts and connect failures, HTTP 5xx, rate limiting and
    /// call timeouts. Everything else fails immediately.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            QualifyError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            QualifyError::Api { status, .. } => *status >= 500,
            QualifyError::RateLimited(_) | QualifyError::Timeout { .. } => true,
            QualifyError::EmptyResponse
            | QualifyError::Deserialize { .. }
            | QualifyError::Unparseable(_)
            | QualifyError::Config(_) => false,
        }
    }
}
