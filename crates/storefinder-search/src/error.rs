use thiserror::Error;

/// Errors returned by the remote search client and the search controller.
#[derive(Debug, Error)]
pub enum SearchError {
    /// No API credentials are configured; nothing was fetched.
    #[error("Naver API credentials not configured")]
    MissingCredentials,

    /// The remote API answered with a non-success HTTP status.
    #[error("Naver API error: {status} - {message}")]
    RemoteStatus { status: u16, message: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid API base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid search configuration: {0}")]
    InvalidConfig(#[from] storefinder_core::ConfigError),
}

impl SearchError {
    /// `true` for failures reported by (or while talking to) the remote
    /// service, as opposed to local configuration problems.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SearchError::RemoteStatus { .. } | SearchError::Http(_) | SearchError::Deserialize { .. }
        )
    }
}
