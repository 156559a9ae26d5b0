use thiserror::Error;

/// Errors produced while computing a route.
#[derive(Debug, Error)]
pub enum RoutingError {
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

    /// The provider answered with a non-OK status token.
    #[error("provider returned {status}: {message}")]
    Provider { status: String, message: String },

    /// A success response that lacks distance, duration, or geometry.
    #[error("incomplete route: {0}")]
    IncompleteRoute(String),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The provider API key is absent or obviously malformed.
    #[error("Missing/invalid API key format.")]
    InvalidApiKey,

    /// The provider client did not finish initialising in time.
    #[error("Google Maps timed out initializing after {secs}s.")]
    InitTimeout { secs: u64 },

    #[error("no route strategies configured")]
    NoStrategies,
}

impl RoutingError {
    /// Provider status token for classification. Anything that is not a
    /// provider answer reports the generic `ERROR` token.
    #[must_use]
    pub fn status_token(&self) -> &str {
        match self {
            RoutingError::Provider { status, .. } => status,
            _ => "ERROR",
        }
    }
}
