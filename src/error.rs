use thiserror::Error;

/// Failures of the player-record fetch path. The aggregator never sees these:
/// it is only invoked once a fetch succeeded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("rate limited: {scope} allows {limit} calls per {window_secs}s")]
    RateLimited {
        scope: String,
        limit: usize,
        window_secs: u64,
    },
    #[error("request failed: http {status}: {message}")]
    HttpStatus { status: u16, message: String },
    #[error("request failed: api error {code}: {message}")]
    Api { code: String, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid player response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited { .. })
    }

    /// Everything that is not a local admission rejection counts as a failed request.
    pub fn is_request_failed(&self) -> bool {
        !self.is_rate_limited()
    }
}
