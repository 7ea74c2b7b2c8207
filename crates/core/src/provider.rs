use crate::series::PriceSeries;
use async_trait::async_trait;
use thiserror::Error;

/// Why a history provider produced no usable series.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// Request exceeded its fixed timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Non-success HTTP status.
    #[error("provider returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Payload could not be decoded into observations.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// Request succeeded but carried no observations.
    #[error("no observations returned")]
    Empty,

    /// Fewer observations than the caller requires.
    #[error("insufficient history: got {got}, required {required}")]
    Insufficient {
        /// Observations received.
        got: usize,
        /// Observations required.
        required: usize,
    },

    /// Provider does not know the symbol.
    #[error("unsupported symbol: {0}")]
    Unsupported(String),
}

impl ProviderError {
    /// True for failures worth retrying against another provider.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_) | Self::Status { .. })
    }
}

/// Source of ordered hourly price history for a symbol.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetches the history for `symbol`.
    ///
    /// # Errors
    /// Returns a [`ProviderError`] describing why no series is available.
    async fn fetch(&self, symbol: &str) -> Result<PriceSeries, ProviderError>;
}
