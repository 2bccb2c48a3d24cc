//! Common error types for the stockdesk services

use thiserror::Error;

/// Error taxonomy shared by the trading and aggregation services
#[derive(Debug, Error)]
pub enum StockError {
    /// There is no data to aggregate yet (empty window, instrument with
    /// no recorded quantity, or zero instruments with trades). Returned
    /// as a typed failure so callers never see NaN or a silent zero.
    #[error("no data to aggregate")]
    NoData,

    /// A trade or stock failed validation at construction time
    #[error("validation failed: {0}")]
    Validation(String),

    /// The requested ticker is not registered
    #[error("unknown ticker: {0}")]
    UnknownTicker(String),

    /// An upstream guarantee was broken (e.g. a non-positive average
    /// reaching the index math). Programming error, not recoverable.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}
