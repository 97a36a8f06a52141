use thiserror::Error;

/// Failure raised by a ticket source (network, auth, decoding...).
///
/// The core never inspects or translates these; they surface unchanged
/// through [`MetricsError::Source`].
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid flow entry: {0}")]
    InvalidFlowEntry(String),

    #[error("invalid ticket {key}: {reason}")]
    InvalidTicket { key: String, reason: String },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("not found: {key}. {hint}")]
    NotFound { key: String, hint: String },

    #[error(transparent)]
    Source(SourceError),
}

impl MetricsError {
    pub fn invalid_ticket(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTicket {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(key: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::NotFound {
            key: key.into(),
            hint: hint.into(),
        }
    }

    /// `true` for cache misses, which callers recover from by re-populating.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type MetricsResult<T> = Result<T, MetricsError>;
