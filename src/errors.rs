use std::time::Duration;

/// Failures of the token derivation pipeline.
///
/// Every variant is surfaced unchanged from [`crate::cache::token_source::CachingTokenSource::token`],
/// nothing is retried or recovered inside the library.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// An operation did not finish before its deadline.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The identity agent could not be reached or refused to issue a document.
    #[error("identity document unavailable: {0}")]
    IdentityUnavailable(String),

    /// The STS endpoint answered with a non-200 status.
    #[error("token exchange rejected: {status} - {status_text}")]
    ExchangeRejected { status: u16, status_text: String },

    /// The IAM credentials endpoint answered with a non-200 status.
    #[error("service account impersonation rejected: {status} - {status_text}")]
    ImpersonationRejected { status: u16, status_text: String },

    /// A response body could not be decoded.
    #[error("malformed {endpoint} response: {reason}")]
    ResponseMalformed {
        endpoint: &'static str,
        reason: String,
    },

    /// The expiry timestamp is not in `YYYY-MM-DDTHH:MM:SSZ` form.
    #[error("malformed expiry timestamp '{value}', expected YYYY-MM-DDTHH:MM:SSZ")]
    TimestampMalformed { value: String },

    /// The HTTP round trip itself failed.
    #[error("{endpoint} request failed: {reason}")]
    Transport {
        endpoint: &'static str,
        reason: String,
    },
}

impl TokenError {
    /// Whether calling `token()` again may succeed without a configuration change.
    pub fn is_transient(&self) -> bool {
        match self {
            TokenError::Timeout { .. }
            | TokenError::IdentityUnavailable(_)
            | TokenError::Transport { .. } => true,
            TokenError::ExchangeRejected { status, .. }
            | TokenError::ImpersonationRejected { status, .. } => {
                *status == 429 || *status >= 500
            }
            TokenError::ResponseMalformed { .. } | TokenError::TimestampMalformed { .. } => false,
        }
    }

    /// Maps a reqwest send error, keeping client-side timeouts distinguishable.
    pub(crate) fn from_reqwest(endpoint: &'static str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TokenError::Timeout {
                operation: endpoint,
                after: timeout,
            }
        } else {
            TokenError::Transport {
                endpoint,
                reason: err.to_string(),
            }
        }
    }
}
