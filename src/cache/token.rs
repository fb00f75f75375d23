use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::sources::ImpersonatedToken;
use crate::utils::constants::BEARER;

/// The externally visible credential. Replaced wholesale on refresh, never mutated.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CachedToken {
    pub access_token: String,
    pub expiry: DateTime<Utc>,
    pub token_type: String,
}

impl CachedToken {
    pub fn new(access_token: String, expiry: DateTime<Utc>) -> Self {
        Self {
            access_token,
            expiry,
            token_type: BEARER.to_owned(),
        }
    }

    /// Valid iff `now + safety_margin < expiry`.
    pub fn is_valid_at(&self, now: DateTime<Utc>, safety_margin: Duration) -> bool {
        TimeDelta::from_std(safety_margin)
            .ok()
            .and_then(|margin| now.checked_add_signed(margin))
            .is_some_and(|deadline| deadline < self.expiry)
    }
}

impl From<ImpersonatedToken> for CachedToken {
    fn from(token: ImpersonatedToken) -> Self {
        CachedToken::new(token.access_token, token.expiry)
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"[censored]")
            .field("expiry", &self.expiry)
            .field("token_type", &self.token_type)
            .finish()
    }
}
