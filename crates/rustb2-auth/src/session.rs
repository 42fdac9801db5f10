//! The cached result of authorizing an account.

use chrono::{DateTime, TimeDelta, Utc};
use rustb2_model::{AccountAuthorization, B2Operation};
use serde::{Deserialize, Serialize};

/// Key under which the session is stored in a [`crate::SessionStore`].
pub const SESSION_KEY: &str = "session";

/// An authorization token together with the instant it stops being valid.
///
/// The service does not report an expiry, so `token_expires_at` is derived
/// from the time of authorization plus a configured TTL. A session is fresh
/// while `now < token_expires_at`; from that instant on it must not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(flatten)]
    authorization: AccountAuthorization,

    /// When the token becomes invalid.
    token_expires_at: DateTime<Utc>,
}

impl Session {
    /// Wrap a fresh authorization issued at `now`, valid for `ttl`.
    #[must_use]
    pub fn new(authorization: AccountAuthorization, now: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            authorization,
            token_expires_at: now
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Whether the token may no longer be used at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.token_expires_at
    }

    /// The account this session belongs to.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.authorization.account_id
    }

    /// Token for the `Authorization` header of API calls.
    #[must_use]
    pub fn authorization_token(&self) -> &str {
        &self.authorization.authorization_token
    }

    /// Base URL for API calls.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.authorization.api_url
    }

    /// Base URL for downloads.
    #[must_use]
    pub fn download_url(&self) -> &str {
        &self.authorization.download_url
    }

    /// Part size the service recommends for large files.
    #[must_use]
    pub fn recommended_part_size(&self) -> u64 {
        self.authorization.recommended_part_size
    }

    /// When the token becomes invalid.
    #[must_use]
    pub fn token_expires_at(&self) -> DateTime<Utc> {
        self.token_expires_at
    }

    /// Absolute URL of an API operation for this session's cluster.
    #[must_use]
    pub fn endpoint(&self, operation: B2Operation) -> String {
        format!(
            "{}/{}",
            self.api_url().trim_end_matches('/'),
            operation.path()
        )
    }
}
