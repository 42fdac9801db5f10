//! Common type definitions shared across crates.

use std::fmt;

/// The largest number of parts the service accepts for one large file.
pub const MAX_PART_COUNT: u64 = 10_000;

/// An application key used to authorize an account.
///
/// The secret half is never printed; `Debug` redacts it so credentials can
/// travel through structured logs safely.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key_id: String,
    key_secret: String,
}

impl Credentials {
    /// Create credentials from a key ID and its secret.
    #[must_use]
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }

    /// The public key ID.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// The secret part of the key.
    #[must_use]
    pub fn key_secret(&self) -> &str {
        &self.key_secret
    }

    /// Whether either half of the key is missing.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.key_id.is_empty() || self.key_secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .finish()
    }
}
