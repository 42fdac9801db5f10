//! Error types for rustb2.
//!
//! Defines [`B2Error`], the single error enum reported by session handling,
//! API calls, and the large-file upload pipeline. Variants fall into five
//! families:
//!
//! | Family | Variants |
//! |--------|----------|
//! | transport | [`B2Error::Transport`] |
//! | authorization | [`B2Error::Unauthorized`], [`B2Error::ExpiredToken`] |
//! | validation | [`B2Error::Api`], [`B2Error::BucketNotFound`], [`B2Error::InvalidArgument`], [`B2Error::InvalidPlan`] |
//! | integrity | [`B2Error::ChecksumMismatch`], [`B2Error::PartNumberMismatch`] |
//! | protocol invariant | [`B2Error::InvalidLifecycle`] |
//!
//! None of these are masked or coalesced on the way up: the first error a
//! worker observes is the error the caller receives.

/// Error type for every rustb2 operation.
#[derive(Debug, thiserror::Error)]
pub enum B2Error {
    // -----------------------------------------------------------------------
    // Transport errors
    // -----------------------------------------------------------------------
    /// The request never produced an HTTP response (connect, TLS, timeout, body stream).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    // -----------------------------------------------------------------------
    // Authorization errors
    // -----------------------------------------------------------------------
    /// The application key ID and/or key are wrong.
    #[error("invalid credentials")]
    Unauthorized,

    /// The authorization token has expired; repeating the request after
    /// re-authorizing is expected to succeed.
    #[error("expired auth token")]
    ExpiredToken,

    // -----------------------------------------------------------------------
    // Validation errors
    // -----------------------------------------------------------------------
    /// The service rejected the request.
    #[error("{status} {code}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine readable error code (e.g. `bad_request`).
        code: String,
        /// Human readable message from the service.
        message: String,
    },

    /// No bucket with the given name is visible to the account.
    #[error("bucket with name {name:?} was not found")]
    BucketNotFound {
        /// The bucket name that was looked up.
        name: String,
    },

    /// A caller-supplied path or destination is malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A file cannot be partitioned with the given sizes.
    #[error("cannot plan upload: {reason}")]
    InvalidPlan {
        /// Why the plan was rejected.
        reason: String,
    },

    // -----------------------------------------------------------------------
    // Integrity errors
    // -----------------------------------------------------------------------
    /// The server confirmed a part whose SHA1 differs from the one computed locally.
    #[error("checksum mismatch for part {part_number}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The part whose checksum differs.
        part_number: u32,
        /// Locally computed hex SHA1.
        expected: String,
        /// Hex SHA1 reported by the server.
        actual: String,
    },

    /// The server confirmed a different part number than the one uploaded.
    #[error("part number mismatch: expected {expected}, got {actual}")]
    PartNumberMismatch {
        /// The part number that was uploaded.
        expected: u32,
        /// The part number the server confirmed.
        actual: u32,
    },

    // -----------------------------------------------------------------------
    // Protocol invariant errors
    // -----------------------------------------------------------------------
    /// A large-file lifecycle transition was attempted from the wrong state.
    #[error("cannot {operation} large file {file_id}: upload is already {state}")]
    InvalidLifecycle {
        /// The remote file ID.
        file_id: String,
        /// The state the upload is in.
        state: &'static str,
        /// The rejected operation.
        operation: &'static str,
    },

    /// A failed upload could not be cancelled either; both errors are kept.
    #[error("upload failed ({upload}) and cancelling it failed too ({cancel})")]
    CancelFailed {
        /// The error that aborted the upload.
        upload: Box<B2Error>,
        /// The error returned by the cancel call.
        cancel: Box<B2Error>,
    },

    // -----------------------------------------------------------------------
    // Local errors
    // -----------------------------------------------------------------------
    /// Configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Local file or cache I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A JSON body or cache entry could not be (de)serialized.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl B2Error {
    /// Wrap any transport-level failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }

    /// Returns true if repeating the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::ExpiredToken => true,
            Self::Api { status, code, .. } => {
                *status >= 500 || *status == 408 || *status == 429 || code == "service_unavailable"
            }
            _ => false,
        }
    }
}

/// Convenience result type for rustb2 operations.
pub type B2Result<T> = Result<T, B2Error>;
