//! Core types, configuration, and error handling for rustb2.
//!
//! This crate provides the foundational building blocks shared by the
//! session, client, and upload crates: the environment-driven [`B2Config`],
//! the [`B2Error`] taxonomy every API call reports through, and the
//! [`Credentials`] pair used to authorize an account.

mod config;
mod error;
mod types;

pub use config::{B2Config, DEFAULT_AUTH_URL, DEFAULT_TOKEN_TTL_SECS, DEFAULT_UPLOAD_WORKERS};
pub use error::{B2Error, B2Result};
pub use types::{Credentials, MAX_PART_COUNT};
