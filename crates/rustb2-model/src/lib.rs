//! B2 native API wire types for rustb2.
//!
//! Hand-written serde types for the JSON bodies exchanged with the B2 v2 API.
//! All types use `camelCase` field naming to match the wire protocol.
//! Request bodies live in [`input`], response bodies in [`output`], and the
//! entities shared by both in [`types`].

pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use error::{ErrorCode, ErrorResponse};
pub use operations::B2Operation;
pub use output::{UploadPartUrl, UploadUrl};
pub use types::{AccountAuthorization, Bucket, File, FilePart, TokenCapability};
