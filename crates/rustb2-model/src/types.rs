//! Entities shared between B2 requests and responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// Response of `b2_authorize_account`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAuthorization {
    /// The identifier for the account.
    pub account_id: String,

    /// Token for every API call that needs an `Authorization` header.
    /// Valid for at most 24 hours.
    pub authorization_token: String,

    /// What this token is allowed to do.
    #[serde(default, rename = "allowed")]
    pub token_capabilities: TokenCapability,

    /// Base URL for all API calls except uploads and downloads.
    pub api_url: String,

    /// Base URL for downloading files.
    pub download_url: String,

    /// Base URL of the S3 compatible API.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub s3_api_url: String,

    /// Part size the service recommends for large files.
    pub recommended_part_size: u64,

    /// Smallest size any part but the last may have.
    pub absolute_minimum_part_size: u64,
}

/// Capabilities attached to an authorization token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCapability {
    /// Set when access is restricted to a single bucket.
    #[serde(default)]
    pub bucket_id: Option<String>,

    /// Name of the restricted bucket, if any.
    #[serde(default)]
    pub bucket_name: Option<String>,

    /// Capability names granted to the key (e.g. `writeFiles`).
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Set when access is restricted to file names with this prefix.
    #[serde(default)]
    pub name_prefix: Option<String>,
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// A bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    /// Owning account.
    #[serde(default)]
    pub account_id: String,

    /// Bucket identifier.
    #[serde(rename = "bucketId")]
    pub id: String,

    /// Bucket name.
    #[serde(rename = "bucketName")]
    pub name: String,

    /// `allPublic`, `allPrivate`, or `snapshot`.
    #[serde(default, rename = "bucketType")]
    pub kind: String,

    /// User-defined bucket info.
    #[serde(default, rename = "bucketInfo")]
    pub info: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// A file (or large-file record) as returned by the file endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Owning account.
    #[serde(default)]
    pub account_id: String,

    /// `start` for unfinished large files, `upload` for finished ones.
    #[serde(default)]
    pub action: String,

    /// Bucket the file lives in.
    #[serde(default)]
    pub bucket_id: String,

    /// Size in bytes.
    #[serde(default)]
    pub content_length: u64,

    /// Hex SHA1 of the content. Large files report `none`.
    #[serde(default)]
    pub content_sha1: Option<String>,

    /// MIME type.
    #[serde(default)]
    pub content_type: String,

    /// Remote file identifier.
    pub file_id: String,

    /// Custom file info (e.g. `src_last_modified_millis`).
    #[serde(default)]
    pub file_info: BTreeMap<String, String>,

    /// File name within the bucket.
    #[serde(default)]
    pub file_name: String,

    /// Upload time in milliseconds since the epoch.
    #[serde(default)]
    pub upload_timestamp: i64,
}

/// Server confirmation of one uploaded part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    /// The large file this part belongs to.
    pub file_id: String,

    /// Part number, starting at 1.
    pub part_number: u32,

    /// Bytes stored in the part.
    pub content_length: u64,

    /// Hex SHA1 of the bytes the server received.
    pub content_sha1: String,
}
