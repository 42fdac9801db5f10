//! Response bodies for the B2 JSON endpoints.
//!
//! Upload authorizations come in two flavors with distinct types so a
//! bucket-scoped URL can never be handed to the part uploader:
//! [`UploadUrl`] for whole files and [`UploadPartUrl`] for the parts of one
//! large file.

use serde::{Deserialize, Serialize};

use crate::types::Bucket;

/// Response of `b2_list_buckets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBucketsOutput {
    /// Matching buckets.
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

/// Bucket-scoped upload authorization returned by `b2_get_upload_url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrl {
    /// Bucket the URL uploads into.
    pub bucket_id: String,

    /// URL to POST file content to.
    pub upload_url: String,

    /// Token to send as the `Authorization` header of the upload.
    pub authorization_token: String,
}

/// File-scoped upload authorization returned by `b2_get_upload_part_url`.
///
/// Valid for any number of part uploads of the same large file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPartUrl {
    /// Large file the URL uploads parts for.
    pub file_id: String,

    /// URL to POST part content to.
    pub upload_url: String,

    /// Token to send as the `Authorization` header of each part upload.
    pub authorization_token: String,
}

/// Response of `b2_cancel_large_file`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelLargeFileOutput {
    /// The cancelled large file.
    pub file_id: String,

    /// Owning account.
    #[serde(default)]
    pub account_id: String,

    /// Bucket the file was in.
    #[serde(default)]
    pub bucket_id: String,

    /// Name of the cancelled file.
    #[serde(default)]
    pub file_name: String,
}
