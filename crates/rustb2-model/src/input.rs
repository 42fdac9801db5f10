//! Request bodies for the B2 JSON endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Body of `b2_list_buckets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBucketsInput {
    /// Account whose buckets to list.
    pub account_id: String,

    /// Only return the bucket with this ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_id: Option<String>,

    /// Only return the bucket with this name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
}

/// Body of `b2_get_upload_url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUploadUrlInput {
    /// Bucket the upload URL is scoped to.
    pub bucket_id: String,
}

/// Body of `b2_start_large_file`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartLargeFileInput {
    /// Destination bucket.
    pub bucket_id: String,

    /// Destination file name.
    pub file_name: String,

    /// MIME type, or `b2/x-auto` to let the service pick one.
    pub content_type: String,

    /// Custom file info stored with the file.
    #[serde(default)]
    pub file_info: BTreeMap<String, String>,
}

/// Body of `b2_get_upload_part_url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUploadPartUrlInput {
    /// Large file the upload URL is scoped to.
    pub file_id: String,
}

/// Body of `b2_finish_large_file`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishLargeFileInput {
    /// Large file to assemble.
    pub file_id: String,

    /// Hex SHA1 of every part, ordered by part number.
    #[serde(rename = "partSha1Array")]
    pub part_sha1_array: Vec<String>,
}

/// Body of `b2_cancel_large_file`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelLargeFileInput {
    /// Large file to discard.
    pub file_id: String,
}
