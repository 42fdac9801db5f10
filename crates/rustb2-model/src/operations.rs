//! B2 API operation enum.

use std::fmt;

/// B2 native API operations used by rustb2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum B2Operation {
    // Account
    /// Log in and obtain a session token.
    AuthorizeAccount,

    // Buckets
    /// List buckets, optionally filtered by name.
    ListBuckets,

    // Small files
    /// Obtain a bucket-scoped upload URL.
    GetUploadUrl,

    // Large files
    /// Create a large-file record.
    StartLargeFile,
    /// Obtain a file-scoped upload URL for parts.
    GetUploadPartUrl,
    /// Assemble uploaded parts into the final file.
    FinishLargeFile,
    /// Discard a large file and its parts.
    CancelLargeFile,
}

impl B2Operation {
    /// Returns the API operation name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizeAccount => "b2_authorize_account",
            Self::ListBuckets => "b2_list_buckets",
            Self::GetUploadUrl => "b2_get_upload_url",
            Self::StartLargeFile => "b2_start_large_file",
            Self::GetUploadPartUrl => "b2_get_upload_part_url",
            Self::FinishLargeFile => "b2_finish_large_file",
            Self::CancelLargeFile => "b2_cancel_large_file",
        }
    }

    /// Returns the path of the operation relative to an API base URL.
    #[must_use]
    pub fn path(&self) -> String {
        format!("b2api/v2/{}", self.as_str())
    }

    /// Parse an operation from the last segment of a request path.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path.rsplit('/').next()? {
            "b2_authorize_account" => Some(Self::AuthorizeAccount),
            "b2_list_buckets" => Some(Self::ListBuckets),
            "b2_get_upload_url" => Some(Self::GetUploadUrl),
            "b2_start_large_file" => Some(Self::StartLargeFile),
            "b2_get_upload_part_url" => Some(Self::GetUploadPartUrl),
            "b2_finish_large_file" => Some(Self::FinishLargeFile),
            "b2_cancel_large_file" => Some(Self::CancelLargeFile),
            _ => None,
        }
    }
}

impl fmt::Display for B2Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
