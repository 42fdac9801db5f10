//! Uploading a local file to a bucket.
//!
//! [`Uploader::upload`] resolves the destination bucket and then picks one of
//! two paths. Files no larger than the recommended part size (or that would
//! plan a single part) go up in one request against a bucket-scoped upload
//! URL. Anything larger becomes a large file: start, concurrent part uploads,
//! finish; any failure after the start cancels the large file before the
//! error is returned.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rustb2_core::{B2Config, B2Error, B2Result};
use rustb2_model::input::StartLargeFileInput;
use rustb2_model::{Bucket, File};
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::bucket::BucketResolver;
use crate::checksums;
use crate::chunk::{CONTENT_SHA1_HEADER, ChunkUploader, PartUpload};
use crate::client::{B2Client, decode};
use crate::coordinator::UploadCoordinator;
use crate::large_file::{
    AUTO_CONTENT_TYPE, LARGE_FILE_SHA1, LargeFileUpload, SRC_LAST_MODIFIED_MILLIS,
};
use crate::planner::{ChunkPlanner, UploadPlan};

/// Header carrying the percent-encoded destination file name.
pub const FILE_NAME_HEADER: &str = "X-Bz-File-Name";

/// Header carrying the source modification time of a small file.
pub const SRC_LAST_MODIFIED_HEADER: &str = "X-Bz-Info-src_last_modified_millis";

/// Characters left unescaped in file names; `/` separates "folders".
const FILE_NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Percent-encode a file name for headers and download URLs.
#[must_use]
pub fn encode_file_name(name: &str) -> String {
    utf8_percent_encode(name, FILE_NAME_ENCODE_SET).to_string()
}

// ---------------------------------------------------------------------------
// Destination
// ---------------------------------------------------------------------------

/// Where an upload lands: `bucket[/name]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Bucket name.
    pub bucket: String,
    /// File name inside the bucket.
    pub file_name: String,
}

impl Destination {
    /// Parse a destination for `source`.
    ///
    /// | destination | file name |
    /// |-------------|-----------|
    /// | `bucket` | source file name |
    /// | `bucket/` | source file name |
    /// | `bucket/dir` | `dir` |
    /// | `bucket/dir/` | `dir/<source file name>` |
    pub fn parse(destination: &str, source: &Path) -> B2Result<Self> {
        let original = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                B2Error::InvalidArgument(format!("{} has no file name", source.display()))
            })?;

        let (bucket, rest) = destination.split_once('/').unwrap_or((destination, ""));
        if bucket.is_empty() {
            return Err(B2Error::InvalidArgument(format!(
                "destination {destination:?} has no bucket"
            )));
        }

        let file_name = if rest.is_empty() {
            original.to_owned()
        } else if rest.ends_with('/') {
            format!("{rest}{original}")
        } else {
            rest.to_owned()
        };

        Ok(Self {
            bucket: bucket.to_owned(),
            file_name,
        })
    }
}

// ---------------------------------------------------------------------------
// Uploader
// ---------------------------------------------------------------------------

/// Uploads local files, choosing between the small-file and large-file paths.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: B2Client,
    coordinator: UploadCoordinator,
    planner: ChunkPlanner,
}

impl Uploader {
    /// Create an uploader.
    #[must_use]
    pub fn new(client: B2Client, coordinator: UploadCoordinator) -> Self {
        Self {
            client,
            coordinator,
            planner: ChunkPlanner::default(),
        }
    }

    /// Create an uploader with the worker count and retry budget from `config`.
    #[must_use]
    pub fn from_config(client: B2Client, config: &B2Config) -> Self {
        Self::new(
            client,
            UploadCoordinator::new(config.workers(), config.part_retry_budget),
        )
    }

    /// Replace the chunk planner.
    #[must_use]
    pub fn with_planner(mut self, planner: ChunkPlanner) -> Self {
        self.planner = planner;
        self
    }

    /// Upload `source` to `destination` (`bucket[/name]`).
    pub async fn upload(&self, source: &Path, destination: &str) -> B2Result<File> {
        let destination = Destination::parse(destination, source)?;

        let metadata = tokio::fs::metadata(source).await?;
        if !metadata.is_file() {
            return Err(B2Error::InvalidArgument(format!(
                "{} is not a regular file",
                source.display()
            )));
        }
        let size = metadata.len();
        let modified_millis = metadata
            .modified()
            .map(|t| DateTime::<Utc>::from(t).timestamp_millis())
            .unwrap_or_default();

        let bucket = BucketResolver::new(self.client.clone())
            .resolve(&destination.bucket)
            .await?;
        let recommended = self.client.session().await?.recommended_part_size();

        let file_name = destination.file_name.as_str();
        match self.large_file_plan(size, recommended)? {
            Some(plan) => {
                self.upload_large_file(&bucket, source, file_name, modified_millis, plan)
                    .await
            }
            None => {
                self.upload_small_file(&bucket, source, file_name, size, modified_millis)
                    .await
            }
        }
    }

    fn large_file_plan(&self, size: u64, recommended: u64) -> B2Result<Option<UploadPlan>> {
        if recommended == 0 || size <= recommended {
            return Ok(None);
        }
        let plan = self.planner.plan(size, recommended)?;
        Ok((plan.part_count() >= 2).then_some(plan))
    }

    async fn upload_small_file(
        &self,
        bucket: &Bucket,
        source: &Path,
        file_name: &str,
        size: u64,
        modified_millis: i64,
    ) -> B2Result<File> {
        let (sha1, len) = checksums::sha1_file(source).await?;
        if len != size {
            return Err(B2Error::InvalidArgument(format!(
                "{} changed size while hashing",
                source.display()
            )));
        }

        let url = self.client.get_upload_url(&bucket.id).await?;
        let reader = tokio::fs::File::open(source).await?.take(len);
        info!(bucket = %bucket.name, file_name, size, "Uploading file");

        let response = self
            .client
            .http()
            .post(&url.upload_url)
            .header(reqwest::header::AUTHORIZATION, &url.authorization_token)
            .header(FILE_NAME_HEADER, encode_file_name(file_name))
            .header(reqwest::header::CONTENT_TYPE, AUTO_CONTENT_TYPE)
            .header(reqwest::header::CONTENT_LENGTH, len)
            .header(CONTENT_SHA1_HEADER, &sha1)
            .header(SRC_LAST_MODIFIED_HEADER, modified_millis)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(reader)))
            .send()
            .await
            .map_err(B2Error::transport)?;
        let file: File = decode(response).await?;

        debug!(file_id = %file.file_id, "Uploaded file");
        Ok(file)
    }

    async fn upload_large_file(
        &self,
        bucket: &Bucket,
        source: &Path,
        file_name: &str,
        modified_millis: i64,
        plan: UploadPlan,
    ) -> B2Result<File> {
        let (whole_sha1, _) = checksums::sha1_file(source).await?;
        info!(
            bucket = %bucket.name,
            file_name,
            size = plan.file_size(),
            part_size = plan.part_size(),
            part_count = plan.part_count(),
            "Uploading large file"
        );

        let input = StartLargeFileInput {
            bucket_id: bucket.id.clone(),
            file_name: file_name.to_owned(),
            content_type: AUTO_CONTENT_TYPE.to_owned(),
            file_info: BTreeMap::from([
                (SRC_LAST_MODIFIED_MILLIS.to_owned(), modified_millis.to_string()),
                (LARGE_FILE_SHA1.to_owned(), whole_sha1),
            ]),
        };
        let mut upload = LargeFileUpload::start(&self.client, input).await?;

        let uploader: Arc<dyn PartUpload> = Arc::new(ChunkUploader::new(
            self.client.clone(),
            source,
            upload.file_id(),
        ));
        let outcome = match self.coordinator.upload(source, &plan, uploader).await {
            Ok(part_sha1_array) => upload.finish(&self.client, part_sha1_array).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(file) => Ok(file),
            Err(e) => Err(upload.abandon(&self.client, e).await),
        }
    }
}
