//! Upload of a single large-file part.

use std::fmt::Debug;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use rustb2_core::{B2Error, B2Result};
use rustb2_model::{FilePart, UploadPartUrl};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Mutex;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::client::{B2Client, decode};
use crate::large_file::AUTO_CONTENT_TYPE;

/// Header carrying the 1-based part number.
pub const PART_NUMBER_HEADER: &str = "X-Bz-Part-Number";

/// Header carrying the hex SHA1 of the request body.
pub const CONTENT_SHA1_HEADER: &str = "X-Bz-Content-Sha1";

/// One part of the source file, hashed and ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Part number, starting at 1.
    pub part_number: u32,
    /// Offset of the first byte in the source file.
    pub offset: u64,
    /// Number of bytes in the part.
    pub len: u64,
    /// Hex SHA1 of the part's bytes.
    pub sha1: String,
}

/// Uploads one chunk and returns the server's confirmation.
#[async_trait::async_trait]
pub trait PartUpload: Send + Sync + Debug {
    /// Upload `chunk`.
    async fn upload_part(&self, chunk: &Chunk) -> B2Result<FilePart>;
}

/// Uploads the parts of one large file.
///
/// The file-scoped upload URL is requested on first use and shared by all
/// parts of the file until a part fails with a retryable error; the service
/// expects a fresh URL after that, so the failed URL is dropped. Each call
/// opens its own handle on the source file, so concurrent parts never contend
/// on a file position.
#[derive(Debug)]
pub struct ChunkUploader {
    client: B2Client,
    path: PathBuf,
    file_id: String,
    upload_url: Mutex<Option<UploadPartUrl>>,
}

impl ChunkUploader {
    /// Create an uploader for the large file `file_id` read from `path`.
    #[must_use]
    pub fn new(client: B2Client, path: impl Into<PathBuf>, file_id: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            file_id: file_id.into(),
            upload_url: Mutex::new(None),
        }
    }

    /// The source file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The large file parts are uploaded to.
    #[must_use]
    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    async fn upload_url(&self) -> B2Result<UploadPartUrl> {
        let mut slot = self.upload_url.lock().await;
        if let Some(url) = slot.as_ref() {
            return Ok(url.clone());
        }
        let url = self.client.get_upload_part_url(&self.file_id).await?;
        if url.file_id != self.file_id {
            return Err(B2Error::Internal(anyhow::anyhow!(
                "upload URL issued for file {} instead of {}",
                url.file_id,
                self.file_id
            )));
        }
        debug!(file_id = %self.file_id, "Obtained part upload URL");
        *slot = Some(url.clone());
        Ok(url)
    }

    /// Forget `stale` so the next part requests a new upload URL.
    ///
    /// A URL that already replaced `stale` is kept.
    pub async fn reset_upload_url(&self, stale: &UploadPartUrl) {
        let mut slot = self.upload_url.lock().await;
        if slot.as_ref() == Some(stale) {
            *slot = None;
            debug!(file_id = %self.file_id, "Dropped part upload URL");
        }
    }

    async fn body(&self, chunk: &Chunk) -> B2Result<reqwest::Body> {
        let mut file = tokio::fs::File::open(&self.path).await?;
        file.seek(SeekFrom::Start(chunk.offset)).await?;
        Ok(reqwest::Body::wrap_stream(ReaderStream::new(file.take(chunk.len))))
    }

    async fn send(&self, url: &UploadPartUrl, chunk: &Chunk) -> B2Result<FilePart> {
        let body = self.body(chunk).await?;

        debug!(
            file_id = %self.file_id,
            part_number = chunk.part_number,
            offset = chunk.offset,
            len = chunk.len,
            "Uploading part"
        );
        let response = self
            .client
            .http()
            .post(&url.upload_url)
            .header(reqwest::header::AUTHORIZATION, &url.authorization_token)
            .header(reqwest::header::CONTENT_TYPE, AUTO_CONTENT_TYPE)
            .header(reqwest::header::CONTENT_LENGTH, chunk.len)
            .header(PART_NUMBER_HEADER, chunk.part_number)
            .header(CONTENT_SHA1_HEADER, &chunk.sha1)
            .body(body)
            .send()
            .await
            .map_err(B2Error::transport)?;
        decode(response).await
    }
}

#[async_trait::async_trait]
impl PartUpload for ChunkUploader {
    async fn upload_part(&self, chunk: &Chunk) -> B2Result<FilePart> {
        let url = self.upload_url().await?;
        let part = match self.send(&url, chunk).await {
            Ok(part) => part,
            Err(e) => {
                if e.is_retryable() {
                    self.reset_upload_url(&url).await;
                }
                return Err(e);
            }
        };

        verify(chunk, &part)?;
        debug!(file_id = %self.file_id, part_number = part.part_number, "Uploaded part");
        Ok(part)
    }
}

/// Compare the server's confirmation against what was sent.
pub fn verify(chunk: &Chunk, part: &FilePart) -> B2Result<()> {
    if part.part_number != chunk.part_number {
        return Err(B2Error::PartNumberMismatch {
            expected: chunk.part_number,
            actual: part.part_number,
        });
    }
    if !part.content_sha1.eq_ignore_ascii_case(&chunk.sha1) {
        return Err(B2Error::ChecksumMismatch {
            part_number: chunk.part_number,
            expected: chunk.sha1.clone(),
            actual: part.content_sha1.clone(),
        });
    }
    Ok(())
}
