//! The start/finish/cancel bracket around a multipart upload.
//!
//! A [`LargeFileUpload`] is created by a successful start call and then moves
//! exactly once, either to `Finished` or to `Cancelled`. Any other transition
//! is rejected locally with [`B2Error::InvalidLifecycle`] before reaching the
//! service.

use std::fmt;

use rustb2_core::{B2Error, B2Result};
use rustb2_model::File;
use rustb2_model::input::StartLargeFileInput;
use rustb2_model::output::CancelLargeFileOutput;
use tracing::{debug, info, warn};

use crate::client::LargeFileApi;

/// Content type asking the service to detect the MIME type.
pub const AUTO_CONTENT_TYPE: &str = "b2/x-auto";

/// `fileInfo` key holding the source modification time in milliseconds.
pub const SRC_LAST_MODIFIED_MILLIS: &str = "src_last_modified_millis";

/// `fileInfo` key holding the SHA1 of the whole large file.
pub const LARGE_FILE_SHA1: &str = "large_file_sha1";

/// Where a large file is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LargeFileState {
    /// Parts may be uploaded.
    Started,
    /// Parts were assembled into the final file.
    Finished,
    /// The file and its parts were discarded.
    Cancelled,
}

impl LargeFileState {
    /// Lowercase state name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LargeFileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote large file that was started and not yet finished or cancelled.
#[derive(Debug)]
pub struct LargeFileUpload {
    file_id: String,
    bucket_id: String,
    file_name: String,
    state: LargeFileState,
}

impl LargeFileUpload {
    /// Issue `b2_start_large_file`.
    pub async fn start(api: &dyn LargeFileApi, input: StartLargeFileInput) -> B2Result<Self> {
        let file = api.start_large_file(&input).await?;
        info!(
            file_id = %file.file_id,
            bucket_id = %input.bucket_id,
            file_name = %input.file_name,
            "Started large file"
        );
        Ok(Self {
            file_id: file.file_id,
            bucket_id: input.bucket_id,
            file_name: input.file_name,
            state: LargeFileState::Started,
        })
    }

    /// The remote file ID.
    #[must_use]
    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LargeFileState {
        self.state
    }

    /// Issue `b2_finish_large_file` with one SHA1 per part, in part order.
    ///
    /// A rejected finish leaves the upload `Started` so it can still be
    /// cancelled.
    pub async fn finish(
        &mut self,
        api: &dyn LargeFileApi,
        part_sha1_array: Vec<String>,
    ) -> B2Result<File> {
        self.ensure_started("finish")?;
        let parts = part_sha1_array.len();
        let file = api.finish_large_file(&self.file_id, part_sha1_array).await?;
        self.state = LargeFileState::Finished;
        info!(
            file_id = %self.file_id,
            bucket_id = %self.bucket_id,
            file_name = %self.file_name,
            parts,
            "Finished large file"
        );
        Ok(file)
    }

    /// Issue `b2_cancel_large_file`.
    pub async fn cancel(&mut self, api: &dyn LargeFileApi) -> B2Result<CancelLargeFileOutput> {
        self.ensure_started("cancel")?;
        let output = api.cancel_large_file(&self.file_id).await?;
        self.state = LargeFileState::Cancelled;
        info!(file_id = %self.file_id, file_name = %self.file_name, "Cancelled large file");
        Ok(output)
    }

    /// Cancel after `cause` aborted the upload and return the error to report.
    ///
    /// When the cancel call fails too, both errors are kept.
    pub async fn abandon(&mut self, api: &dyn LargeFileApi, cause: B2Error) -> B2Error {
        warn!(file_id = %self.file_id, error = %cause, "Upload failed, cancelling large file");
        match self.cancel(api).await {
            Ok(_) => cause,
            Err(cancel) => B2Error::CancelFailed {
                upload: Box::new(cause),
                cancel: Box::new(cancel),
            },
        }
    }

    fn ensure_started(&self, operation: &'static str) -> B2Result<()> {
        if self.state == LargeFileState::Started {
            return Ok(());
        }
        debug!(
            file_id = %self.file_id,
            state = %self.state,
            operation,
            "Rejected lifecycle transition"
        );
        Err(B2Error::InvalidLifecycle {
            file_id: self.file_id.clone(),
            state: self.state.as_str(),
            operation,
        })
    }
}

impl Drop for LargeFileUpload {
    fn drop(&mut self) {
        if self.state == LargeFileState::Started {
            warn!(
                file_id = %self.file_id,
                file_name = %self.file_name,
                "Large file dropped while still started"
            );
        }
    }
}
