//! Downloading a file by bucket and name.

use std::io;
use std::path::Path;

use rustb2_core::{B2Error, B2Result};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::client::{B2Client, check_response};
use crate::upload::encode_file_name;

/// URL of `file_name` in `bucket` under a session's download URL.
#[must_use]
pub fn download_url(base: &str, bucket: &str, file_name: &str) -> String {
    format!(
        "{}/file/{}/{}",
        base.trim_end_matches('/'),
        bucket,
        encode_file_name(file_name)
    )
}

fn temp_file_beside(destination: &Path) -> io::Result<tempfile::NamedTempFile> {
    let dir = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    tempfile::Builder::new()
        .prefix(".rustb2-")
        .suffix(".part")
        .tempfile_in(dir)
}

impl B2Client {
    /// Stream `bucket/file_name` into `destination`, returning the byte count.
    ///
    /// The body is streamed into a temporary file next to `destination` and
    /// renamed over it only once the whole body arrived. A failed download
    /// leaves any existing `destination` untouched; the temporary file is
    /// removed when it is dropped.
    pub async fn download_file_by_name(
        &self,
        bucket: &str,
        file_name: &str,
        destination: &Path,
    ) -> B2Result<u64> {
        let written = self
            .with_session(|session| async move {
                let url = download_url(session.download_url(), bucket, file_name);
                let response = self
                    .http()
                    .get(&url)
                    .header(reqwest::header::AUTHORIZATION, session.authorization_token())
                    .send()
                    .await
                    .map_err(B2Error::transport)?;
                let mut response = check_response(response).await?;

                let temp = temp_file_beside(destination)?;
                let mut out = tokio::fs::File::from_std(temp.as_file().try_clone()?);
                let mut written = 0u64;
                while let Some(bytes) = response.chunk().await.map_err(B2Error::transport)? {
                    out.write_all(&bytes).await?;
                    written += bytes.len() as u64;
                }
                out.sync_all().await?;
                drop(out);

                temp.persist(destination).map_err(io::Error::from)?;
                Ok(written)
            })
            .await?;

        info!(bucket, file_name, bytes = written, "Downloaded file");
        Ok(written)
    }
}
