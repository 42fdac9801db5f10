//! SHA1 helpers for whole files and byte ranges.
//!
//! B2 verifies every upload against a hex-encoded SHA1 sent in the
//! `X-Bz-Content-Sha1` header. Files are hashed by streaming through a fixed
//! buffer so parts of any size never have to be held in memory.

use std::path::Path;

use rustb2_core::{B2Error, B2Result};
use sha1::{Digest, Sha1};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Hex-encoded SHA1 of `data`.
#[must_use]
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// Hex-encoded SHA1 of `len` bytes of `path` starting at `offset`.
///
/// Fails if the file ends before `len` bytes were read.
pub async fn sha1_file_range(path: &Path, offset: u64, len: u64) -> B2Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    file.seek(std::io::SeekFrom::Start(offset)).await?;
    let mut reader = file.take(len);

    let (digest, read) = hash_reader(&mut reader).await?;
    if read != len {
        return Err(B2Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!(
                "{} ended after {read} of {len} bytes at offset {offset}",
                path.display()
            ),
        )));
    }
    Ok(digest)
}

/// Hex-encoded SHA1 of a whole file, together with its length.
pub async fn sha1_file(path: &Path) -> B2Result<(String, u64)> {
    let mut file = tokio::fs::File::open(path).await?;
    hash_reader(&mut file).await
}

async fn hash_reader<R>(reader: &mut R) -> B2Result<(String, u64)>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    Ok((hex::encode(hasher.finalize()), total))
}
