//! rustb2 - upload and download files to and from B2 cloud storage.
//!
//! # Usage
//!
//! ```text
//! rustb2 put <source> <bucket>[/<name>]
//! rustb2 get <bucket>/<name> <destination>
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `B2_KEY_ID` | *(required)* | Application key ID |
//! | `B2_KEY_SECRET` | *(required)* | Application key |
//! | `B2_AUTH_URL` | `https://api.backblazeb2.com/` | Authorization endpoint |
//! | `B2_NO_CACHE` | *(unset)* | Keep the session in memory only |
//! | `B2_CACHE_DIR` | `$XDG_CACHE_HOME/b2` | Session cache directory |
//! | `B2_UPLOAD_WORKERS` | `4` | Concurrent part uploads |
//! | `B2_PART_RETRIES` | `0` | Re-sends per part after a retryable error |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustb2_client::{B2Client, Uploader};
use rustb2_core::B2Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Command-line arguments. Credentials and tuning come from the environment.
#[derive(Parser, Debug)]
#[command(author, version, about = "Upload and download files to and from B2 cloud storage")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Upload a local file
    Put {
        /// Local file to upload
        source: PathBuf,
        /// `<bucket>[/<name>]`; a trailing `/` keeps the source file name
        destination: String,
    },
    /// Download a file by name
    Get {
        /// `<bucket>/<name>` of the remote file
        remote: RemoteFile,
        /// Local file to write
        destination: PathBuf,
    },
}

/// A `<bucket>/<name>` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RemoteFile {
    bucket: String,
    file_name: String,
}

impl FromStr for RemoteFile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_once('/')
            .filter(|(b, f)| !b.is_empty() && !f.is_empty())
            .map(|(bucket, file_name)| Self {
                bucket: bucket.to_owned(),
                file_name: file_name.to_owned(),
            })
            .ok_or_else(|| format!("expected <bucket>/<name>, got {s:?}"))
    }
}

async fn put(client: B2Client, config: &B2Config, source: &Path, destination: &str) -> Result<()> {
    let file = Uploader::from_config(client, config)
        .upload(source, destination)
        .await
        .with_context(|| format!("failed to upload {}", source.display()))?;
    info!(file_id = %file.file_id, file_name = %file.file_name, "Upload complete");
    println!("{}", file.file_id);
    Ok(())
}

async fn get(client: &B2Client, bucket: &str, file_name: &str, destination: &Path) -> Result<()> {
    let bytes = client
        .download_file_by_name(bucket, file_name, destination)
        .await
        .with_context(|| format!("failed to download {bucket}/{file_name}"))?;
    info!(bytes, destination = %destination.display(), "Download complete");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = B2Config::from_env();
    init_tracing(&config.log_level)?;

    let client = B2Client::from_config(&config).context("failed to create B2 client")?;

    match cli.command {
        Command::Put {
            source,
            destination,
        } => put(client, &config, &source, &destination).await,
        Command::Get {
            remote,
            destination,
        } => get(&client, &remote.bucket, &remote.file_name, &destination).await,
    }
}
