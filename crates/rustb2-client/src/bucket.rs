//! Bucket name to ID resolution.

use rustb2_core::{B2Error, B2Result};
use rustb2_model::Bucket;
use tracing::debug;

use crate::client::B2Client;

/// Looks buckets up by name.
///
/// Lookups are not cached; every upload resolves its bucket once.
#[derive(Debug, Clone)]
pub struct BucketResolver {
    client: B2Client,
}

impl BucketResolver {
    /// Create a resolver backed by `client`.
    #[must_use]
    pub fn new(client: B2Client) -> Self {
        Self { client }
    }

    /// Find the bucket called `name`.
    pub async fn resolve(&self, name: &str) -> B2Result<Bucket> {
        let buckets = self.client.list_buckets(Some(name)).await?;
        let bucket = select(buckets, name)?;
        debug!(bucket = %bucket.name, bucket_id = %bucket.id, "Resolved bucket");
        Ok(bucket)
    }
}

fn select(buckets: Vec<Bucket>, name: &str) -> B2Result<Bucket> {
    buckets
        .into_iter()
        .find(|b| b.name == name)
        .ok_or_else(|| B2Error::BucketNotFound {
            name: name.to_owned(),
        })
}
