//! B2 API client and large-file upload pipeline.
//!
//! [`B2Client`] issues authorized calls against the B2 v2 API, re-authorizing
//! once when the service reports an expired token. On top of it:
//!
//! - [`BucketResolver`] maps bucket names to IDs.
//! - [`LargeFileUpload`] tracks the start/finish/cancel bracket of one
//!   multipart upload.
//! - [`ChunkPlanner`] partitions a file into at most 10 000 parts.
//! - [`UploadCoordinator`] hashes and uploads parts with a bounded worker
//!   pool through a [`PartUpload`] implementation such as [`ChunkUploader`].
//! - [`Uploader`] ties the pieces together and falls back to a single request
//!   for small files.

pub mod bucket;
pub mod checksums;
pub mod chunk;
pub mod client;
pub mod coordinator;
pub mod download;
pub mod large_file;
pub mod planner;
pub mod upload;

pub use bucket::BucketResolver;
pub use chunk::{Chunk, ChunkUploader, PartUpload};
pub use client::{AccountAuthorizer, B2Client, LargeFileApi};
pub use coordinator::UploadCoordinator;
pub use large_file::{LargeFileState, LargeFileUpload};
pub use planner::{ChunkPlanner, ChunkRange, UploadPlan};
pub use upload::{Destination, Uploader};
