//! Marigold Object Store
//!
//! This crate provides the object store client capability used by marigold
//! for bucket provisioning and uploads.
//!
//! The [`ObjectStore`] trait defines the backend layer. Implementations
//! handle the actual storage (filesystem, a cloud provider, etc.) and are
//! injected into the engine at construction time rather than hard-wired.
//!
//! Object bodies are streamed so large files are never buffered whole.

mod fs;

pub use fs::FsObjectStore;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

/// A boxed stream of bytes for object data.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send>>;

/// Error type for object store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The requested object was not found.
  #[error("object not found: {bucket}/{key}")]
  NotFound { bucket: String, key: String },

  #[error("bucket not found: {0}")]
  BucketNotFound(String),

  #[error("bucket already exists: {0}")]
  BucketAlreadyExists(String),

  /// Bucket name or object key that the backend cannot represent.
  #[error("invalid name: {0}")]
  InvalidName(String),

  /// An I/O error occurred.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Provider-side description of a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
  pub name: String,
  pub region: String,
  /// Provider-assigned identifier (an ARN, a URL, a path).
  pub location: String,
}

/// Object store client capability.
///
/// `create_bucket` is not idempotent: creating a bucket that already exists
/// fails with [`Error::BucketAlreadyExists`]. Callers wanting
/// create-if-absent semantics check [`ObjectStore::bucket_exists`] first.
#[async_trait]
pub trait ObjectStore: Send + Sync {
  async fn bucket_exists(&self, bucket: &str) -> Result<bool, Error>;

  async fn create_bucket(&self, bucket: &str, region: &str) -> Result<BucketInfo, Error>;

  /// Describe an existing bucket.
  async fn bucket_info(&self, bucket: &str) -> Result<BucketInfo, Error>;

  /// Store an object, replacing any object with the same key.
  async fn put_object(
    &self,
    bucket: &str,
    key: &str,
    data: ByteStream,
    content_type: &str,
  ) -> Result<(), Error>;

  /// Retrieve an object as a stream of bytes.
  async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteStream, Error>;
}
