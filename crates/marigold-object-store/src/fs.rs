use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::{BucketInfo, ByteStream, Error, ObjectStore};

const OBJECTS_DIR: &str = "objects";
const REGION_FILE: &str = "region";

/// Filesystem-based object store.
///
/// Buckets are directories under the base path:
/// ```text
/// {base_path}/
/// └── my-bucket/
///     ├── region
///     └── objects/
///         └── tmp/backup/a.txt
/// ```
/// Object keys are mapped to relative paths; leading separators are dropped
/// and `..` components are rejected.
pub struct FsObjectStore {
  base_path: PathBuf,
}

impl FsObjectStore {
  /// Create a new filesystem store with the given base path.
  pub fn new(base_path: impl Into<PathBuf>) -> Self {
    Self {
      base_path: base_path.into(),
    }
  }

  pub fn base_path(&self) -> &Path {
    &self.base_path
  }

  fn bucket_path(&self, bucket: &str) -> Result<PathBuf, Error> {
    let valid = !bucket.is_empty()
      && !bucket.starts_with('.')
      && !bucket.contains(['/', '\\']);
    if !valid {
      return Err(Error::InvalidName(bucket.to_string()));
    }
    Ok(self.base_path.join(bucket))
  }

  fn key_to_path(&self, bucket: &str, key: &str) -> Result<PathBuf, Error> {
    let mut relative = PathBuf::new();
    for component in Path::new(key).components() {
      match component {
        Component::Normal(part) => relative.push(part),
        Component::ParentDir => return Err(Error::InvalidName(key.to_string())),
        Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
      }
    }
    if relative.as_os_str().is_empty() {
      return Err(Error::InvalidName(key.to_string()));
    }
    Ok(self.bucket_path(bucket)?.join(OBJECTS_DIR).join(relative))
  }

  async fn require_bucket(&self, bucket: &str) -> Result<PathBuf, Error> {
    let path = self.bucket_path(bucket)?;
    if !fs::try_exists(&path).await? {
      return Err(Error::BucketNotFound(bucket.to_string()));
    }
    Ok(path)
  }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
  async fn bucket_exists(&self, bucket: &str) -> Result<bool, Error> {
    let path = self.bucket_path(bucket)?;
    Ok(fs::try_exists(&path).await?)
  }

  async fn create_bucket(&self, bucket: &str, region: &str) -> Result<BucketInfo, Error> {
    let path = self.bucket_path(bucket)?;
    fs::create_dir_all(&self.base_path).await?;

    fs::create_dir(&path).await.map_err(|e| {
      if e.kind() == std::io::ErrorKind::AlreadyExists {
        Error::BucketAlreadyExists(bucket.to_string())
      } else {
        Error::Io(e)
      }
    })?;
    fs::create_dir(path.join(OBJECTS_DIR)).await?;
    fs::write(path.join(REGION_FILE), region).await?;

    debug!(bucket = %bucket, region = %region, "bucket created");

    Ok(BucketInfo {
      name: bucket.to_string(),
      region: region.to_string(),
      location: path.display().to_string(),
    })
  }

  async fn bucket_info(&self, bucket: &str) -> Result<BucketInfo, Error> {
    let path = self.require_bucket(bucket).await?;
    let region = match fs::read_to_string(path.join(REGION_FILE)).await {
      Ok(region) => region,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
      Err(e) => return Err(e.into()),
    };

    Ok(BucketInfo {
      name: bucket.to_string(),
      region,
      location: path.display().to_string(),
    })
  }

  async fn put_object(
    &self,
    bucket: &str,
    key: &str,
    data: ByteStream,
    _content_type: &str,
  ) -> Result<(), Error> {
    self.require_bucket(bucket).await?;
    let path = self.key_to_path(bucket, key)?;

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).await?;
    }

    let mut file = File::create(path).await?;
    let mut stream = std::pin::pin!(data);

    while let Some(chunk) = stream.next().await {
      let bytes = chunk?;
      file.write_all(&bytes).await?;
    }

    file.flush().await?;
    Ok(())
  }

  async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteStream, Error> {
    self.require_bucket(bucket).await?;
    let path = self.key_to_path(bucket, key)?;
    let file = File::open(&path).await.map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        Error::NotFound {
          bucket: bucket.to_string(),
          key: key.to_string(),
        }
      } else {
        Error::Io(e)
      }
    })?;
    let stream = ReaderStream::new(file).map(|r| r.map_err(Error::Io));
    Ok(Box::pin(stream))
  }
}
