use std::path::Path;

use futures::StreamExt;
use marigold_object_store::{ByteStream, Error as StoreError};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::context::StepContext;
use crate::error::StepError;
use crate::input::StepInput;

/// Uploads each listed file to a bucket, keyed by its path.
///
/// Uploads run in list order and stop at the first failure; objects already
/// written stay in the bucket.
#[derive(Debug, Clone)]
pub struct PutToStore {
  id: String,
}

impl PutToStore {
  pub fn new(id: impl Into<String>) -> Self {
    Self { id: id.into() }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub async fn execute(&self, ctx: &StepContext<'_>, input: &StepInput) -> Result<(), StepError> {
    let bucket = input.text("bucket")?;
    let files = input.list("files")?;
    let region = input.optional_text("region")?;
    let store = &ctx.capabilities.object_store;

    for path in files {
      let file = File::open(path).await.map_err(StepError::io(path.as_str()))?;
      let data: ByteStream = Box::pin(ReaderStream::new(file).map(|chunk| chunk.map_err(StoreError::Io)));

      store
        .put_object(bucket, path, data, content_type(path))
        .await?;
      debug!(step_id = %self.id, bucket, key = %path, "object uploaded");
    }

    info!(
      step_id = %self.id,
      bucket,
      region = region.unwrap_or_default(),
      count = files.len(),
      "files uploaded"
    );
    Ok(())
  }
}

fn content_type(path: &str) -> &'static str {
  match Path::new(path).extension().and_then(|ext| ext.to_str()) {
    Some("gz") | Some("tgz") => "application/gzip",
    Some("txt") => "text/plain",
    Some("json") => "application/json",
    _ => "application/octet-stream",
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing;
  use marigold_workflow::ArtifactValue;

  async fn read_object(ctx: &StepContext<'_>, bucket: &str, key: &str) -> Vec<u8> {
    let mut stream = ctx.capabilities.object_store.get_object(bucket, key).await.unwrap();
    let mut data = Vec::new();
    while let Some(chunk) = stream.next().await {
      data.extend_from_slice(&chunk.unwrap());
    }
    data
  }

  #[tokio::test]
  async fn test_uploads_files_keyed_by_path() {
    let temp = tempfile::tempdir().unwrap();
    let (capabilities, _reports) = testing::capabilities(&temp.path().join("store"));
    capabilities
      .object_store
      .create_bucket("backups", "us-east-1")
      .await
      .unwrap();

    let file = temp.path().join("backup.tar.gz");
    std::fs::write(&file, b"archive bytes").unwrap();
    let key = file.display().to_string();

    let ctx = StepContext {
      execution_id: "exec-1",
      workflow_id: "wf",
      capabilities: &capabilities,
    };
    let input = StepInput::new()
      .with("bucket", ArtifactValue::Text("backups".to_string()))
      .with("files", ArtifactValue::List(vec![key.clone()]))
      .with("region", ArtifactValue::Text("us-east-1".to_string()));

    PutToStore::new("upload").execute(&ctx, &input).await.unwrap();
    assert_eq!(read_object(&ctx, "backups", &key).await, b"archive bytes");
  }

  #[tokio::test]
  async fn test_missing_bucket_fails() {
    let temp = tempfile::tempdir().unwrap();
    let (capabilities, _reports) = testing::capabilities(&temp.path().join("store"));
    let file = temp.path().join("a.txt");
    std::fs::write(&file, "a").unwrap();

    let ctx = StepContext {
      execution_id: "exec-1",
      workflow_id: "wf",
      capabilities: &capabilities,
    };
    let input = StepInput::new()
      .with("bucket", ArtifactValue::Text("nowhere".to_string()))
      .with("files", ArtifactValue::List(vec![file.display().to_string()]));

    let err = PutToStore::new("upload").execute(&ctx, &input).await.unwrap_err();
    assert!(matches!(err, StepError::Store(StoreError::BucketNotFound(ref b)) if b == "nowhere"));
    assert!(err.class().is_retryable());
  }

  #[test]
  fn test_content_type_by_extension() {
    assert_eq!(content_type("/tmp/backup.tar.gz"), "application/gzip");
    assert_eq!(content_type("notes.txt"), "text/plain");
    assert_eq!(content_type("blob"), "application/octet-stream");
  }
}
