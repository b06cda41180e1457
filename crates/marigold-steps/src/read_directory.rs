use marigold_workflow::ArtifactValue;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::StepError;
use crate::input::StepInput;

/// Enumerates regular files under a directory, recursively. Read-only.
#[derive(Debug, Clone)]
pub struct ReadDirectory {
  id: String,
}

impl ReadDirectory {
  pub fn new(id: impl Into<String>) -> Self {
    Self { id: id.into() }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub async fn execute(&self, input: &StepInput) -> Result<ArtifactValue, StepError> {
    let directory = input.text("directory")?.to_string();
    let files = tokio::task::spawn_blocking(move || collect_files(&directory)).await??;

    debug!(step_id = %self.id, count = files.len(), "directory listed");
    Ok(ArtifactValue::List(files))
  }
}

fn collect_files(directory: &str) -> Result<Vec<String>, StepError> {
  let mut files = Vec::new();
  for entry in WalkDir::new(directory).sort_by_file_name() {
    let entry = entry.map_err(|e| StepError::ReadDirectory {
      path: directory.to_string(),
      message: e.to_string(),
    })?;
    if entry.file_type().is_file() {
      files.push(entry.path().to_string_lossy().into_owned());
    }
  }
  Ok(files)
}
