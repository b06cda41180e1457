use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use marigold_workflow::ArtifactValue;
use tracing::debug;

use crate::error::StepError;
use crate::input::StepInput;

/// Writes the given files into a gzip-compressed tar archive.
///
/// Entries are named after the source path with any root stripped, so
/// `/tmp/backup/a.txt` is stored as `tmp/backup/a.txt`. Fails if any input
/// file is unreadable; a partially written archive is removed.
#[derive(Debug, Clone)]
pub struct ArchiveFiles {
  id: String,
}

impl ArchiveFiles {
  pub fn new(id: impl Into<String>) -> Self {
    Self { id: id.into() }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub async fn execute(&self, input: &StepInput) -> Result<ArtifactValue, StepError> {
    let files = input.list("files")?.to_vec();
    let archive = input.text("archive")?.to_string();

    let target = PathBuf::from(&archive);
    let count = files.len();
    tokio::task::spawn_blocking(move || {
      write_archive(&files, &target).inspect_err(|_| {
        let _ = fs::remove_file(&target);
      })
    })
    .await??;

    debug!(step_id = %self.id, archive = %archive, count, "archive written");
    Ok(ArtifactValue::Text(archive))
  }
}

fn write_archive(files: &[String], archive: &Path) -> Result<(), StepError> {
  let archive_display = archive.display().to_string();

  if let Some(parent) = archive.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).map_err(StepError::io(parent.display().to_string()))?;
  }

  let file = File::create(archive).map_err(StepError::io(archive_display.as_str()))?;
  let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

  for path in files {
    let mut source = File::open(path).map_err(StepError::io(path.as_str()))?;
    builder
      .append_file(entry_name(path), &mut source)
      .map_err(StepError::io(path.as_str()))?;
  }

  let encoder = builder
    .into_inner()
    .map_err(StepError::io(archive_display.as_str()))?;
  encoder
    .finish()
    .map_err(StepError::io(archive_display.as_str()))?;
  Ok(())
}

fn entry_name(path: &str) -> PathBuf {
  Path::new(path)
    .components()
    .filter(|component| matches!(component, Component::Normal(_)))
    .collect()
}
