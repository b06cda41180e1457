use marigold_workflow::{ArtifactValue, LockedStep, StepKind};

use crate::archive_files::ArchiveFiles;
use crate::context::StepContext;
use crate::error::StepError;
use crate::handle_error::HandleError;
use crate::input::StepInput;
use crate::put_to_store::PutToStore;
use crate::read_directory::ReadDirectory;

/// An executable step, one variant per [`StepKind`].
#[derive(Debug, Clone)]
pub enum Step {
  ReadDirectory(ReadDirectory),
  ArchiveFiles(ArchiveFiles),
  PutToStore(PutToStore),
  HandleError(HandleError),
}

impl Step {
  pub fn instantiate(step: &LockedStep) -> Self {
    let id = step.step_id.clone();
    match step.kind {
      StepKind::ReadDirectory => Step::ReadDirectory(ReadDirectory::new(id)),
      StepKind::ArchiveFiles => Step::ArchiveFiles(ArchiveFiles::new(id)),
      StepKind::PutToStore => Step::PutToStore(PutToStore::new(id)),
      StepKind::HandleError => Step::HandleError(HandleError::new(id)),
    }
  }

  pub fn id(&self) -> &str {
    match self {
      Step::ReadDirectory(step) => step.id(),
      Step::ArchiveFiles(step) => step.id(),
      Step::PutToStore(step) => step.id(),
      Step::HandleError(step) => step.id(),
    }
  }

  pub fn kind(&self) -> StepKind {
    match self {
      Step::ReadDirectory(_) => StepKind::ReadDirectory,
      Step::ArchiveFiles(_) => StepKind::ArchiveFiles,
      Step::PutToStore(_) => StepKind::PutToStore,
      Step::HandleError(_) => StepKind::HandleError,
    }
  }

  /// Run the step. Returns the produced artifact for variants that
  /// produce one.
  pub async fn execute(
    &self,
    ctx: &StepContext<'_>,
    input: &StepInput,
  ) -> Result<Option<ArtifactValue>, StepError> {
    match self {
      Step::ReadDirectory(step) => step.execute(input).await.map(Some),
      Step::ArchiveFiles(step) => step.execute(input).await.map(Some),
      Step::PutToStore(step) => step.execute(ctx, input).await.map(|()| None),
      Step::HandleError(step) => step.execute(ctx, input).await.map(|()| None),
    }
  }
}
