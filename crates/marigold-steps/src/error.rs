use marigold_workflow::ValueType;
use serde::{Deserialize, Serialize};

/// Whether a step failure is worth re-running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
  /// The work itself failed (missing file, store rejected an upload,
  /// timeout). Re-running the workflow may succeed.
  Business,
  /// The step was handed input that does not match its declared slots.
  /// This is a programming defect and never retryable.
  ContractViolation,
}

impl FailureClass {
  pub fn is_retryable(&self) -> bool {
    matches!(self, FailureClass::Business)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum StepError {
  #[error("type mismatch for slot '{slot}': expected {expected}, got {actual}")]
  TypeMismatch {
    slot: String,
    expected: ValueType,
    actual: ValueType,
  },

  #[error("missing input for slot '{slot}'")]
  MissingInput { slot: String },

  #[error("failed to read directory '{path}': {message}")]
  ReadDirectory { path: String, message: String },

  #[error("io error on '{path}': {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("object store error: {0}")]
  Store(#[from] marigold_object_store::Error),

  #[error("step task aborted: {0}")]
  Join(#[from] tokio::task::JoinError),
}

impl StepError {
  pub fn class(&self) -> FailureClass {
    match self {
      StepError::TypeMismatch { .. } | StepError::MissingInput { .. } => {
        FailureClass::ContractViolation
      }
      _ => FailureClass::Business,
    }
  }

  pub(crate) fn io(path: impl Into<String>) -> impl FnOnce(std::io::Error) -> StepError {
    let path = path.into();
    move |source| StepError::Io { path, source }
  }
}
