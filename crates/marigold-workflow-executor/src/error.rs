//! Error types for workflow execution.

use marigold_workflow::WorkflowError;
use thiserror::Error;

/// Errors that prevent a run from starting.
///
/// Step failures are not errors here; they are recorded in the run's
/// [`RunOutcome`](crate::RunOutcome).
#[derive(Debug, Error)]
pub enum ExecutionError {
  /// Workflow graph is invalid.
  #[error("invalid workflow graph: {message}")]
  InvalidGraph { message: String },

  /// The initial input does not satisfy the workflow's variables.
  #[error("invalid run input: {0}")]
  InvalidInput(#[from] WorkflowError),
}
