//! Workflow run results.

use chrono::{DateTime, Utc};
use marigold_steps::FailureClass;
use marigold_workflow::Artifacts;
use serde::{Deserialize, Serialize};

/// Lifecycle of a run: `Running -> {Succeeded | Failed | Aborted}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
  Running,
  Succeeded,
  Failed,
  Aborted,
}

impl RunStatus {
  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      RunStatus::Succeeded | RunStatus::Failed | RunStatus::Aborted
    )
  }
}

/// Why a step failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
  pub class: FailureClass,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AbortReason {
  Cancelled,
  /// A step was reached a second time within the run.
  Cycle { step_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
  Succeeded,
  Failed { step_id: String, cause: StepFailure },
  Aborted { reason: AbortReason },
}

impl RunOutcome {
  pub fn status(&self) -> RunStatus {
    match self {
      RunOutcome::Succeeded => RunStatus::Succeeded,
      RunOutcome::Failed { .. } => RunStatus::Failed,
      RunOutcome::Aborted { .. } => RunStatus::Aborted,
    }
  }

  pub fn is_success(&self) -> bool {
    matches!(self, RunOutcome::Succeeded)
  }
}

/// Result of one workflow run. Artifacts are as they stood when the run
/// terminated, so partial progress is visible on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
  pub execution_id: String,
  pub workflow_id: String,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  pub outcome: RunOutcome,
  /// Last step that ran, whatever its result.
  pub last_step_id: Option<String>,
  /// Step ids in execution order.
  pub executed_steps: Vec<String>,
  pub artifacts: Artifacts,
}
