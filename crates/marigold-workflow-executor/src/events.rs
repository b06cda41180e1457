//! Execution events and notifiers for observability.
//!
//! Events are emitted during a run so consumers can persist state, stream
//! progress or ignore it.

use marigold_steps::FailureClass;
use marigold_workflow::ArtifactValue;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::result::{AbortReason, RunStatus};

/// Events emitted during workflow execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionEvent {
  WorkflowStarted {
    execution_id: String,
    workflow_id: String,
  },

  StepStarted {
    execution_id: String,
    step_id: String,
  },

  StepCompleted {
    execution_id: String,
    step_id: String,
    output: Option<ArtifactValue>,
  },

  StepFailed {
    execution_id: String,
    step_id: String,
    class: FailureClass,
    error: String,
  },

  /// A failure was routed to an error handler.
  ErrorRouted {
    execution_id: String,
    from_step_id: String,
    handler_step_id: String,
  },

  WorkflowCompleted { execution_id: String },

  WorkflowFailed {
    execution_id: String,
    step_id: String,
    error: String,
  },

  WorkflowAborted {
    execution_id: String,
    reason: AbortReason,
  },
}

impl ExecutionEvent {
  /// The run status a workflow-level event moves to.
  pub fn run_status(&self) -> Option<RunStatus> {
    match self {
      ExecutionEvent::WorkflowStarted { .. } => Some(RunStatus::Running),
      ExecutionEvent::WorkflowCompleted { .. } => Some(RunStatus::Succeeded),
      ExecutionEvent::WorkflowFailed { .. } => Some(RunStatus::Failed),
      ExecutionEvent::WorkflowAborted { .. } => Some(RunStatus::Aborted),
      _ => None,
    }
  }
}

/// Trait for receiving execution events.
///
/// The executor calls `notify` for each event; implementations decide what
/// to do with them.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
