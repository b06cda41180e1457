//! Workflow executor implementation.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::Utc;
use marigold_steps::{Capabilities, FailureClass, Step, StepContext, StepInput};
use marigold_workflow::{ArtifactValue, Artifacts, ERROR_ARTIFACT, Workflow};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::error::ExecutionError;
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::result::{AbortReason, RunOutcome, RunResult, StepFailure};

/// Configuration for the workflow executor.
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
  /// Deadline for a single step. `None` leaves steps unbounded.
  pub step_timeout: Option<Duration>,
}

/// The workflow executor.
///
/// Generic over `N: ExecutionNotifier` to allow different notification
/// strategies. Runs share nothing mutable, so one executor may drive many
/// runs concurrently.
pub struct WorkflowExecutor<N: ExecutionNotifier = NoopNotifier> {
  capabilities: Capabilities,
  config: ExecutorConfig,
  notifier: N,
}

impl WorkflowExecutor<NoopNotifier> {
  /// Create an executor that discards execution events.
  pub fn new(capabilities: Capabilities, config: ExecutorConfig) -> Self {
    Self::with_notifier(capabilities, config, NoopNotifier)
  }
}

impl<N: ExecutionNotifier> WorkflowExecutor<N> {
  pub fn with_notifier(capabilities: Capabilities, config: ExecutorConfig, notifier: N) -> Self {
    Self {
      capabilities,
      config,
      notifier,
    }
  }

  /// Run `workflow` from its entry step with `input` as the initial
  /// artifacts.
  ///
  /// Returns an error only when the run cannot start. Once started, the run
  /// always produces a [`RunResult`].
  #[instrument(
    name = "workflow_execute",
    skip(self, workflow, input, cancel),
    fields(workflow_id = %workflow.workflow_id)
  )]
  pub async fn execute(
    &self,
    workflow: &Workflow,
    input: Artifacts,
    cancel: CancellationToken,
  ) -> Result<RunResult, ExecutionError> {
    let steps = instantiate(workflow)?;
    let mut artifacts = workflow.initial_artifacts(input)?;

    let execution_id = uuid::Uuid::new_v4().to_string();
    let started_at = Utc::now();
    info!(execution_id = %execution_id, entry = %workflow.entry, "workflow_started");
    self.notifier.notify(ExecutionEvent::WorkflowStarted {
      execution_id: execution_id.clone(),
      workflow_id: workflow.workflow_id.clone(),
    });

    let ctx = StepContext {
      execution_id: &execution_id,
      workflow_id: &workflow.workflow_id,
      capabilities: &self.capabilities,
    };
    let mut visited = HashSet::new();
    let mut executed_steps = Vec::new();
    let mut current = Some(workflow.entry.clone());

    let outcome = loop {
      let Some(step_id) = current.take() else {
        break RunOutcome::Succeeded;
      };
      if cancel.is_cancelled() {
        warn!(execution_id = %execution_id, "workflow cancelled");
        break RunOutcome::Aborted {
          reason: AbortReason::Cancelled,
        };
      }
      if !visited.insert(step_id.clone()) {
        break RunOutcome::Aborted {
          reason: AbortReason::Cycle { step_id },
        };
      }

      let Some((locked, step)) = workflow.get_step(&step_id).zip(steps.get(step_id.as_str())) else {
        // instantiate() resolved every reachable id
        return Err(ExecutionError::InvalidGraph {
          message: format!("step '{}' not found", step_id),
        });
      };

      self.notifier.notify(ExecutionEvent::StepStarted {
        execution_id: execution_id.clone(),
        step_id: step_id.clone(),
      });
      let step_input = StepInput::resolve(locked, &artifacts);
      let result = self.run_step(step, &ctx, &step_input).await;
      executed_steps.push(step_id.clone());

      match result {
        Ok(output) => {
          info!(execution_id = %execution_id, step_id = %step_id, "step_completed");
          if let (Some(key), Some(value)) = (&locked.output, &output) {
            artifacts.insert(key.clone(), value.clone());
          }
          self.notifier.notify(ExecutionEvent::StepCompleted {
            execution_id: execution_id.clone(),
            step_id: step_id.clone(),
            output,
          });
          current = locked.next.clone();
        }
        Err(failure) => {
          error!(
            execution_id = %execution_id,
            step_id = %step_id,
            class = ?failure.class,
            error = %failure.message,
            "step_failed"
          );
          self.notifier.notify(ExecutionEvent::StepFailed {
            execution_id: execution_id.clone(),
            step_id: step_id.clone(),
            class: failure.class,
            error: failure.message.clone(),
          });

          let Some(handler) = &locked.on_error else {
            break RunOutcome::Failed {
              step_id,
              cause: failure,
            };
          };
          info!(
            execution_id = %execution_id,
            step_id = %step_id,
            handler = %handler,
            "error_routed"
          );
          self.notifier.notify(ExecutionEvent::ErrorRouted {
            execution_id: execution_id.clone(),
            from_step_id: step_id.clone(),
            handler_step_id: handler.clone(),
          });
          artifacts.insert(
            ERROR_ARTIFACT.to_string(),
            ArtifactValue::Error {
              step_id,
              message: failure.message,
            },
          );
          current = Some(handler.clone());
        }
      }
    };

    self.finish(&execution_id, &outcome);

    Ok(RunResult {
      execution_id,
      workflow_id: workflow.workflow_id.clone(),
      started_at,
      finished_at: Utc::now(),
      outcome,
      last_step_id: executed_steps.last().cloned(),
      executed_steps,
      artifacts,
    })
  }

  /// Execute one step, bounded by the configured step timeout.
  async fn run_step(
    &self,
    step: &Step,
    ctx: &StepContext<'_>,
    input: &StepInput,
  ) -> Result<Option<ArtifactValue>, StepFailure> {
    let result = match self.config.step_timeout {
      Some(limit) => match tokio::time::timeout(limit, step.execute(ctx, input)).await {
        Ok(result) => result,
        Err(_) => {
          return Err(StepFailure {
            class: FailureClass::Business,
            message: format!("step '{}' timed out after {:?}", step.id(), limit),
          });
        }
      },
      None => step.execute(ctx, input).await,
    };

    result.map_err(|e| StepFailure {
      class: e.class(),
      message: e.to_string(),
    })
  }

  fn finish(&self, execution_id: &str, outcome: &RunOutcome) {
    let event = match outcome {
      RunOutcome::Succeeded => {
        info!(execution_id = %execution_id, "workflow_completed");
        ExecutionEvent::WorkflowCompleted {
          execution_id: execution_id.to_string(),
        }
      }
      RunOutcome::Failed { step_id, cause } => {
        error!(
          execution_id = %execution_id,
          step_id = %step_id,
          error = %cause.message,
          "workflow_failed"
        );
        ExecutionEvent::WorkflowFailed {
          execution_id: execution_id.to_string(),
          step_id: step_id.clone(),
          error: cause.message.clone(),
        }
      }
      RunOutcome::Aborted { reason } => {
        warn!(execution_id = %execution_id, reason = ?reason, "workflow_aborted");
        ExecutionEvent::WorkflowAborted {
          execution_id: execution_id.to_string(),
          reason: reason.clone(),
        }
      }
    };
    self.notifier.notify(event);
  }
}

/// Build a live step for every definition, checking that the entry and
/// every successor reference resolve. Runs before any step executes.
fn instantiate(workflow: &Workflow) -> Result<HashMap<&str, Step>, ExecutionError> {
  if !workflow.steps.contains_key(&workflow.entry) {
    return Err(ExecutionError::InvalidGraph {
      message: format!("entry step '{}' not found", workflow.entry),
    });
  }

  let mut steps = HashMap::with_capacity(workflow.steps.len());
  for (step_id, locked) in &workflow.steps {
    for target in [&locked.next, &locked.on_error].into_iter().flatten() {
      if !workflow.steps.contains_key(target) {
        return Err(ExecutionError::InvalidGraph {
          message: format!("step '{}' references unknown step '{}'", step_id, target),
        });
      }
    }
    steps.insert(step_id.as_str(), Step::instantiate(locked));
  }
  Ok(steps)
}
