use chrono::Utc;
use marigold_telemetry::ErrorReport;
use tracing::debug;

use crate::context::StepContext;
use crate::error::StepError;
use crate::input::StepInput;

/// Reports a routed failure to the telemetry sink.
///
/// Only fails when handed something other than an error artifact.
#[derive(Debug, Clone)]
pub struct HandleError {
  id: String,
}

impl HandleError {
  pub fn new(id: impl Into<String>) -> Self {
    Self { id: id.into() }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub async fn execute(&self, ctx: &StepContext<'_>, input: &StepInput) -> Result<(), StepError> {
    let (failed_step_id, message) = input.error("error")?;

    ctx.capabilities.telemetry.report(ErrorReport {
      execution_id: ctx.execution_id.to_string(),
      workflow_id: ctx.workflow_id.to_string(),
      reporter_step_id: self.id.clone(),
      failed_step_id: failed_step_id.to_string(),
      message: message.to_string(),
      reported_at: Utc::now(),
    });
    debug!(step_id = %self.id, failed_step_id, "failure reported");
    Ok(())
  }
}
