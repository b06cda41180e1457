use std::sync::Arc;

use marigold_object_store::ObjectStore;
use marigold_telemetry::TelemetrySink;

/// External capabilities available to steps.
#[derive(Clone)]
pub struct Capabilities {
  pub object_store: Arc<dyn ObjectStore>,
  pub telemetry: Arc<dyn TelemetrySink>,
}

impl Capabilities {
  pub fn new(object_store: Arc<dyn ObjectStore>, telemetry: Arc<dyn TelemetrySink>) -> Self {
    Self {
      object_store,
      telemetry,
    }
  }
}

/// Per-run context handed to each step.
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
  pub execution_id: &'a str,
  pub workflow_id: &'a str,
  pub capabilities: &'a Capabilities,
}
