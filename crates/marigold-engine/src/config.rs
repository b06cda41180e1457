use std::time::Duration;

/// Caller-supplied deadlines for calls to external systems.
#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Bound on each step. `None` leaves steps unbounded; cancellation is
  /// still honored between steps.
  pub step_timeout: Option<Duration>,
  /// Bound on each resource provider call.
  pub provision_timeout: Duration,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      step_timeout: None,
      provision_timeout: Duration::from_secs(30),
    }
  }
}
