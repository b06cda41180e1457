use serde::{Deserialize, Serialize};

/// Activation status shared by workflows and triggers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
  #[default]
  #[serde(alias = "Active")]
  Active,
  #[serde(alias = "Inactive", alias = "deactive")]
  Inactive,
}

impl Status {
  pub fn is_active(&self) -> bool {
    matches!(self, Status::Active)
  }
}

/// How a trigger is activated. Interpreting the trigger configuration for
/// each type is the job of an external scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
  Scheduled,
  Manual,
  Webhook,
}
