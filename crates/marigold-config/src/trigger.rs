use serde::{Deserialize, Serialize};

use crate::enums::{Status, TriggerType};

/// A declarative activation record bound to a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDef {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(rename = "type")]
  pub trigger_type: TriggerType,

  /// Free-form configuration (e.g. a cron expression), opaque to the core.
  #[serde(default)]
  pub config: serde_json::Map<String, serde_json::Value>,

  #[serde(default)]
  pub workflow_id: String,

  /// Payload handed to the workflow as its initial artifacts.
  #[serde(default)]
  pub input: serde_json::Map<String, serde_json::Value>,

  #[serde(default)]
  pub status: Status,
}
