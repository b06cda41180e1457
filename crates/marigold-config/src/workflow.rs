use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::enums::Status;

/// A workflow definition: variables plus a step graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDef {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub status: Status,

  /// Id of the step a run starts at. Required; positional inference is not
  /// attempted.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub entry: Option<String>,

  #[serde(default)]
  pub variables: Vec<VariableDef>,
  #[serde(default)]
  pub steps: Vec<StepDef>,
}

/// A named run input with a declared type tag and an optional default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDef {
  pub name: String,

  /// Type tag, e.g. "string" or "list".
  #[serde(rename = "type")]
  pub var_type: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
  pub id: String,

  /// Step type tag selecting a step library variant.
  #[serde(rename = "type")]
  pub step_type: String,

  /// Slot bindings. `{{ key }}` references an artifact, anything else is a
  /// literal. The reserved `output` parameter names the produced artifact.
  #[serde(default)]
  pub parameters: HashMap<String, String>,

  /// Successor on success. Empty or absent means terminal.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next: Option<String>,

  /// Successor when this step fails.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub on_error: Option<String>,
}
