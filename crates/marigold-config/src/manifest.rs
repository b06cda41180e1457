use serde::{Deserialize, Serialize};

use crate::{ProjectDef, TriggerDef, WorkflowDef};

/// A bundle of definitions loaded from a single document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
  #[serde(default)]
  pub projects: Vec<ProjectDef>,
  #[serde(default)]
  pub workflows: Vec<WorkflowDef>,
  #[serde(default)]
  pub triggers: Vec<TriggerDef>,
}

impl Manifest {
  pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(content)
  }
}
