use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A named bundle of declared external resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDef {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub resources: Vec<ResourceDef>,
}

/// Declarative description of an external asset, e.g. a storage bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDef {
  /// Type tag selecting a provider, e.g. "object-store:bucket".
  #[serde(rename = "type")]
  pub resource_type: String,

  /// Provider-specific properties, e.g. `name` and `region` for buckets.
  #[serde(default)]
  pub properties: HashMap<String, String>,
}

impl ResourceDef {
  /// Look up the first property present among `keys`.
  pub fn property(&self, keys: &[&str]) -> Option<&str> {
    keys
      .iter()
      .find_map(|key| self.properties.get(*key))
      .map(String::as_str)
  }
}
