//! Typed artifacts exchanged between steps.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Key the executor writes a routed failure under before handing control to
/// the error handler.
pub const ERROR_ARTIFACT: &str = "error";

/// The running artifact mapping of a workflow run.
pub type Artifacts = HashMap<String, ArtifactValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
  Text,
  List,
  Error,
}

impl ValueType {
  /// Parse a variable type tag.
  pub fn from_tag(tag: &str) -> Option<Self> {
    match tag {
      "string" | "text" => Some(ValueType::Text),
      "list" | "listOfString" | "list_of_string" => Some(ValueType::List),
      _ => None,
    }
  }
}

impl fmt::Display for ValueType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValueType::Text => f.write_str("text"),
      ValueType::List => f.write_str("list"),
      ValueType::Error => f.write_str("error"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArtifactValue {
  Text(String),
  List(Vec<String>),
  Error { step_id: String, message: String },
}

impl ArtifactValue {
  pub fn value_type(&self) -> ValueType {
    match self {
      ArtifactValue::Text(_) => ValueType::Text,
      ArtifactValue::List(_) => ValueType::List,
      ArtifactValue::Error { .. } => ValueType::Error,
    }
  }

  /// Convert a JSON payload value. Strings become text, arrays of strings
  /// become lists; anything else is rejected.
  pub fn from_json(key: &str, value: &serde_json::Value) -> Result<Self, WorkflowError> {
    match value {
      serde_json::Value::String(s) => Ok(ArtifactValue::Text(s.clone())),
      serde_json::Value::Array(items) => items
        .iter()
        .map(|item| {
          item.as_str().map(str::to_string).ok_or_else(|| WorkflowError::InvalidValue {
            key: key.to_string(),
            message: format!("list items must be strings, got {}", item),
          })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ArtifactValue::List),
      other => Err(WorkflowError::InvalidValue {
        key: key.to_string(),
        message: format!("expected a string or a list of strings, got {}", other),
      }),
    }
  }
}

/// Convert a JSON object payload into run artifacts.
pub fn artifacts_from_json(
  payload: &serde_json::Map<String, serde_json::Value>,
) -> Result<Artifacts, WorkflowError> {
  payload
    .iter()
    .map(|(key, value)| Ok((key.clone(), ArtifactValue::from_json(key, value)?)))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_from_json_accepts_strings_and_string_lists() {
    let payload = json!({ "directory": "/tmp/backup", "files": ["a.txt", "b.txt"] });
    let artifacts = artifacts_from_json(payload.as_object().unwrap()).unwrap();

    assert_eq!(
      artifacts["directory"],
      ArtifactValue::Text("/tmp/backup".to_string())
    );
    assert_eq!(
      artifacts["files"],
      ArtifactValue::List(vec!["a.txt".to_string(), "b.txt".to_string()])
    );
  }

  #[test]
  fn test_from_json_rejects_other_shapes() {
    let err = ArtifactValue::from_json("count", &json!(42)).unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidValue { key, .. } if key == "count"));

    let err = ArtifactValue::from_json("files", &json!(["a", 1])).unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidValue { .. }));
  }

  #[test]
  fn test_variable_type_tags() {
    assert_eq!(ValueType::from_tag("string"), Some(ValueType::Text));
    assert_eq!(ValueType::from_tag("listOfString"), Some(ValueType::List));
    assert_eq!(ValueType::from_tag("error"), None);
  }
}
