use std::collections::HashMap;

use marigold_workflow::{ArtifactValue, Artifacts, Binding, LockedStep, ValueType};

use crate::error::StepError;

/// Slot values handed to a step, selected from the run's artifacts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInput {
  values: HashMap<String, ArtifactValue>,
}

impl StepInput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Select the subset of `artifacts` a step's bindings name. Bindings to
  /// absent artifacts are left unset; the step reports them.
  pub fn resolve(step: &LockedStep, artifacts: &Artifacts) -> Self {
    let values = step
      .bindings
      .iter()
      .filter_map(|(slot, binding)| {
        let value = match binding {
          Binding::Literal(literal) => ArtifactValue::Text(literal.clone()),
          Binding::Artifact(key) => artifacts.get(key)?.clone(),
        };
        Some((slot.clone(), value))
      })
      .collect();
    Self { values }
  }

  pub fn with(mut self, slot: impl Into<String>, value: ArtifactValue) -> Self {
    self.insert(slot, value);
    self
  }

  pub fn insert(&mut self, slot: impl Into<String>, value: ArtifactValue) {
    self.values.insert(slot.into(), value);
  }

  pub fn get(&self, slot: &str) -> Option<&ArtifactValue> {
    self.values.get(slot)
  }

  pub fn text(&self, slot: &str) -> Result<&str, StepError> {
    match self.require(slot)? {
      ArtifactValue::Text(text) => Ok(text.as_str()),
      other => Err(mismatch(slot, ValueType::Text, other)),
    }
  }

  pub fn optional_text(&self, slot: &str) -> Result<Option<&str>, StepError> {
    match self.values.get(slot) {
      None => Ok(None),
      Some(ArtifactValue::Text(text)) => Ok(Some(text.as_str())),
      Some(other) => Err(mismatch(slot, ValueType::Text, other)),
    }
  }

  pub fn list(&self, slot: &str) -> Result<&[String], StepError> {
    match self.require(slot)? {
      ArtifactValue::List(items) => Ok(items.as_slice()),
      other => Err(mismatch(slot, ValueType::List, other)),
    }
  }

  /// Returns `(step_id, message)` of a routed failure.
  pub fn error(&self, slot: &str) -> Result<(&str, &str), StepError> {
    match self.require(slot)? {
      ArtifactValue::Error { step_id, message } => Ok((step_id.as_str(), message.as_str())),
      other => Err(mismatch(slot, ValueType::Error, other)),
    }
  }

  fn require(&self, slot: &str) -> Result<&ArtifactValue, StepError> {
    self.values.get(slot).ok_or_else(|| StepError::MissingInput {
      slot: slot.to_string(),
    })
  }
}

fn mismatch(slot: &str, expected: ValueType, actual: &ArtifactValue) -> StepError {
  StepError::TypeMismatch {
    slot: slot.to_string(),
    expected,
    actual: actual.value_type(),
  }
}
