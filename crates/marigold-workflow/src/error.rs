use thiserror::Error;

use crate::artifact::ValueType;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("workflow declares no entry step")]
  MissingEntry,

  #[error("step not found: {0}")]
  StepNotFound(String),

  #[error("duplicate step id: {0}")]
  DuplicateStepId(String),

  #[error("unknown step type '{step_type}' for step '{step_id}'")]
  UnknownStepType { step_id: String, step_type: String },

  #[error("unknown parameter '{parameter}' for step '{step_id}'")]
  UnknownParameter { step_id: String, parameter: String },

  #[error("slot '{slot}' of step '{step_id}' expects {expected} and cannot take a literal")]
  LiteralNotAllowed {
    step_id: String,
    slot: String,
    expected: ValueType,
  },

  #[error("artifact key '{key}' is reserved")]
  ReservedArtifactKey { key: String },

  #[error("step references unknown step: from={from}, to={to}")]
  DanglingReference { from: String, to: String },

  #[error("step '{0}' has more than one predecessor")]
  MultiplePredecessors(String),

  #[error("cycle detected at step '{0}'")]
  CycleDetected(String),

  #[error("step '{step_id}' reads artifact '{key}' which is not available on every path")]
  MissingArtifact { step_id: String, key: String },

  #[error("step '{step_id}' expects artifact '{key}' to be {expected}, but it is {actual}")]
  ArtifactTypeMismatch {
    step_id: String,
    key: String,
    expected: ValueType,
    actual: ValueType,
  },

  #[error("duplicate variable: {0}")]
  DuplicateVariable(String),

  #[error("unknown type '{var_type}' for variable '{name}'")]
  UnknownVariableType { name: String, var_type: String },

  #[error("invalid value for '{key}': {message}")]
  InvalidValue { key: String, message: String },

  #[error("missing input: {0}")]
  MissingInput(String),
}
