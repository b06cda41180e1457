//! Error taxonomy surfaced to transport collaborators.

use marigold_provisioner::ProvisionError;
use marigold_registry::{RegistryError, StoreError};
use marigold_workflow::WorkflowError;
use marigold_workflow_executor::ExecutionError;
use thiserror::Error;

/// How a transport should present an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  /// The input was structurally invalid.
  Unprocessable,
  RequestFailed,
}

impl ErrorClass {
  /// Generic text safe to show a caller.
  pub fn public_message(&self) -> &'static str {
    match self {
      ErrorClass::Unprocessable => "unprocessable input",
      ErrorClass::RequestFailed => "request failed",
    }
  }
}

#[derive(Debug, Error)]
pub enum EngineError {
  /// Structurally invalid input, including dangling or cyclic step graphs.
  #[error("validation failed: {message}")]
  Validation { message: String },

  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: String },

  /// External resource creation failed. Earlier resources of the same
  /// project stay provisioned.
  #[error("provisioning failed: {0}")]
  Provisioning(#[from] ProvisionError),

  #[error("execution failed: {0}")]
  Execution(#[source] ExecutionError),

  #[error("storage error: {0}")]
  Storage(#[from] StoreError),
}

impl EngineError {
  pub(crate) fn validation(message: impl Into<String>) -> Self {
    EngineError::Validation {
      message: message.into(),
    }
  }

  pub fn class(&self) -> ErrorClass {
    match self {
      EngineError::Validation { .. } => ErrorClass::Unprocessable,
      _ => ErrorClass::RequestFailed,
    }
  }

  /// Caller-facing message. Internal causes are left to logs.
  pub fn public_message(&self) -> &'static str {
    self.class().public_message()
  }

  /// Whether re-issuing the same request may succeed.
  pub fn is_retryable(&self) -> bool {
    match self {
      EngineError::Validation { .. } | EngineError::NotFound { .. } => false,
      EngineError::Provisioning(ProvisionError::MissingProperty { .. }) => false,
      EngineError::Provisioning(_) => true,
      EngineError::Execution(_) => false,
      EngineError::Storage(_) => true,
    }
  }
}

impl From<RegistryError> for EngineError {
  fn from(err: RegistryError) -> Self {
    match err {
      RegistryError::MissingField { .. } => EngineError::validation(err.to_string()),
      RegistryError::InvalidWorkflow(inner) => inner.into(),
      RegistryError::NotFound { kind, id } => EngineError::NotFound { kind, id },
      RegistryError::Store(inner) => EngineError::Storage(inner),
    }
  }
}

impl From<WorkflowError> for EngineError {
  fn from(err: WorkflowError) -> Self {
    EngineError::validation(err.to_string())
  }
}

impl From<ExecutionError> for EngineError {
  fn from(err: ExecutionError) -> Self {
    match err {
      ExecutionError::InvalidInput(inner) => inner.into(),
      other => EngineError::Execution(other),
    }
  }
}
