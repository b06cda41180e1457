use marigold_workflow::WorkflowError;

/// Error type for storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("storage backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
  /// A required field is absent or blank.
  #[error("{kind} is missing required field '{field}'")]
  MissingField {
    kind: &'static str,
    field: &'static str,
  },

  #[error("invalid workflow: {0}")]
  InvalidWorkflow(#[from] WorkflowError),

  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: String },

  #[error(transparent)]
  Store(#[from] StoreError),
}

impl RegistryError {
  pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
    RegistryError::NotFound {
      kind,
      id: id.to_string(),
    }
  }
}

/// Reject blank identity fields. Returns the value trimmed; records are
/// stored and looked up by their trimmed ids.
pub(crate) fn require(
  kind: &'static str,
  field: &'static str,
  value: &str,
) -> Result<String, RegistryError> {
  let value = value.trim();
  if value.is_empty() {
    return Err(RegistryError::MissingField { kind, field });
  }
  Ok(value.to_string())
}
