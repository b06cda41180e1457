use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
  #[error("resource '{resource_type}' is missing property '{property}'")]
  MissingProperty {
    resource_type: String,
    property: &'static str,
  },

  /// The provider call failed. The cause is kept for logging.
  #[error("failed to provision {resource_type} '{name}': {source}")]
  Provider {
    resource_type: String,
    name: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("provisioning {resource_type} timed out after {timeout:?}")]
  Timeout {
    resource_type: String,
    timeout: Duration,
  },
}
