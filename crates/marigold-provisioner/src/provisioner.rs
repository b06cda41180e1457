use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use marigold_config::ResourceDef;
use marigold_object_store::ObjectStore;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::bucket::BucketProvider;
use crate::error::ProvisionError;

/// Type tags served by [`BucketProvider`].
pub const BUCKET_RESOURCE_TYPES: &[&str] = &["object-store:bucket", "S3:Bucket", "s3:bucket"];

/// What provisioning a resource produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
  pub resource_type: String,
  pub name: String,
  /// Provider-assigned identifier.
  pub provider_id: String,
  /// False when the resource already existed.
  pub created: bool,
}

/// Creates one kind of external resource.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
  /// Provision `resource`. Must be safe to call for a resource that
  /// already exists.
  async fn provision(&self, resource: &ResourceDef) -> Result<ResourceMetadata, ProvisionError>;
}

/// Capability table of resource providers, keyed by type tag.
pub struct Provisioner {
  providers: HashMap<String, Arc<dyn ResourceProvider>>,
  timeout: Duration,
}

impl Provisioner {
  /// Create an empty provisioner. Every provider call is bounded by
  /// `timeout`.
  pub fn new(timeout: Duration) -> Self {
    Self {
      providers: HashMap::new(),
      timeout,
    }
  }

  /// Create a provisioner serving bucket resources from `store`.
  pub fn with_object_store(store: Arc<dyn ObjectStore>, timeout: Duration) -> Self {
    let mut provisioner = Self::new(timeout);
    let buckets: Arc<dyn ResourceProvider> = Arc::new(BucketProvider::new(store));
    for resource_type in BUCKET_RESOURCE_TYPES {
      provisioner.register(*resource_type, buckets.clone());
    }
    provisioner
  }

  /// Register a provider for a type tag, replacing any existing one.
  pub fn register(&mut self, resource_type: impl Into<String>, provider: Arc<dyn ResourceProvider>) {
    self.providers.insert(resource_type.into(), provider);
  }

  /// Provision one resource. Returns `None` for type tags with no
  /// provider.
  #[instrument(skip(self, resource), fields(resource_type = %resource.resource_type))]
  pub async fn provision(
    &self,
    resource: &ResourceDef,
  ) -> Result<Option<ResourceMetadata>, ProvisionError> {
    let Some(provider) = self.providers.get(&resource.resource_type) else {
      warn!("no provider for resource type, skipping");
      return Ok(None);
    };

    let metadata = tokio::time::timeout(self.timeout, provider.provision(resource))
      .await
      .map_err(|_| ProvisionError::Timeout {
        resource_type: resource.resource_type.clone(),
        timeout: self.timeout,
      })??;

    info!(
      name = %metadata.name,
      provider_id = %metadata.provider_id,
      created = metadata.created,
      "resource provisioned"
    );
    Ok(Some(metadata))
  }

  /// Provision resources in order, stopping at the first failure. Nothing
  /// already provisioned is rolled back.
  pub async fn provision_all(
    &self,
    resources: &[ResourceDef],
  ) -> Result<Vec<ResourceMetadata>, ProvisionError> {
    let mut provisioned = Vec::with_capacity(resources.len());
    for resource in resources {
      if let Some(metadata) = self.provision(resource).await? {
        provisioned.push(metadata);
      }
    }
    Ok(provisioned)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn resource(resource_type: &str, properties: &[(&str, &str)]) -> ResourceDef {
    ResourceDef {
      resource_type: resource_type.to_string(),
      properties: properties
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    }
  }

  struct CountingProvider {
    calls: AtomicUsize,
    fail_on: Option<String>,
  }

  #[async_trait]
  impl ResourceProvider for CountingProvider {
    async fn provision(&self, resource: &ResourceDef) -> Result<ResourceMetadata, ProvisionError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      let name = resource.property(&["name"]).unwrap_or_default().to_string();
      if self.fail_on.as_deref() == Some(name.as_str()) {
        return Err(ProvisionError::Provider {
          resource_type: resource.resource_type.clone(),
          name,
          source: "quota exceeded".into(),
        });
      }
      Ok(ResourceMetadata {
        resource_type: resource.resource_type.clone(),
        provider_id: format!("test:{}", name),
        name,
        created: true,
      })
    }
  }

  struct SlowProvider;

  #[async_trait]
  impl ResourceProvider for SlowProvider {
    async fn provision(&self, _resource: &ResourceDef) -> Result<ResourceMetadata, ProvisionError> {
      tokio::time::sleep(Duration::from_secs(60)).await;
      unreachable!("provisioning should have timed out")
    }
  }

  #[tokio::test]
  async fn test_unknown_type_is_skipped() {
    let provisioner = Provisioner::new(Duration::from_secs(1));
    let result = provisioner
      .provision(&resource("queue:fifo", &[("name", "jobs")]))
      .await
      .unwrap();
    assert!(result.is_none());
  }

  #[tokio::test]
  async fn test_provision_all_stops_at_first_failure() {
    let provider = Arc::new(CountingProvider {
      calls: AtomicUsize::new(0),
      fail_on: Some("second".to_string()),
    });
    let mut provisioner = Provisioner::new(Duration::from_secs(1));
    provisioner.register("test:thing", provider.clone());

    let err = provisioner
      .provision_all(&[
        resource("test:thing", &[("name", "first")]),
        resource("test:thing", &[("name", "second")]),
        resource("test:thing", &[("name", "third")]),
      ])
      .await
      .unwrap_err();

    assert!(matches!(err, ProvisionError::Provider { ref name, .. } if name == "second"));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_provider_call_is_bounded() {
    let mut provisioner = Provisioner::new(Duration::from_millis(20));
    provisioner.register("test:slow", Arc::new(SlowProvider));

    let err = provisioner
      .provision(&resource("test:slow", &[]))
      .await
      .unwrap_err();
    assert!(matches!(err, ProvisionError::Timeout { .. }));
  }
}
