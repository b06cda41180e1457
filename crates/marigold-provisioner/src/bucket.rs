use std::sync::Arc;

use async_trait::async_trait;
use marigold_config::ResourceDef;
use marigold_object_store::ObjectStore;
use tracing::debug;

use crate::error::ProvisionError;
use crate::provisioner::{ResourceMetadata, ResourceProvider};

const NAME_KEYS: &[&str] = &["name", "BucketName"];
const REGION_KEYS: &[&str] = &["region", "Region"];

/// Provisions object-store buckets from `{name, region}` properties.
///
/// Create-if-absent: an existing bucket is described, not recreated.
pub struct BucketProvider {
  store: Arc<dyn ObjectStore>,
}

impl BucketProvider {
  pub fn new(store: Arc<dyn ObjectStore>) -> Self {
    Self { store }
  }
}

#[async_trait]
impl ResourceProvider for BucketProvider {
  async fn provision(&self, resource: &ResourceDef) -> Result<ResourceMetadata, ProvisionError> {
    let name = required(resource, NAME_KEYS, "name")?;
    let region = required(resource, REGION_KEYS, "region")?;
    let provider_error = |source: marigold_object_store::Error| ProvisionError::Provider {
      resource_type: resource.resource_type.clone(),
      name: name.to_string(),
      source: Box::new(source),
    };

    let exists = self.store.bucket_exists(name).await.map_err(provider_error)?;
    let (info, created) = if exists {
      debug!(bucket = name, "bucket already exists");
      (self.store.bucket_info(name).await.map_err(provider_error)?, false)
    } else {
      (
        self
          .store
          .create_bucket(name, region)
          .await
          .map_err(provider_error)?,
        true,
      )
    };

    Ok(ResourceMetadata {
      resource_type: resource.resource_type.clone(),
      name: info.name,
      provider_id: info.location,
      created,
    })
  }
}

fn required<'a>(
  resource: &'a ResourceDef,
  keys: &[&str],
  property: &'static str,
) -> Result<&'a str, ProvisionError> {
  resource
    .property(keys)
    .filter(|value| !value.trim().is_empty())
    .ok_or_else(|| ProvisionError::MissingProperty {
      resource_type: resource.resource_type.clone(),
      property,
    })
}
