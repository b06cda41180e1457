use std::sync::Arc;

use marigold_config::TriggerDef;
use tracing::info;

use crate::error::{RegistryError, require};
use crate::store::{MemoryStore, Store};

const KIND: &str = "trigger";

/// Stores trigger records. The workflow a trigger names is not checked
/// here; it is resolved when the trigger fires.
pub struct TriggerRegistry {
  store: Arc<dyn Store<TriggerDef>>,
}

impl TriggerRegistry {
  pub fn new(store: Arc<dyn Store<TriggerDef>>) -> Self {
    Self { store }
  }

  pub fn in_memory() -> Self {
    Self::new(Arc::new(MemoryStore::<TriggerDef>::new()))
  }

  pub async fn register(&self, mut trigger: TriggerDef) -> Result<TriggerDef, RegistryError> {
    trigger.id = require(KIND, "id", &trigger.id)?;
    require(KIND, "name", &trigger.name)?;
    trigger.workflow_id = require(KIND, "workflow_id", &trigger.workflow_id)?;

    self.store.put(&trigger.id, trigger.clone()).await?;
    info!(
      trigger_id = %trigger.id,
      workflow_id = %trigger.workflow_id,
      trigger_type = ?trigger.trigger_type,
      "trigger registered"
    );
    Ok(trigger)
  }

  pub async fn get(&self, trigger_id: &str) -> Result<TriggerDef, RegistryError> {
    let trigger_id = trigger_id.trim();
    self
      .store
      .get(trigger_id)
      .await?
      .ok_or_else(|| RegistryError::not_found(KIND, trigger_id))
  }

  pub async fn list(&self) -> Result<Vec<TriggerDef>, RegistryError> {
    Ok(self.store.list().await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use marigold_config::{Status, TriggerType};

  fn trigger(id: &str, workflow_id: &str) -> TriggerDef {
    serde_json::from_value(serde_json::json!({
      "id": id,
      "name": "nightly",
      "type": "scheduled",
      "config": { "cron": "0 2 * * *" },
      "workflow_id": workflow_id,
      "input": { "directory": "/var/data" },
    }))
    .unwrap()
  }

  #[tokio::test]
  async fn test_register_and_list() {
    let registry = TriggerRegistry::in_memory();
    let registered = registry.register(trigger("t", "not-yet-declared")).await.unwrap();
    assert_eq!(registered.trigger_type, TriggerType::Scheduled);
    assert_eq!(registered.status, Status::Active);

    let triggers = registry.list().await.unwrap();
    assert_eq!(triggers, vec![registered]);
  }

  #[tokio::test]
  async fn test_ids_are_trimmed() {
    let registry = TriggerRegistry::in_memory();
    let registered = registry.register(trigger(" t ", " wf ")).await.unwrap();
    assert_eq!(registered.id, "t");
    assert_eq!(registered.workflow_id, "wf");

    let fetched = registry.get("t ").await.unwrap();
    assert_eq!(fetched, registered);
    assert_eq!(registry.list().await.unwrap(), vec![registered]);
  }

  #[tokio::test]
  async fn test_requires_workflow_id() {
    let registry = TriggerRegistry::in_memory();
    let err = registry.register(trigger("t", "")).await.unwrap_err();
    assert!(matches!(err, RegistryError::MissingField { field: "workflow_id", .. }));
  }
}
