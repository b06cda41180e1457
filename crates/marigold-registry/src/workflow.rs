use std::collections::HashMap;
use std::sync::Arc;

use marigold_config::WorkflowDef;
use marigold_workflow::{StepMetadata, Workflow};
use tracing::info;

use crate::error::RegistryError;
use crate::store::{MemoryStore, Store};

const KIND: &str = "workflow";

/// A registered workflow: the definition as submitted and its locked form.
///
/// The locked form is shared; runs hold their own handle so re-registration
/// never disturbs a run in flight.
#[derive(Debug, Clone)]
pub struct WorkflowRecord {
  pub definition: WorkflowDef,
  pub workflow: Arc<Workflow>,
}

pub struct WorkflowRegistry {
  store: Arc<dyn Store<WorkflowRecord>>,
}

impl WorkflowRegistry {
  pub fn new(store: Arc<dyn Store<WorkflowRecord>>) -> Self {
    Self { store }
  }

  pub fn in_memory() -> Self {
    Self::new(Arc::new(MemoryStore::<WorkflowRecord>::new()))
  }

  /// Validate and store a workflow, replacing any with the same id.
  /// Returns the step metadata view.
  pub async fn register(
    &self,
    mut definition: WorkflowDef,
  ) -> Result<HashMap<String, StepMetadata>, RegistryError> {
    let workflow = Workflow::lock(&definition)?;
    let metadata = workflow.step_metadata();
    let workflow_id = workflow.workflow_id.clone();
    definition.id = workflow_id.clone();

    self
      .store
      .put(
        &workflow_id,
        WorkflowRecord {
          definition,
          workflow: Arc::new(workflow),
        },
      )
      .await?;
    info!(workflow_id = %workflow_id, steps = metadata.len(), "workflow registered");
    Ok(metadata)
  }

  /// Read-only snapshot of a workflow's locked form.
  pub async fn snapshot(&self, workflow_id: &str) -> Result<Arc<Workflow>, RegistryError> {
    let workflow_id = workflow_id.trim();
    self
      .store
      .get(workflow_id)
      .await?
      .map(|record| record.workflow)
      .ok_or_else(|| RegistryError::not_found(KIND, workflow_id))
  }

  pub async fn list(&self) -> Result<Vec<WorkflowDef>, RegistryError> {
    Ok(
      self
        .store
        .list()
        .await?
        .into_iter()
        .map(|record| record.definition)
        .collect(),
    )
  }
}
