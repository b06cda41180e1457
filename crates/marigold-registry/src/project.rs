use std::sync::Arc;

use marigold_config::ProjectDef;
use tracing::info;

use crate::error::{RegistryError, require};
use crate::store::{MemoryStore, Store};

const KIND: &str = "project";

pub struct ProjectRegistry {
  store: Arc<dyn Store<ProjectDef>>,
}

impl ProjectRegistry {
  pub fn new(store: Arc<dyn Store<ProjectDef>>) -> Self {
    Self { store }
  }

  pub fn in_memory() -> Self {
    Self::new(Arc::new(MemoryStore::<ProjectDef>::new()))
  }

  /// Store a project, replacing any project with the same id.
  pub async fn register(&self, mut project: ProjectDef) -> Result<ProjectDef, RegistryError> {
    project.id = require(KIND, "id", &project.id)?;
    require(KIND, "name", &project.name)?;

    self.store.put(&project.id, project.clone()).await?;
    info!(project_id = %project.id, resources = project.resources.len(), "project registered");
    Ok(project)
  }

  pub async fn get(&self, project_id: &str) -> Result<ProjectDef, RegistryError> {
    let project_id = project_id.trim();
    self
      .store
      .get(project_id)
      .await?
      .ok_or_else(|| RegistryError::not_found(KIND, project_id))
  }

  pub async fn list(&self) -> Result<Vec<ProjectDef>, RegistryError> {
    Ok(self.store.list().await?)
  }
}
