use std::collections::HashMap;

use marigold_config::{ProjectDef, TriggerDef, WorkflowDef};
use marigold_provisioner::{Provisioner, ResourceMetadata};
use marigold_registry::{ProjectRegistry, TriggerRegistry, WorkflowRegistry};
use marigold_steps::Capabilities;
use marigold_workflow::{Artifacts, StepMetadata, artifacts_from_json};
use marigold_workflow_executor::{
  ExecutionNotifier, ExecutorConfig, NoopNotifier, RunResult, WorkflowExecutor,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// The marigold core.
///
/// Build one per process and share it by handle (e.g. `Arc<Engine>`); every
/// operation takes `&self` and registries guard their own state.
pub struct Engine<N: ExecutionNotifier = NoopNotifier> {
  projects: ProjectRegistry,
  workflows: WorkflowRegistry,
  triggers: TriggerRegistry,
  provisioner: Provisioner,
  executor: WorkflowExecutor<N>,
}

impl Engine<NoopNotifier> {
  /// Create an engine with in-memory registries that discards execution
  /// events.
  pub fn new(capabilities: Capabilities, config: EngineConfig) -> Self {
    Self::with_notifier(capabilities, config, NoopNotifier)
  }
}

impl<N: ExecutionNotifier> Engine<N> {
  pub fn with_notifier(capabilities: Capabilities, config: EngineConfig, notifier: N) -> Self {
    let provisioner =
      Provisioner::with_object_store(capabilities.object_store.clone(), config.provision_timeout);
    let executor = WorkflowExecutor::with_notifier(
      capabilities,
      ExecutorConfig {
        step_timeout: config.step_timeout,
      },
      notifier,
    );
    Self::from_parts(
      ProjectRegistry::in_memory(),
      WorkflowRegistry::in_memory(),
      TriggerRegistry::in_memory(),
      provisioner,
      executor,
    )
  }

  /// Assemble an engine from explicitly built parts, e.g. registries over
  /// a durable store or a provisioner with extra providers.
  pub fn from_parts(
    projects: ProjectRegistry,
    workflows: WorkflowRegistry,
    triggers: TriggerRegistry,
    provisioner: Provisioner,
    executor: WorkflowExecutor<N>,
  ) -> Self {
    Self {
      projects,
      workflows,
      triggers,
      provisioner,
      executor,
    }
  }

  /// Store a project, overwriting any project with the same id.
  pub async fn register_project(&self, project: ProjectDef) -> Result<ProjectDef, EngineError> {
    Ok(self.projects.register(project).await?)
  }

  pub async fn list_projects(&self) -> Result<Vec<ProjectDef>, EngineError> {
    Ok(self.projects.list().await?)
  }

  /// Provision every declared resource of a project, in order.
  ///
  /// Unknown resource types are skipped. The first failure is returned and
  /// nothing already provisioned is rolled back.
  #[instrument(skip(self))]
  pub async fn provision_resources(
    &self,
    project_id: &str,
  ) -> Result<Vec<ResourceMetadata>, EngineError> {
    let project = self.projects.get(project_id).await?;

    match self.provisioner.provision_all(&project.resources).await {
      Ok(provisioned) => {
        info!(count = provisioned.len(), "project provisioned");
        Ok(provisioned)
      }
      Err(e) => {
        error!(error = %e, "project provisioning failed");
        Err(e.into())
      }
    }
  }

  /// Validate and store a workflow, overwriting any with the same id.
  /// Returns step id -> type and successors.
  pub async fn register_workflow(
    &self,
    workflow: WorkflowDef,
  ) -> Result<HashMap<String, StepMetadata>, EngineError> {
    Ok(self.workflows.register(workflow).await?)
  }

  pub async fn list_workflows(&self) -> Result<Vec<WorkflowDef>, EngineError> {
    Ok(self.workflows.list().await?)
  }

  pub async fn register_trigger(&self, trigger: TriggerDef) -> Result<TriggerDef, EngineError> {
    Ok(self.triggers.register(trigger).await?)
  }

  pub async fn list_triggers(&self) -> Result<Vec<TriggerDef>, EngineError> {
    Ok(self.triggers.list().await?)
  }

  /// Run a workflow against a snapshot of its current registration.
  ///
  /// Step failures are reported in the result's outcome, not as errors.
  #[instrument(skip(self, input, cancel))]
  pub async fn run_workflow(
    &self,
    workflow_id: &str,
    input: Artifacts,
    cancel: CancellationToken,
  ) -> Result<RunResult, EngineError> {
    let workflow = self.workflows.snapshot(workflow_id).await?;
    if !workflow.status.is_active() {
      return Err(EngineError::validation(format!(
        "workflow '{}' is inactive",
        workflow_id
      )));
    }

    self
      .executor
      .execute(&workflow, input, cancel)
      .await
      .map_err(|e| {
        error!(error = %e, "workflow run could not start");
        e.into()
      })
  }

  /// Run a trigger's workflow with the trigger's input payload.
  #[instrument(skip(self, cancel))]
  pub async fn fire_trigger(
    &self,
    trigger_id: &str,
    cancel: CancellationToken,
  ) -> Result<RunResult, EngineError> {
    let trigger = self.triggers.get(trigger_id).await?;
    if !trigger.status.is_active() {
      return Err(EngineError::validation(format!(
        "trigger '{}' is inactive",
        trigger_id
      )));
    }

    let input = artifacts_from_json(&trigger.input)?;
    info!(workflow_id = %trigger.workflow_id, "trigger fired");
    self.run_workflow(&trigger.workflow_id, input, cancel).await
  }
}
