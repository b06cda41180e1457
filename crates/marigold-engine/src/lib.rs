//! Marigold Engine
//!
//! The core facade. An [`Engine`] owns the registries, the resource
//! provisioner and the workflow executor, and exposes the operations a
//! transport collaborator calls. It receives already-deserialized
//! definitions and returns plain values; it knows nothing of any wire
//! protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Engine                           │
//! │  register_* / list_* / provision_resources               │
//! │  run_workflow / fire_trigger                             │
//! └──────────────────────────────────────────────────────────┘
//!        │                    │                    │
//!        ▼                    ▼                    ▼
//! ┌──────────────┐   ┌────────────────┐   ┌──────────────────┐
//! │  Registries  │   │  Provisioner   │   │ WorkflowExecutor │
//! │  (Store<R>)  │   │ (ObjectStore)  │   │  (Step library)  │
//! └──────────────┘   └────────────────┘   └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use marigold_engine::{Capabilities, Engine, EngineConfig};
//!
//! let capabilities = Capabilities::new(object_store, telemetry);
//! let engine = Engine::new(capabilities, EngineConfig::default());
//!
//! engine.register_project(project).await?;
//! engine.provision_resources("backups").await?;
//! engine.register_workflow(workflow).await?;
//! let result = engine.run_workflow("nightly", input, cancel).await?;
//! ```

mod config;
mod engine;
mod error;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, ErrorClass};

pub use marigold_config::{
  Manifest, ProjectDef, ResourceDef, Status, StepDef, TriggerDef, TriggerType, VariableDef,
  WorkflowDef,
};
pub use marigold_object_store::{FsObjectStore, ObjectStore};
pub use marigold_provisioner::ResourceMetadata;
pub use marigold_steps::{Capabilities, FailureClass};
pub use marigold_telemetry::{ChannelSink, ErrorReport, TelemetrySink, TracingSink};
pub use marigold_workflow::{ArtifactValue, Artifacts, StepMetadata, artifacts_from_json};
pub use marigold_workflow_executor::{
  AbortReason, ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier, RunOutcome,
  RunResult, RunStatus, StepFailure,
};
