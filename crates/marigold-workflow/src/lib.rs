//! Marigold Workflow
//!
//! This crate provides the "locked" workflow representation for marigold.
//! A locked workflow is a validated form of a [`WorkflowDef`] that is ready
//! for execution.
//!
//! Key differences from `marigold-config`:
//! - Step type tags are resolved to the closed [`StepKind`] set
//! - Parameters are parsed into typed slot [`Binding`]s
//! - The step graph is validated: explicit entry, no dangling references,
//!   no cycles, a single `next` predecessor per step
//! - Every slot's artifact is checked for presence and type along every
//!   path from the entry step
//!
//! [`WorkflowDef`]: marigold_config::WorkflowDef

mod artifact;
mod error;
mod graph;
mod step;
mod workflow;

pub use artifact::{ArtifactValue, Artifacts, ERROR_ARTIFACT, ValueType, artifacts_from_json};
pub use error::WorkflowError;
pub use graph::{EdgeKind, Graph};
pub use step::{Binding, LockedStep, OUTPUT_PARAMETER, Slot, StepKind};
pub use workflow::{StepMetadata, Variable, Workflow};
