//! Marigold Config
//!
//! This crate contains the serializable definition types for marigold.
//! These types represent projects, workflows and triggers exactly as a client
//! submits them, before they are validated and locked by the registries.
//!
//! Definitions can be loaded from:
//! - JSON request bodies decoded by a transport collaborator
//! - A [`Manifest`] file bundling several definitions (via the CLI)
//!
//! Nothing here performs validation beyond what serde enforces. Structural
//! checks (required ids, step graph shape) live in `marigold-workflow` and
//! `marigold-registry`.

mod enums;
mod manifest;
mod project;
mod trigger;
mod workflow;

pub use enums::{Status, TriggerType};
pub use manifest::Manifest;
pub use project::{ProjectDef, ResourceDef};
pub use trigger::TriggerDef;
pub use workflow::{StepDef, VariableDef, WorkflowDef};
