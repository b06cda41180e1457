//! Marigold Registry
//!
//! Registries own the stored project, workflow and trigger definitions.
//! Each is an explicit object built once and shared by handle; nothing is
//! global. Registration overwrites by id, and list operations return
//! copies in unspecified order.
//!
//! Storage sits behind the [`Store`] trait so a durable backend can replace
//! the in-memory [`MemoryStore`].

mod error;
mod project;
mod store;
mod trigger;
mod workflow;

pub use error::{RegistryError, StoreError};
pub use project::ProjectRegistry;
pub use store::{MemoryStore, Store};
pub use trigger::TriggerRegistry;
pub use workflow::{WorkflowRecord, WorkflowRegistry};
