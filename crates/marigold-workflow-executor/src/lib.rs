//! Workflow execution for marigold.
//!
//! The [`WorkflowExecutor`] walks a locked workflow from its entry step,
//! one step at a time:
//! - each step receives the artifacts its slots bind to
//! - a produced artifact is merged into the run's mapping
//! - a failure moves to the step's error handler if it declares one,
//!   otherwise ends the run
//!
//! Revisiting a step aborts the run. Cancellation is checked between steps.
//! Progress is reported through an [`ExecutionNotifier`].

mod error;
mod events;
mod executor;
mod result;

pub use error::ExecutionError;
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use executor::{ExecutorConfig, WorkflowExecutor};
pub use result::{AbortReason, RunOutcome, RunResult, RunStatus, StepFailure};
