//! Marigold Steps
//!
//! The step library: a closed, polymorphic set of step variants. Each
//! variant is a self-contained unit of work with declared input slots (see
//! [`StepKind::slots`]) and an optional produced artifact.
//!
//! | Variant | Slots | Produces |
//! |---|---|---|
//! | [`ReadDirectory`] | `directory: text` | `list` of file paths |
//! | [`ArchiveFiles`] | `files: list`, `archive: text` | `text` archive path |
//! | [`PutToStore`] | `bucket: text`, `files: list`, `region: text?` | nothing |
//! | [`HandleError`] | `error: error` | nothing |
//!
//! Steps receive their external capabilities (object store, telemetry sink)
//! through a [`StepContext`]; nothing is hard-wired.
//!
//! [`StepKind::slots`]: marigold_workflow::StepKind::slots

mod archive_files;
mod context;
mod error;
mod handle_error;
mod input;
mod put_to_store;
mod read_directory;
mod step;

pub use archive_files::ArchiveFiles;
pub use context::{Capabilities, StepContext};
pub use error::{FailureClass, StepError};
pub use handle_error::HandleError;
pub use input::StepInput;
pub use put_to_store::PutToStore;
pub use read_directory::ReadDirectory;
pub use step::Step;

#[cfg(test)]
pub(crate) mod testing {
  use std::path::Path;
  use std::sync::Arc;

  use marigold_object_store::FsObjectStore;
  use marigold_telemetry::{ChannelSink, ErrorReport};
  use tokio::sync::mpsc;

  use crate::Capabilities;

  pub fn capabilities(root: &Path) -> (Capabilities, mpsc::UnboundedReceiver<ErrorReport>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let capabilities = Capabilities::new(
      Arc::new(FsObjectStore::new(root)),
      Arc::new(ChannelSink::new(tx)),
    );
    (capabilities, rx)
  }
}
