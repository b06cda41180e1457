use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::artifact::ValueType;

/// Reserved parameter naming the artifact a step's output is stored under.
pub const OUTPUT_PARAMETER: &str = "output";

/// The closed set of step variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
  ReadDirectory,
  ArchiveFiles,
  PutToStore,
  HandleError,
}

/// A named, typed input of a step kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
  pub name: &'static str,
  pub value_type: ValueType,
  pub optional: bool,
}

const fn required(name: &'static str, value_type: ValueType) -> Slot {
  Slot {
    name,
    value_type,
    optional: false,
  }
}

const fn optional(name: &'static str, value_type: ValueType) -> Slot {
  Slot {
    name,
    value_type,
    optional: true,
  }
}

const READ_DIRECTORY_SLOTS: &[Slot] = &[required("directory", ValueType::Text)];
const ARCHIVE_FILES_SLOTS: &[Slot] = &[
  required("files", ValueType::List),
  required("archive", ValueType::Text),
];
const PUT_TO_STORE_SLOTS: &[Slot] = &[
  required("bucket", ValueType::Text),
  required("files", ValueType::List),
  optional("region", ValueType::Text),
];
const HANDLE_ERROR_SLOTS: &[Slot] = &[required("error", ValueType::Error)];

impl StepKind {
  /// Resolve a step type tag, accepting the legacy aliases.
  pub fn from_tag(tag: &str) -> Option<Self> {
    match tag {
      "read_directory" | "ReadDirectory" | "ReadFile" => Some(StepKind::ReadDirectory),
      "archive_files" | "ArchiveFiles" | "ZipFile" => Some(StepKind::ArchiveFiles),
      "put_to_store" | "PutToStore" | "S3:PutObject" => Some(StepKind::PutToStore),
      "handle_error" | "HandleError" => Some(StepKind::HandleError),
      _ => None,
    }
  }

  pub fn slots(&self) -> &'static [Slot] {
    match self {
      StepKind::ReadDirectory => READ_DIRECTORY_SLOTS,
      StepKind::ArchiveFiles => ARCHIVE_FILES_SLOTS,
      StepKind::PutToStore => PUT_TO_STORE_SLOTS,
      StepKind::HandleError => HANDLE_ERROR_SLOTS,
    }
  }

  pub fn slot(&self, name: &str) -> Option<&'static Slot> {
    self.slots().iter().find(|slot| slot.name == name)
  }

  /// Type of the artifact this kind produces, if any.
  pub fn produces(&self) -> Option<ValueType> {
    match self {
      StepKind::ReadDirectory => Some(ValueType::List),
      StepKind::ArchiveFiles => Some(ValueType::Text),
      StepKind::PutToStore | StepKind::HandleError => None,
    }
  }
}

/// Where a slot's value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", content = "value", rename_all = "snake_case")]
pub enum Binding {
  Literal(String),
  Artifact(String),
}

impl Binding {
  /// `{{ key }}` references the artifact `key`; anything else is a literal.
  pub fn parse(raw: &str) -> Self {
    let trimmed = raw.trim();
    match trimmed
      .strip_prefix("{{")
      .and_then(|rest| rest.strip_suffix("}}"))
    {
      Some(inner) if !inner.trim().is_empty() => Binding::Artifact(inner.trim().to_string()),
      _ => Binding::Literal(raw.to_string()),
    }
  }
}

/// A validated step ready to be instantiated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockedStep {
  pub step_id: String,
  pub kind: StepKind,
  /// Slot name -> binding. Unbound optional slots are absent.
  pub bindings: HashMap<String, Binding>,
  /// Artifact key the output is stored under; `None` for kinds that
  /// produce nothing.
  pub output: Option<String>,
  pub next: Option<String>,
  pub on_error: Option<String>,
}

impl LockedStep {
  /// Artifacts this step reads, with the type each slot expects.
  pub fn required_artifacts(&self) -> impl Iterator<Item = (&str, ValueType)> + '_ {
    self.kind.slots().iter().filter_map(|slot| {
      match self.bindings.get(slot.name) {
        Some(Binding::Artifact(key)) => Some((key.as_str(), slot.value_type)),
        _ => None,
      }
    })
  }
}
