use std::collections::{HashMap, HashSet};

use marigold_config::{Status, StepDef, VariableDef, WorkflowDef};
use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactValue, Artifacts, ERROR_ARTIFACT, ValueType};
use crate::error::WorkflowError;
use crate::graph::{EdgeKind, Graph};
use crate::step::{Binding, LockedStep, OUTPUT_PARAMETER, StepKind};

/// A locked workflow ready for execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  pub workflow_id: String,
  pub name: String,
  pub status: Status,
  pub entry: String,
  pub variables: Vec<Variable>,
  pub steps: HashMap<String, LockedStep>,
}

/// A declared run input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
  pub name: String,
  pub value_type: ValueType,
  pub default: Option<ArtifactValue>,
}

/// Client-facing view of one step: its type tag and successors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMetadata {
  #[serde(rename = "type")]
  pub step_type: StepKind,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub on_error: Option<String>,
}

impl Workflow {
  /// Validate a definition and lock it.
  pub fn lock(def: &WorkflowDef) -> Result<Self, WorkflowError> {
    if def.id.trim().is_empty() {
      return Err(WorkflowError::MissingField("id"));
    }
    if def.name.trim().is_empty() {
      return Err(WorkflowError::MissingField("name"));
    }

    let entry = def
      .entry
      .as_deref()
      .map(str::trim)
      .filter(|entry| !entry.is_empty())
      .ok_or(WorkflowError::MissingEntry)?
      .to_string();

    let variables = lock_variables(&def.variables)?;

    let mut steps = HashMap::with_capacity(def.steps.len());
    for step_def in &def.steps {
      let step = lock_step(step_def)?;
      if steps.contains_key(&step.step_id) {
        return Err(WorkflowError::DuplicateStepId(step.step_id));
      }
      steps.insert(step.step_id.clone(), step);
    }

    for step_def in &def.steps {
      let step = &steps[step_def.id.trim()];
      for to in [&step.next, &step.on_error].into_iter().flatten() {
        if !steps.contains_key(to) {
          return Err(WorkflowError::DanglingReference {
            from: step.step_id.clone(),
            to: to.clone(),
          });
        }
      }
    }

    if !steps.contains_key(&entry) {
      return Err(WorkflowError::StepNotFound(entry));
    }

    let workflow = Self {
      workflow_id: def.id.trim().to_string(),
      name: def.name.clone(),
      status: def.status,
      entry,
      variables,
      steps,
    };

    let graph = workflow.graph();
    if let Some(step_id) = graph.find_cycle() {
      return Err(WorkflowError::CycleDetected(step_id));
    }
    let mut joins: Vec<&String> = graph.join_points().iter().collect();
    joins.sort();
    if let Some(step_id) = joins.first() {
      return Err(WorkflowError::MultiplePredecessors((*step_id).clone()));
    }

    let available = workflow
      .variables
      .iter()
      .map(|v| (v.name.clone(), v.value_type))
      .collect();
    workflow.check_artifacts(&graph, available)?;

    Ok(workflow)
  }

  /// Build the graph structure for traversal.
  pub fn graph(&self) -> Graph {
    Graph::new(&self.steps)
  }

  /// Get a step by ID.
  pub fn get_step(&self, step_id: &str) -> Option<&LockedStep> {
    self.steps.get(step_id)
  }

  /// Step id -> type tag and successors.
  pub fn step_metadata(&self) -> HashMap<String, StepMetadata> {
    self
      .steps
      .iter()
      .map(|(id, step)| {
        (
          id.clone(),
          StepMetadata {
            step_type: step.kind,
            next: step.next.clone(),
            on_error: step.on_error.clone(),
          },
        )
      })
      .collect()
  }

  /// Fill variable defaults into a run input and check declared types.
  /// Undeclared keys pass through untouched.
  pub fn initial_artifacts(&self, mut input: Artifacts) -> Result<Artifacts, WorkflowError> {
    for variable in &self.variables {
      match input.get(&variable.name) {
        Some(value) if value.value_type() != variable.value_type => {
          return Err(WorkflowError::InvalidValue {
            key: variable.name.clone(),
            message: format!(
              "expected {}, got {}",
              variable.value_type,
              value.value_type()
            ),
          });
        }
        Some(_) => {}
        None => match &variable.default {
          Some(default) => {
            input.insert(variable.name.clone(), default.clone());
          }
          None => return Err(WorkflowError::MissingInput(variable.name.clone())),
        },
      }
    }
    Ok(input)
  }

  /// Check each reachable step's slot artifacts against what every path
  /// into it makes available. Steps are visited once, in topological
  /// order; what reaches a step is the intersection over its incoming
  /// edges. Assumes an acyclic graph.
  fn check_artifacts(
    &self,
    graph: &Graph,
    variables: HashMap<String, ValueType>,
  ) -> Result<(), WorkflowError> {
    let mut incoming: HashMap<&str, HashMap<String, ValueType>> = HashMap::new();
    incoming.insert(self.entry.as_str(), variables);

    for step_id in graph.topological_from(&self.entry) {
      let step = self
        .steps
        .get(step_id)
        .ok_or_else(|| WorkflowError::StepNotFound(step_id.to_string()))?;
      let available = incoming.remove(step_id).unwrap_or_default();

      for (key, expected) in step.required_artifacts() {
        match available.get(key) {
          None => {
            return Err(WorkflowError::MissingArtifact {
              step_id: step.step_id.clone(),
              key: key.to_string(),
            });
          }
          Some(actual) if *actual != expected => {
            return Err(WorkflowError::ArtifactTypeMismatch {
              step_id: step.step_id.clone(),
              key: key.to_string(),
              expected,
              actual: *actual,
            });
          }
          Some(_) => {}
        }
      }

      for (to, kind) in graph.downstream(step_id) {
        let mut outgoing = available.clone();
        match kind {
          EdgeKind::Next => {
            if let (Some(key), Some(value_type)) = (&step.output, step.kind.produces()) {
              outgoing.insert(key.clone(), value_type);
            }
          }
          EdgeKind::OnError => {
            outgoing.insert(ERROR_ARTIFACT.to_string(), ValueType::Error);
          }
        }

        match incoming.get_mut(to.as_str()) {
          Some(existing) => {
            existing.retain(|key, value_type| outgoing.get(key) == Some(value_type));
          }
          None => {
            incoming.insert(to.as_str(), outgoing);
          }
        }
      }
    }

    Ok(())
  }
}

fn lock_variables(defs: &[VariableDef]) -> Result<Vec<Variable>, WorkflowError> {
  let mut seen = HashSet::new();
  let mut variables = Vec::with_capacity(defs.len());

  for def in defs {
    let name = def.name.trim();
    if name.is_empty() {
      return Err(WorkflowError::MissingField("variables.name"));
    }
    if name == ERROR_ARTIFACT {
      return Err(WorkflowError::ReservedArtifactKey {
        key: name.to_string(),
      });
    }
    if !seen.insert(name) {
      return Err(WorkflowError::DuplicateVariable(name.to_string()));
    }

    let value_type =
      ValueType::from_tag(def.var_type.trim()).ok_or_else(|| WorkflowError::UnknownVariableType {
        name: name.to_string(),
        var_type: def.var_type.clone(),
      })?;

    let default = def
      .default
      .as_ref()
      .map(|value| ArtifactValue::from_json(name, value))
      .transpose()?;
    if let Some(default) = &default
      && default.value_type() != value_type
    {
      return Err(WorkflowError::InvalidValue {
        key: name.to_string(),
        message: format!("default is {}, declared {}", default.value_type(), value_type),
      });
    }

    variables.push(Variable {
      name: name.to_string(),
      value_type,
      default,
    });
  }

  Ok(variables)
}

fn lock_step(def: &StepDef) -> Result<LockedStep, WorkflowError> {
  let step_id = def.id.trim();
  if step_id.is_empty() {
    return Err(WorkflowError::MissingField("steps.id"));
  }

  let kind =
    StepKind::from_tag(def.step_type.trim()).ok_or_else(|| WorkflowError::UnknownStepType {
      step_id: step_id.to_string(),
      step_type: def.step_type.clone(),
    })?;

  let mut output = kind.produces().map(|_| step_id.to_string());
  let mut bindings = HashMap::new();

  let mut parameters: Vec<(&String, &String)> = def.parameters.iter().collect();
  parameters.sort();

  for (name, raw) in parameters {
    if name == OUTPUT_PARAMETER && kind.produces().is_some() {
      output = Some(raw.trim().to_string());
      continue;
    }

    let slot = kind
      .slot(name)
      .ok_or_else(|| WorkflowError::UnknownParameter {
        step_id: step_id.to_string(),
        parameter: name.clone(),
      })?;

    let binding = Binding::parse(raw);
    if matches!(binding, Binding::Literal(_)) && slot.value_type != ValueType::Text {
      return Err(WorkflowError::LiteralNotAllowed {
        step_id: step_id.to_string(),
        slot: name.clone(),
        expected: slot.value_type,
      });
    }
    bindings.insert(name.clone(), binding);
  }

  for slot in kind.slots() {
    if !slot.optional && !bindings.contains_key(slot.name) {
      bindings.insert(
        slot.name.to_string(),
        Binding::Artifact(slot.name.to_string()),
      );
    }
  }

  if let Some(key) = &output {
    if key.is_empty() {
      return Err(WorkflowError::InvalidValue {
        key: OUTPUT_PARAMETER.to_string(),
        message: format!("empty output key for step '{}'", step_id),
      });
    }
    if key == ERROR_ARTIFACT {
      return Err(WorkflowError::ReservedArtifactKey { key: key.clone() });
    }
  }

  Ok(LockedStep {
    step_id: step_id.to_string(),
    kind,
    bindings,
    output,
    next: normalize_reference(&def.next),
    on_error: normalize_reference(&def.on_error),
  })
}

fn normalize_reference(reference: &Option<String>) -> Option<String> {
  reference
    .as_deref()
    .map(str::trim)
    .filter(|r| !r.is_empty())
    .map(str::to_string)
}
