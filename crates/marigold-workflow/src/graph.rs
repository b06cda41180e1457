use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::step::LockedStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
  /// Taken when the step succeeds.
  Next,
  /// Taken when the step fails.
  OnError,
}

/// Graph structure for traversal and analysis.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Adjacency list: step_id -> list of (downstream step_id, edge kind).
  adjacency: HashMap<String, Vec<(String, EdgeKind)>>,
  /// Steps named as `next` by more than one step.
  join_points: HashSet<String>,
}

impl Graph {
  /// Build a graph from locked steps. References to unknown steps are kept
  /// as edges; callers validate them beforehand.
  pub fn new(steps: &HashMap<String, LockedStep>) -> Self {
    let mut adjacency: HashMap<String, Vec<(String, EdgeKind)>> = HashMap::new();
    let mut next_predecessors: HashMap<&str, usize> = HashMap::new();

    for (from, step) in steps {
      let edges = adjacency.entry(from.clone()).or_default();
      if let Some(next) = &step.next {
        edges.push((next.clone(), EdgeKind::Next));
        *next_predecessors.entry(next.as_str()).or_default() += 1;
      }
      if let Some(handler) = &step.on_error {
        edges.push((handler.clone(), EdgeKind::OnError));
      }
    }

    let join_points = next_predecessors
      .into_iter()
      .filter(|(_, count)| *count > 1)
      .map(|(id, _)| id.to_string())
      .collect();

    Self {
      adjacency,
      join_points,
    }
  }

  /// Get downstream steps for a given step.
  pub fn downstream(&self, step_id: &str) -> &[(String, EdgeKind)] {
    self
      .adjacency
      .get(step_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  pub fn join_points(&self) -> &HashSet<String> {
    &self.join_points
  }

  /// Find a step that closes a cycle, following both edge kinds.
  pub fn find_cycle(&self) -> Option<String> {
    // 0 = unvisited, 1 = on the current path, 2 = done
    let mut color: HashMap<&str, u8> = self.adjacency.keys().map(|id| (id.as_str(), 0u8)).collect();

    let mut roots: Vec<&str> = self.adjacency.keys().map(String::as_str).collect();
    roots.sort();

    for root in roots {
      if color.get(root) != Some(&0) {
        continue;
      }

      // (step, index of the next edge to follow)
      let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
      color.insert(root, 1);

      while let Some((step_id, index)) = stack.last_mut() {
        let edges = self.downstream(step_id);
        let Some((neighbor, _)) = edges.get(*index) else {
          color.insert(*step_id, 2);
          stack.pop();
          continue;
        };
        *index += 1;

        match color.get(neighbor.as_str()) {
          Some(1) => return Some(neighbor.clone()),
          Some(0) => {
            color.insert(neighbor.as_str(), 1);
            stack.push((neighbor.as_str(), 0));
          }
          _ => {}
        }
      }
    }

    None
  }

  /// Steps reachable from `entry`, each after all of its reachable
  /// predecessors. Only meaningful on an acyclic graph.
  pub fn topological_from(&self, entry: &str) -> Vec<&str> {
    let mut reachable: HashSet<&str> = HashSet::new();
    let mut pending = vec![entry];
    while let Some(step_id) = pending.pop() {
      let Some((step_id, edges)) = self.adjacency.get_key_value(step_id) else {
        continue;
      };
      if reachable.insert(step_id.as_str()) {
        pending.extend(edges.iter().map(|(to, _)| to.as_str()));
      }
    }

    let mut in_degree: HashMap<&str, usize> = reachable.iter().map(|id| (*id, 0)).collect();
    for step_id in &reachable {
      for (to, _) in self.downstream(step_id) {
        if let Some(degree) = in_degree.get_mut(to.as_str()) {
          *degree += 1;
        }
      }
    }

    let mut order = Vec::with_capacity(reachable.len());
    let mut ready: Vec<&str> = in_degree
      .iter()
      .filter(|(_, degree)| **degree == 0)
      .map(|(id, _)| *id)
      .collect();
    while let Some(step_id) = ready.pop() {
      order.push(step_id);
      for (to, _) in self.downstream(step_id) {
        if let Some(degree) = in_degree.get_mut(to.as_str()) {
          *degree -= 1;
          if *degree == 0 {
            ready.push(to.as_str());
          }
        }
      }
    }
    order
  }
}
