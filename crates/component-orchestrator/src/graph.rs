//! # Dependency Graph
//!
//! Directed edges "component requires dependency", stored as an adjacency map from a
//! component id to the ordered list of ids it depends on.
//!
//! ## Cycle guard
//!
//! Before an edge `component -> dependency` is stored, [`DependencyGraph::is_safe_edge`]
//! walks everything reachable from `dependency`. If `component` is reachable the edge
//! would close a cycle. The walk is bounded: once more than `max_depth` distinct nodes
//! have been visited the edge is treated as unsafe as well, which means a legitimately
//! deep chain can be refused.

use crate::component::ComponentId;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::registry::{ComponentMap, ComponentRegistry};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Component id -> direct dependencies, in the order they were added.
pub type DependencyMap = IndexMap<ComponentId, Vec<ComponentId>>;

pub const DEFAULT_MAX_DEPTH: usize = 10;

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    edges: Arc<DependencyMap>,
    max_depth: usize,
}

impl DependencyGraph {
    pub fn new(max_depth: usize) -> Self {
        Self {
            edges: Arc::new(DependencyMap::new()),
            max_depth,
        }
    }

    /// Records that `component_id` cannot run before `dependency_id`.
    ///
    /// Both ids must be registered and the edge must pass the cycle guard. Adding an
    /// edge that already exists succeeds without storing a duplicate.
    pub fn add_dependency(
        &mut self,
        registry: &ComponentRegistry,
        component_id: &str,
        dependency_id: &str,
    ) -> bool {
        if !registry.contains(component_id) || !registry.contains(dependency_id) {
            warn!(component_id, dependency_id, "Dependency rejected: unknown endpoint");
            return false;
        }
        if !self.is_safe_edge(component_id, dependency_id) {
            warn!(component_id, dependency_id, "Dependency rejected: cycle or depth limit");
            return false;
        }

        let deps = Arc::make_mut(&mut self.edges)
            .entry(component_id.to_string())
            .or_default();
        if !deps.iter().any(|d| d == dependency_id) {
            deps.push(dependency_id.to_string());
            debug!(component_id, dependency_id, "Dependency added");
        }
        true
    }

    pub fn remove_dependency(&mut self, component_id: &str, dependency_id: &str) -> bool {
        let exists = self
            .edges
            .get(component_id)
            .is_some_and(|deps| deps.iter().any(|d| d == dependency_id));
        if !exists {
            warn!(component_id, dependency_id, "Dependency removal rejected: no such edge");
            return false;
        }

        let edges = Arc::make_mut(&mut self.edges);
        if let Some(deps) = edges.get_mut(component_id) {
            deps.retain(|d| d != dependency_id);
            if deps.is_empty() {
                edges.shift_remove(component_id);
            }
        }
        debug!(component_id, dependency_id, "Dependency removed");
        true
    }

    /// Direct dependencies of `component_id`.
    pub fn dependencies(&self, component_id: &str) -> Vec<ComponentId> {
        self.edges.get(component_id).cloned().unwrap_or_default()
    }

    /// Every component that lists `component_id` as a dependency.
    pub fn dependents(&self, component_id: &str) -> Vec<ComponentId> {
        dependents_in(&self.edges, component_id)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Drops the dependency list keyed by `component_id`.
    pub fn remove_component(&mut self, component_id: &str) {
        if self.edges.contains_key(component_id) {
            Arc::make_mut(&mut self.edges).shift_remove(component_id);
        }
    }

    /// Bounded iterative DFS from `dependency_id` looking for `component_id`.
    pub fn is_safe_edge(&self, component_id: &str, dependency_id: &str) -> bool {
        let mut stack: Vec<&str> = vec![dependency_id];
        let mut visited: HashSet<&str> = HashSet::new();

        while let Some(node) = stack.pop() {
            if node == component_id {
                return false;
            }
            if !visited.insert(node) {
                continue;
            }
            if visited.len() > self.max_depth {
                debug!(component_id, dependency_id, max_depth = self.max_depth, "Depth limit hit");
                return false;
            }
            if let Some(deps) = self.edges.get(node) {
                // reversed so the first-listed dependency is explored first
                stack.extend(
                    deps.iter()
                        .rev()
                        .map(String::as_str)
                        .filter(|d| !visited.contains(d)),
                );
            }
        }
        true
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Re-checks that every edge endpoint is present in `components`.
    pub fn validate(&self, components: &ComponentMap) -> OrchestratorResult<()> {
        validate(components, &self.edges)
    }

    pub fn snapshot(&self) -> Arc<DependencyMap> {
        Arc::clone(&self.edges)
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

pub(crate) fn dependents_in(edges: &DependencyMap, component_id: &str) -> Vec<ComponentId> {
    edges
        .iter()
        .filter(|(_, deps)| deps.iter().any(|d| d == component_id))
        .map(|(id, _)| id.clone())
        .collect()
}

/// Fails with [`OrchestratorError::MissingDependency`] on the first edge whose
/// endpoint is absent from `components`.
pub fn validate(components: &ComponentMap, edges: &DependencyMap) -> OrchestratorResult<()> {
    for (component, deps) in edges.iter() {
        if !components.contains_key(component) {
            return Err(OrchestratorError::NotFound(component.clone()));
        }
        if let Some(missing) = deps.iter().find(|d| !components.contains_key(*d)) {
            return Err(OrchestratorError::MissingDependency {
                component: component.clone(),
                dependency: missing.clone(),
            });
        }
    }
    Ok(())
}
