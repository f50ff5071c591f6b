//! # Component Registry
//!
//! Owns the set of known components. The map is kept behind an `Arc` and mutated
//! with [`Arc::make_mut`]: while a published snapshot is still held by a reader the
//! next mutation copies the map first, so readers never observe a half-applied change.
//!
//! The registry is a plain data structure. Serialization of writers is the job of
//! the [`RegistryActor`](crate::actor::RegistryActor) that owns it.

use crate::component::{Component, ComponentId, ComponentState};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::graph::DependencyGraph;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Insertion-ordered map of every registered component.
pub type ComponentMap = IndexMap<ComponentId, Component>;

pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    components: Arc<ComponentMap>,
    capacity: usize,
}

impl ComponentRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            components: Arc::new(ComponentMap::new()),
            capacity,
        }
    }

    /// Adds a component with whatever initial state it carries.
    ///
    /// Returns `false` without touching the registry if the id is taken or the
    /// registry is full.
    pub fn register(&mut self, component: Component) -> bool {
        if self.components.contains_key(&component.id) {
            warn!(id = %component.id, "Register rejected: duplicate id");
            return false;
        }
        if self.components.len() >= self.capacity {
            warn!(id = %component.id, capacity = self.capacity, "Register rejected: registry full");
            return false;
        }
        debug!(id = %component.id, kind = ?component.component_type, "Registered");
        Arc::make_mut(&mut self.components).insert(component.id.clone(), component);
        true
    }

    /// Removes a component nobody depends on, together with its own dependency list.
    pub fn unregister(&mut self, id: &str, graph: &mut DependencyGraph) -> bool {
        if !self.components.contains_key(id) {
            warn!(id, "Unregister rejected: unknown id");
            return false;
        }
        let dependents = graph.dependents(id);
        if !dependents.is_empty() {
            warn!(id, ?dependents, "Unregister rejected: component still has dependents");
            return false;
        }
        // shift_remove keeps the remaining insertion order intact
        Arc::make_mut(&mut self.components).shift_remove(id);
        graph.remove_component(id);
        debug!(id, "Unregistered");
        true
    }

    pub fn get(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    /// Moves a component to `next`, returning the state it left.
    pub fn update_state(
        &mut self,
        id: &str,
        next: ComponentState,
    ) -> OrchestratorResult<ComponentState> {
        let current = self
            .components
            .get(id)
            .map(|c| c.state)
            .ok_or_else(|| OrchestratorError::NotFound(id.to_string()))?;

        if !current.can_transition_to(next) {
            return Err(OrchestratorError::InvalidTransition {
                id: id.to_string(),
                from: current,
                to: next,
            });
        }

        if let Some(component) = Arc::make_mut(&mut self.components).get_mut(id) {
            component.state = next;
        }
        Ok(current)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Cheap handle on the current map for publishing.
    pub fn snapshot(&self) -> Arc<ComponentMap> {
        Arc::clone(&self.components)
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentType;

    fn component(id: &str) -> Component {
        Component::new(id, id.to_uppercase(), ComponentType::Core, "1.0.0")
    }

    #[test]
    fn duplicate_id_is_rejected_and_original_kept() {
        let mut registry = ComponentRegistry::default();
        assert!(registry.register(component("a")));

        let impostor = Component::new("a", "Impostor", ComponentType::Ui, "9.9.9");
        assert!(!registry.register(impostor));

        let kept = registry.get("a").unwrap();
        assert_eq!(kept.name, "A");
        assert_eq!(kept.component_type, ComponentType::Core);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn capacity_bound_is_enforced() {
        let mut registry = ComponentRegistry::new(2);
        assert!(registry.register(component("a")));
        assert!(registry.register(component("b")));
        assert!(!registry.register(component("c")));
        assert_eq!(registry.len(), 2);
        assert!(!registry.contains("c"));
    }

    #[test]
    fn unregister_is_blocked_by_dependents() {
        let mut registry = ComponentRegistry::default();
        let mut graph = DependencyGraph::default();
        registry.register(component("a"));
        registry.register(component("b"));
        assert!(graph.add_dependency(&registry, "b", "a"));

        assert!(!registry.unregister("a", &mut graph));
        assert!(registry.contains("a"));

        assert!(graph.remove_dependency("b", "a"));
        assert!(registry.unregister("a", &mut graph));
        assert!(!registry.contains("a"));
    }

    #[test]
    fn unregister_drops_own_dependency_list() {
        let mut registry = ComponentRegistry::default();
        let mut graph = DependencyGraph::default();
        registry.register(component("a"));
        registry.register(component("b"));
        graph.add_dependency(&registry, "b", "a");

        assert!(registry.unregister("b", &mut graph));
        assert!(graph.dependencies("b").is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert!(registry.unregister("a", &mut graph));
    }

    #[test]
    fn unregister_unknown_id_fails() {
        let mut registry = ComponentRegistry::default();
        let mut graph = DependencyGraph::default();
        assert!(!registry.unregister("ghost", &mut graph));
    }

    #[test]
    fn update_state_follows_the_state_machine() {
        let mut registry = ComponentRegistry::default();
        registry.register(component("a"));

        let previous = registry.update_state("a", ComponentState::Starting).unwrap();
        assert_eq!(previous, ComponentState::Registered);

        let err = registry.update_state("a", ComponentState::Stopped).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidTransition { .. }));
        assert_eq!(registry.get("a").unwrap().state, ComponentState::Starting);

        let err = registry.update_state("ghost", ComponentState::Starting).unwrap_err();
        assert!(matches!(err, OrchestratorError::NotFound(_)));
    }

    #[test]
    fn published_snapshot_is_not_affected_by_later_writes() {
        let mut registry = ComponentRegistry::default();
        registry.register(component("a"));
        let before = registry.snapshot();

        registry.update_state("a", ComponentState::Starting).unwrap();
        registry.register(component("b"));

        assert_eq!(before.len(), 1);
        assert_eq!(before["a"].state, ComponentState::Registered);
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut registry = ComponentRegistry::default();
        for id in ["z", "a", "m"] {
            registry.register(component(id));
        }
        let ids: Vec<_> = registry.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }
}
