//! # Topological Ordering
//!
//! Three-color depth-first sort over one registry + graph snapshot. The walk uses an
//! explicit stack of `(node, next dependency index)` frames instead of recursion.
//!
//! A node is emitted once all of its dependencies have been emitted, so the result
//! lists dependencies before dependents. Independent components keep registry
//! insertion order.
//!
//! Edges are cycle-checked on insertion, so meeting a node that is still being
//! visited means that guard was bypassed. That is reported as
//! [`OrchestratorError::CycleDetected`] rather than handled.

use crate::component::ComponentId;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::graph::DependencyMap;
use crate::registry::ComponentMap;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Visited,
}

/// Activation order for every component in `components`.
pub fn topological_order(
    components: &ComponentMap,
    edges: &DependencyMap,
) -> OrchestratorResult<Vec<ComponentId>> {
    let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(components.len());
    let mut order = Vec::with_capacity(components.len());
    let mut stack: Vec<(&str, usize)> = Vec::new();

    for root in components.keys() {
        if marks.contains_key(root.as_str()) {
            continue;
        }
        marks.insert(root.as_str(), Mark::Visiting);
        stack.push((root.as_str(), 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let deps = edges.get(node).map(Vec::as_slice).unwrap_or(&[]);

            if frame.1 < deps.len() {
                let dep = deps[frame.1].as_str();
                frame.1 += 1;

                if !components.contains_key(dep) {
                    return Err(OrchestratorError::MissingDependency {
                        component: node.to_string(),
                        dependency: dep.to_string(),
                    });
                }
                match marks.get(dep) {
                    Some(Mark::Visiting) => {
                        return Err(OrchestratorError::CycleDetected(dep.to_string()));
                    }
                    Some(Mark::Visited) => {}
                    None => {
                        marks.insert(dep, Mark::Visiting);
                        stack.push((dep, 0));
                    }
                }
            } else {
                marks.insert(node, Mark::Visited);
                order.push(node.to_string());
                stack.pop();
            }
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentType};

    fn components(ids: &[&str]) -> ComponentMap {
        ids.iter()
            .map(|id| {
                (
                    id.to_string(),
                    Component::new(*id, *id, ComponentType::Core, "1.0.0"),
                )
            })
            .collect()
    }

    fn edges(pairs: &[(&str, Vec<&str>)]) -> DependencyMap {
        pairs
            .iter()
            .map(|(id, deps)| (id.to_string(), deps.iter().map(|d| d.to_string()).collect()))
            .collect()
    }

    fn position(order: &[String], id: &str) -> usize {
        order.iter().position(|x| x == id).unwrap()
    }

    #[test]
    fn diamond_orders_dependencies_first() {
        // registered dependents-first to make sure order is not just insertion order
        let components = components(&["d", "c", "b", "a"]);
        let edges = edges(&[("d", vec!["b", "c"]), ("b", vec!["a"]), ("c", vec!["a"])]);

        let order = topological_order(&components, &edges).unwrap();
        assert_eq!(order.len(), 4);
        assert!(position(&order, "a") < position(&order, "b"));
        assert!(position(&order, "a") < position(&order, "c"));
        assert!(position(&order, "b") < position(&order, "d"));
        assert!(position(&order, "c") < position(&order, "d"));
    }

    #[test]
    fn independent_components_keep_insertion_order() {
        let components = components(&["x", "y", "z"]);
        let order = topological_order(&components, &DependencyMap::new()).unwrap();
        assert_eq!(order, vec!["x", "y", "z"]);
    }

    #[test]
    fn empty_registry_yields_empty_order() {
        let order = topological_order(&ComponentMap::new(), &DependencyMap::new()).unwrap();
        assert!(order.is_empty());
    }

    #[test]
    fn cycle_smuggled_past_the_guard_is_fatal() {
        let components = components(&["a", "b", "c"]);
        let edges = edges(&[("a", vec!["b"]), ("b", vec!["c"]), ("c", vec!["a"])]);
        let err = topological_order(&components, &edges).unwrap_err();
        assert!(matches!(err, OrchestratorError::CycleDetected(_)));
    }

    #[test]
    fn dangling_dependency_is_fatal() {
        let components = components(&["a"]);
        let edges = edges(&[("a", vec!["gone"])]);
        let err = topological_order(&components, &edges).unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::MissingDependency { ref component, ref dependency }
                if component == "a" && dependency == "gone"
        ));
    }

    #[test]
    fn long_chain_does_not_recurse() {
        let ids: Vec<String> = (0..10_000).map(|i| format!("n{i}")).collect();
        let components: ComponentMap = ids
            .iter()
            .map(|id| {
                let component = Component::new(id.as_str(), id.as_str(), ComponentType::Custom, "1");
                (id.clone(), component)
            })
            .collect();
        let edges: DependencyMap = ids
            .windows(2)
            .map(|w| (w[0].clone(), vec![w[1].clone()]))
            .collect();

        let order = topological_order(&components, &edges).unwrap();
        assert_eq!(order.first().map(String::as_str), Some("n9999"));
        assert_eq!(order.last().map(String::as_str), Some("n0"));
    }
}
