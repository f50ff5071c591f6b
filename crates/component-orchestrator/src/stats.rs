//! # Stats
//!
//! Aggregate counts derived from one [`Snapshot`]. Nothing here mutates state; the
//! numbers are as fresh as the snapshot they were computed from.

use crate::component::{ComponentState, ComponentType};
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorStats {
    pub total_components: usize,
    pub running_components: usize,
    pub total_dependencies: usize,
    pub by_type: BTreeMap<ComponentType, usize>,
    pub by_state: BTreeMap<ComponentState, usize>,
    /// Version of the snapshot these numbers describe.
    pub snapshot_version: u64,
}

impl OrchestratorStats {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut by_type = BTreeMap::new();
        let mut by_state = BTreeMap::new();
        for component in snapshot.components.values() {
            *by_type.entry(component.component_type).or_insert(0) += 1;
            *by_state.entry(component.state).or_insert(0) += 1;
        }

        Self {
            total_components: snapshot.components.len(),
            running_components: by_state.get(&ComponentState::Running).copied().unwrap_or(0),
            total_dependencies: snapshot.dependencies.values().map(Vec::len).sum(),
            by_type,
            by_state,
            snapshot_version: snapshot.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::graph::DependencyMap;
    use crate::registry::ComponentMap;
    use std::sync::Arc;

    #[test]
    fn counts_running_components_and_types() {
        let specs = [
            ("ui", ComponentType::Ui, ComponentState::Running),
            ("db", ComponentType::Data, ComponentState::Running),
            ("cache", ComponentType::Data, ComponentState::Running),
            ("net", ComponentType::Network, ComponentState::Registered),
            ("ai", ComponentType::Ai, ComponentState::Error),
        ];
        let components: ComponentMap = specs
            .iter()
            .map(|(id, kind, state)| {
                let component = Component::new(*id, *id, *kind, "1.0.0").with_state(*state);
                (id.to_string(), component)
            })
            .collect();
        let mut dependencies = DependencyMap::new();
        dependencies.insert("ui".into(), vec!["db".into(), "net".into()]);
        dependencies.insert("cache".into(), vec!["db".into()]);

        let snapshot = Snapshot {
            components: Arc::new(components),
            dependencies: Arc::new(dependencies),
            version: 7,
        };
        let stats = OrchestratorStats::from_snapshot(&snapshot);

        assert_eq!(stats.total_components, 5);
        assert_eq!(stats.running_components, 3);
        assert_eq!(stats.total_dependencies, 3);
        assert_eq!(stats.by_type.get(&ComponentType::Data), Some(&2));
        assert_eq!(stats.by_type.get(&ComponentType::Core), None);
        assert_eq!(stats.by_state.get(&ComponentState::Error), Some(&1));
        assert_eq!(stats.snapshot_version, 7);
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        let stats = OrchestratorStats::from_snapshot(&Snapshot::default());
        assert_eq!(stats, OrchestratorStats::default());
    }
}
