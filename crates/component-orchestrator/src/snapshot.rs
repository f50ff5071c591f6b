//! # Snapshots & Streams
//!
//! The registry actor publishes a [`Snapshot`] through a `tokio::sync::watch` channel
//! after every mutation. A snapshot pairs the component map with the dependency map
//! that was current at the same instant, so a reader never sees an edge pointing at a
//! component the same snapshot does not contain.
//!
//! Subscribers get the latest snapshot immediately and every later one after that.
//! `watch` keeps only the newest value, so a slow subscriber skips intermediate
//! snapshots instead of queueing them.

use crate::component::{Component, ComponentId, ComponentState};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::graph::{dependents_in, DependencyMap};
use crate::registry::ComponentMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Immutable, point-in-time view of the registry and the dependency graph.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub components: Arc<ComponentMap>,
    pub dependencies: Arc<DependencyMap>,
    /// Incremented on every published mutation.
    pub version: u64,
}

impl Snapshot {
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    pub fn dependencies_of(&self, id: &str) -> Vec<ComponentId> {
        self.dependencies.get(id).cloned().unwrap_or_default()
    }

    pub fn dependents_of(&self, id: &str) -> Vec<ComponentId> {
        dependents_in(&self.dependencies, id)
    }

    pub fn state_of(&self, id: &str) -> Option<ComponentState> {
        self.components.get(id).map(|c| c.state)
    }
}

/// A projection of the snapshot stream onto one of its maps.
///
/// [`SnapshotStream::changed`] only resolves when the projected map itself was
/// replaced; a component state change does not wake a dependency subscriber.
pub struct SnapshotStream<T> {
    receiver: watch::Receiver<Snapshot>,
    project: fn(&Snapshot) -> Arc<T>,
    last: Arc<T>,
}

pub type ComponentStream = SnapshotStream<ComponentMap>;
pub type DependencyStream = SnapshotStream<DependencyMap>;

impl<T> SnapshotStream<T> {
    pub(crate) fn new(
        mut receiver: watch::Receiver<Snapshot>,
        project: fn(&Snapshot) -> Arc<T>,
    ) -> Self {
        let last = project(&receiver.borrow_and_update());
        Self {
            receiver,
            project,
            last,
        }
    }

    /// The value current at subscription time, or the last one returned by `changed`.
    pub fn current(&self) -> Arc<T> {
        Arc::clone(&self.last)
    }

    /// Waits for the next replacement of the projected map.
    pub async fn changed(&mut self) -> OrchestratorResult<Arc<T>> {
        loop {
            self.receiver
                .changed()
                .await
                .map_err(|_| OrchestratorError::ActorClosed)?;
            let next = (self.project)(&self.receiver.borrow_and_update());
            if !Arc::ptr_eq(&next, &self.last) {
                self.last = Arc::clone(&next);
                return Ok(next);
            }
        }
    }
}

pub(crate) fn project_components(snapshot: &Snapshot) -> Arc<ComponentMap> {
    Arc::clone(&snapshot.components)
}

pub(crate) fn project_dependencies(snapshot: &Snapshot) -> Arc<DependencyMap> {
    Arc::clone(&snapshot.dependencies)
}
