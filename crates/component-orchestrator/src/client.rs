//! # Orchestrator Client
//!
//! Cheap, cloneable handle on a running [`RegistryActor`](crate::actor::RegistryActor).
//! Writes are forwarded over the actor's channel; reads come straight from the
//! latest published [`Snapshot`].

use crate::component::{Component, ComponentId, ComponentState};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::message::RegistryRequest;
use crate::snapshot::{
    project_components, project_dependencies, ComponentStream, DependencyStream, Snapshot,
    SnapshotStream,
};
use crate::stats::OrchestratorStats;
use tokio::sync::{mpsc, oneshot, watch};

/// A handle for registering components, wiring dependencies and reading snapshots.
///
/// Mutations return `Ok(false)` when a business rule rejects them (duplicate id,
/// full registry, unknown endpoint, cycle, remaining dependents). `Err` is reserved
/// for a registry actor that is no longer running.
#[derive(Clone, Debug)]
pub struct OrchestratorClient {
    sender: mpsc::Sender<RegistryRequest>,
    snapshots: watch::Receiver<Snapshot>,
}

impl OrchestratorClient {
    pub fn new(sender: mpsc::Sender<RegistryRequest>, snapshots: watch::Receiver<Snapshot>) -> Self {
        Self { sender, snapshots }
    }

    pub async fn register(&self, component: Component) -> OrchestratorResult<bool> {
        let (respond_to, response) = oneshot::channel();
        self.send(RegistryRequest::Register {
            component,
            respond_to,
        })
        .await?;
        response.await.map_err(|_| OrchestratorError::ActorDropped)
    }

    pub async fn unregister(&self, id: &str) -> OrchestratorResult<bool> {
        let (respond_to, response) = oneshot::channel();
        self.send(RegistryRequest::Unregister {
            id: id.to_string(),
            respond_to,
        })
        .await?;
        response.await.map_err(|_| OrchestratorError::ActorDropped)
    }

    pub async fn add_dependency(
        &self,
        component_id: &str,
        dependency_id: &str,
    ) -> OrchestratorResult<bool> {
        let (respond_to, response) = oneshot::channel();
        self.send(RegistryRequest::AddDependency {
            component_id: component_id.to_string(),
            dependency_id: dependency_id.to_string(),
            respond_to,
        })
        .await?;
        response.await.map_err(|_| OrchestratorError::ActorDropped)
    }

    pub async fn remove_dependency(
        &self,
        component_id: &str,
        dependency_id: &str,
    ) -> OrchestratorResult<bool> {
        let (respond_to, response) = oneshot::channel();
        self.send(RegistryRequest::RemoveDependency {
            component_id: component_id.to_string(),
            dependency_id: dependency_id.to_string(),
            respond_to,
        })
        .await?;
        response.await.map_err(|_| OrchestratorError::ActorDropped)
    }

    /// Moves a component along its state machine. Only the orchestrator drives this.
    pub(crate) async fn update_state(
        &self,
        id: &str,
        state: ComponentState,
    ) -> OrchestratorResult<ComponentState> {
        let (respond_to, response) = oneshot::channel();
        self.send(RegistryRequest::UpdateState {
            id: id.to_string(),
            state,
            respond_to,
        })
        .await?;
        response.await.map_err(|_| OrchestratorError::ActorDropped)?
    }

    /// Asks the actor to stop. Outstanding clones will see `ActorClosed` afterwards.
    pub async fn close(&self) -> OrchestratorResult<()> {
        self.send(RegistryRequest::Close).await
    }

    async fn send(&self, request: RegistryRequest) -> OrchestratorResult<()> {
        self.sender
            .send(request)
            .await
            .map_err(|_| OrchestratorError::ActorClosed)
    }

    // --- Reads (served from the latest snapshot) ---

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn get_component(&self, id: &str) -> Option<Component> {
        self.snapshots.borrow().component(id).cloned()
    }

    pub fn get_dependencies(&self, id: &str) -> Vec<ComponentId> {
        self.snapshots.borrow().dependencies_of(id)
    }

    pub fn get_dependents(&self, id: &str) -> Vec<ComponentId> {
        self.snapshots.borrow().dependents_of(id)
    }

    pub fn stats(&self) -> OrchestratorStats {
        OrchestratorStats::from_snapshot(&self.snapshots.borrow())
    }

    // --- Subscriptions ---

    /// Combined registry + graph snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        let mut receiver = self.snapshots.clone();
        receiver.borrow_and_update();
        receiver
    }

    pub fn subscribe_components(&self) -> ComponentStream {
        SnapshotStream::new(self.snapshots.clone(), project_components)
    }

    pub fn subscribe_dependencies(&self) -> DependencyStream {
        SnapshotStream::new(self.snapshots.clone(), project_dependencies)
    }
}
