//! # Registry Messages
//!
//! Requests sent from an [`OrchestratorClient`](crate::client::OrchestratorClient)
//! to the [`RegistryActor`](crate::actor::RegistryActor).
//!
//! Registry and graph mutations answer with a plain `bool`: a rejected request is an
//! expected outcome, not an error. Only the internal state update carries a
//! `Result`, because an illegal transition there indicates a bug.

use crate::component::{Component, ComponentId, ComponentState};
use crate::error::OrchestratorError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, OrchestratorError>>;

#[derive(Debug)]
pub enum RegistryRequest {
    Register {
        component: Component,
        respond_to: oneshot::Sender<bool>,
    },
    Unregister {
        id: ComponentId,
        respond_to: oneshot::Sender<bool>,
    },
    AddDependency {
        component_id: ComponentId,
        dependency_id: ComponentId,
        respond_to: oneshot::Sender<bool>,
    },
    RemoveDependency {
        component_id: ComponentId,
        dependency_id: ComponentId,
        respond_to: oneshot::Sender<bool>,
    },
    UpdateState {
        id: ComponentId,
        state: ComponentState,
        respond_to: Response<ComponentState>,
    },
    /// Stops the actor loop even while clients are still alive.
    Close,
}
