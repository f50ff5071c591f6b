//! # Lifecycle Supervisor
//!
//! The [`Supervisor`] is the orchestrator instance a process owns. Constructing it
//! spawns the registry actor; dropping it (or calling [`Supervisor::close`]) ends it.
//! There is no global state: everything goes through this handle.
//!
//! ## Process lifecycle
//!
//! ```text
//! Uninitialized ──► Initializing ──► Running ──► ShuttingDown ──► Stopped
//!                       │    ▲                      │    ▲
//!                       ▼    │                      ▼    │
//!                       Error ──────────────────────┘────┘
//! ```
//!
//! `Error` is not a dead end: `initialize()` can be retried from it and
//! `shutdown()` can still be attempted.
//!
//! ## initialize()
//!
//! 1. `Initializing`
//! 2. Register the static [`Seed`] (components, hooks, edges). Entries left over
//!    from an earlier failed attempt are accepted as they are.
//! 3. Re-validate the whole graph against the registry.
//! 4. Start every component in dependency order.
//! 5. `Running`, or `Error` if any step failed.
//!
//! ## shutdown()
//!
//! `ShuttingDown`, stop components in reverse order, `Stopped`.

use crate::actor::RegistryActor;
use crate::client::OrchestratorClient;
use crate::component::{Component, ComponentId};
use crate::config::OrchestratorConfig;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::graph;
use crate::hook::{ComponentHook, HookRegistry, NoopHook};
use crate::orchestrator::Orchestrator;
use crate::snapshot::{ComponentStream, DependencyStream, Snapshot};
use crate::stats::OrchestratorStats;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// Process-wide lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Running,
    ShuttingDown,
    Stopped,
    Error,
}

impl LifecycleState {
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Uninitialized, Initializing)
                | (Initializing, Running)
                | (Initializing, Error)
                | (Running, ShuttingDown)
                | (ShuttingDown, Stopped)
                | (ShuttingDown, Error)
                | (Error, Initializing)
                | (Error, ShuttingDown)
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninitialized => "UNINITIALIZED",
            LifecycleState::Initializing => "INITIALIZING",
            LifecycleState::Running => "RUNNING",
            LifecycleState::ShuttingDown => "SHUTTING_DOWN",
            LifecycleState::Stopped => "STOPPED",
            LifecycleState::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// The fixed set of components and edges registered by `initialize()`.
#[derive(Clone, Default)]
pub struct Seed {
    components: Vec<(Component, Arc<dyn ComponentHook>)>,
    dependencies: Vec<(ComponentId, ComponentId)>,
}

impl Seed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn component(self, component: Component) -> Self {
        self.component_with_hook(component, Arc::new(NoopHook))
    }

    pub fn component_with_hook(mut self, component: Component, hook: Arc<dyn ComponentHook>) -> Self {
        self.components.push((component, hook));
        self
    }

    /// `component_id` depends on `dependency_id`.
    pub fn dependency(mut self, component_id: impl Into<ComponentId>, dependency_id: impl Into<ComponentId>) -> Self {
        self.dependencies.push((component_id.into(), dependency_id.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("components", &self.components.iter().map(|(c, _)| &c.id).collect::<Vec<_>>())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Owns the registry actor and the process lifecycle.
pub struct Supervisor {
    client: OrchestratorClient,
    orchestrator: Orchestrator,
    seed: Seed,
    lifecycle: watch::Sender<LifecycleState>,
    handle: JoinHandle<()>,
}

impl Supervisor {
    /// Spawns the registry actor on the current Tokio runtime.
    pub fn new(config: OrchestratorConfig, seed: Seed) -> Self {
        let (actor, client) = RegistryActor::new(&config);
        let handle = tokio::spawn(actor.run());
        let orchestrator = Orchestrator::new(client.clone(), HookRegistry::new(), config.hook_timeout);
        let (lifecycle, _) = watch::channel(LifecycleState::Uninitialized);
        Self {
            client,
            orchestrator,
            seed,
            lifecycle,
            handle,
        }
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        *self.lifecycle.borrow()
    }

    /// Registers the seed and starts every component.
    /// Returns the ids started by this call, in activation order.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> OrchestratorResult<Vec<ComponentId>> {
        self.transition(LifecycleState::Initializing)?;
        info!(seed = self.seed.len(), "Initializing");

        match self.bring_up().await {
            Ok(started) => {
                self.transition(LifecycleState::Running)?;
                info!(started = started.len(), "Initialized");
                Ok(started)
            }
            Err(e) => {
                error!(error = %e, "Initialization failed");
                self.transition(LifecycleState::Error)?;
                Err(e)
            }
        }
    }

    /// Stops every running component in reverse order.
    /// Returns the ids stopped by this call. A second call after success is a no-op.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> OrchestratorResult<Vec<ComponentId>> {
        if self.lifecycle_state() == LifecycleState::Stopped {
            return Ok(Vec::new());
        }
        self.transition(LifecycleState::ShuttingDown)?;

        match self.orchestrator.shutdown_components().await {
            Ok(stopped) => {
                self.transition(LifecycleState::Stopped)?;
                info!(stopped = stopped.len(), "Shut down");
                Ok(stopped)
            }
            Err(e) => {
                error!(error = %e, "Shutdown failed");
                self.transition(LifecycleState::Error)?;
                Err(e)
            }
        }
    }

    /// Stops the registry actor and waits for its task to finish.
    pub async fn close(self) -> OrchestratorResult<()> {
        // an already-exited actor is fine here
        let _ = self.client.close().await;
        drop(self.orchestrator);
        drop(self.client);
        self.handle.await.map_err(|e| {
            error!("Registry actor task failed: {:?}", e);
            OrchestratorError::TaskFailed(e.to_string())
        })
    }

    async fn bring_up(&self) -> OrchestratorResult<Vec<ComponentId>> {
        for (component, hook) in &self.seed.components {
            let id = component.id.clone();
            if self.client.get_component(&id).is_some() {
                // left over from an earlier attempt
                self.orchestrator.hooks().insert_if_absent(id, Arc::clone(hook));
                continue;
            }
            if !self.attach(component.clone(), Some(Arc::clone(hook))).await? {
                return Err(OrchestratorError::InvalidSeed(format!(
                    "component {id} could not be registered"
                )));
            }
        }
        for (component_id, dependency_id) in &self.seed.dependencies {
            if !self.client.add_dependency(component_id, dependency_id).await? {
                return Err(OrchestratorError::InvalidSeed(format!(
                    "dependency {component_id} -> {dependency_id} rejected"
                )));
            }
        }

        let snapshot = self.client.snapshot();
        graph::validate(&snapshot.components, &snapshot.dependencies)?;

        self.orchestrator.start_components().await
    }

    fn transition(&self, next: LifecycleState) -> OrchestratorResult<()> {
        let mut from = next;
        let changed = self.lifecycle.send_if_modified(|state| {
            from = *state;
            if state.can_transition_to(next) {
                *state = next;
                true
            } else {
                false
            }
        });
        if changed {
            info!(%from, to = %next, "Lifecycle transition");
            Ok(())
        } else {
            warn!(%from, to = %next, "Lifecycle transition rejected");
            Err(OrchestratorError::InvalidLifecycleTransition { from, to: next })
        }
    }

    // --- Inbound API ---

    pub async fn register(&self, component: Component) -> OrchestratorResult<bool> {
        self.attach(component, None).await
    }

    /// Registers `component` with `hook` attached.
    pub async fn register_with_hook(
        &self,
        component: Component,
        hook: Arc<dyn ComponentHook>,
    ) -> OrchestratorResult<bool> {
        self.attach(component, Some(hook)).await
    }

    /// The hook is in place before the registration is published, so a concurrent
    /// start pass never runs the component without it. Whatever hook an earlier
    /// registration of the same id left behind is replaced, or cleared for `None`.
    async fn attach(
        &self,
        component: Component,
        hook: Option<Arc<dyn ComponentHook>>,
    ) -> OrchestratorResult<bool> {
        let id = component.id.clone();
        if self.client.get_component(&id).is_some() {
            return self.client.register(component).await;
        }

        let hooks = self.orchestrator.hooks();
        match hook {
            Some(hook) => hooks.insert(id.clone(), hook),
            None => {
                hooks.remove(&id);
            }
        }
        let ok = self.client.register(component).await?;
        if !ok && self.client.get_component(&id).is_none() {
            hooks.remove(&id);
        }
        Ok(ok)
    }

    pub async fn unregister(&self, id: &str) -> OrchestratorResult<bool> {
        let ok = self.client.unregister(id).await?;
        if ok {
            self.orchestrator.hooks().remove(id);
        }
        Ok(ok)
    }

    pub async fn add_dependency(&self, component_id: &str, dependency_id: &str) -> OrchestratorResult<bool> {
        self.client.add_dependency(component_id, dependency_id).await
    }

    pub async fn remove_dependency(&self, component_id: &str, dependency_id: &str) -> OrchestratorResult<bool> {
        self.client.remove_dependency(component_id, dependency_id).await
    }

    pub fn get_component(&self, id: &str) -> Option<Component> {
        self.client.get_component(id)
    }

    pub fn get_dependencies(&self, id: &str) -> Vec<ComponentId> {
        self.client.get_dependencies(id)
    }

    pub fn get_dependents(&self, id: &str) -> Vec<ComponentId> {
        self.client.get_dependents(id)
    }

    pub fn stats(&self) -> OrchestratorStats {
        self.client.stats()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.client.snapshot()
    }

    pub fn subscribe_components(&self) -> ComponentStream {
        self.client.subscribe_components()
    }

    pub fn subscribe_dependencies(&self) -> DependencyStream {
        self.client.subscribe_dependencies()
    }

    /// Current lifecycle state first, then every change.
    pub fn subscribe_lifecycle(&self) -> watch::Receiver<LifecycleState> {
        self.lifecycle.subscribe()
    }

    /// A client handle for callers that outlive a borrow of the supervisor.
    ///
    /// Unregistering through it does not detach the component's hook. The stale hook
    /// is dropped when the id is next registered through the supervisor.
    pub fn client(&self) -> OrchestratorClient {
        self.client.clone()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}
