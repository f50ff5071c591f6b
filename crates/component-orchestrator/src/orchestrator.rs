//! # Topological Orchestrator
//!
//! Drives components through their state machine in dependency order.
//!
//! ## Startup
//!
//! The order is computed once, from one snapshot, and then walked front to back.
//! Each startable component goes `Registered|Error -> Starting`, its start hook is
//! awaited, then `Starting -> Running`. Components already `Running` are skipped,
//! which makes a repeated call resume where a failed one stopped.
//!
//! A failing (or timed-out) start hook moves that component to `Error` and aborts
//! the walk. Everything after it stays `Registered`; everything before it stays
//! `Running`. There is no rollback.
//!
//! ## Shutdown
//!
//! The same order, reversed. `Running -> Stopping`, stop hook, `Stopping -> Stopped`.
//! A failing stop hook moves its component to `Error` but the walk continues, and
//! the first failure is returned at the end.
//!
//! No lock is held while a hook runs. Components registered after the order was
//! computed are not part of the current walk. Components unregistered while the walk
//! is in flight, even from inside their own hook, are skipped with a warning.

use crate::client::OrchestratorClient;
use crate::component::{Component, ComponentId, ComponentState};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::hook::HookRegistry;
use crate::topology::topological_order;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Stop,
}

#[derive(Clone, Debug)]
pub struct Orchestrator {
    client: OrchestratorClient,
    hooks: HookRegistry,
    hook_timeout: Option<Duration>,
}

impl Orchestrator {
    pub fn new(client: OrchestratorClient, hooks: HookRegistry, hook_timeout: Option<Duration>) -> Self {
        Self {
            client,
            hooks,
            hook_timeout,
        }
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Dependencies-first order of every registered component.
    pub fn activation_order(&self) -> OrchestratorResult<Vec<ComponentId>> {
        let snapshot = self.client.snapshot();
        topological_order(&snapshot.components, &snapshot.dependencies)
    }

    /// Starts every startable component. Returns the ids started by this call, in order.
    #[instrument(skip(self))]
    pub async fn start_components(&self) -> OrchestratorResult<Vec<ComponentId>> {
        let order = self.activation_order()?;
        info!(components = order.len(), "Starting components");

        let mut started = Vec::with_capacity(order.len());
        for id in order {
            let Some(component) = self.client.get_component(&id) else {
                warn!(%id, "Component disappeared before startup, skipping");
                continue;
            };
            match component.state {
                ComponentState::Registered | ComponentState::Error => {}
                ComponentState::Running => {
                    debug!(%id, "Already running");
                    continue;
                }
                other => {
                    debug!(%id, state = %other, "Not startable, skipping");
                    continue;
                }
            }
            if let Some(dep) = self.first_idle_dependency(&id) {
                warn!(%id, dependency = %dep, "Dependency not running, skipping");
                continue;
            }

            if !self.advance(&id, ComponentState::Starting).await? {
                continue;
            }
            match self.run_hook(&component, Phase::Start).await {
                Ok(()) => {
                    if self.advance(&id, ComponentState::Running).await? {
                        info!(%id, "Component running");
                        started.push(id);
                    }
                }
                Err(e) => {
                    warn!(%id, error = %e, "Start failed, aborting startup");
                    self.advance(&id, ComponentState::Error).await?;
                    return Err(e);
                }
            }
        }

        info!(started = started.len(), "Startup complete");
        Ok(started)
    }

    /// Stops every running component in reverse activation order.
    /// Returns the ids stopped by this call, in the order they were stopped.
    #[instrument(skip(self))]
    pub async fn shutdown_components(&self) -> OrchestratorResult<Vec<ComponentId>> {
        let order = self.activation_order()?;
        info!(components = order.len(), "Stopping components");

        let mut stopped = Vec::with_capacity(order.len());
        let mut first_error = None;
        for id in order.into_iter().rev() {
            let Some(component) = self.client.get_component(&id) else {
                continue;
            };
            if component.state != ComponentState::Running {
                debug!(%id, state = %component.state, "Not running, skipping");
                continue;
            }

            if !self.advance(&id, ComponentState::Stopping).await? {
                continue;
            }
            match self.run_hook(&component, Phase::Stop).await {
                Ok(()) => {
                    if self.advance(&id, ComponentState::Stopped).await? {
                        info!(%id, "Component stopped");
                        stopped.push(id);
                    }
                }
                Err(e) => {
                    warn!(%id, error = %e, "Stop failed");
                    self.advance(&id, ComponentState::Error).await?;
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!(stopped = stopped.len(), "Shutdown complete");
                Ok(stopped)
            }
        }
    }

    /// Moves `id` to `next`. `Ok(false)` means the component was unregistered
    /// while the walk was in flight; any other failure is returned.
    async fn advance(&self, id: &str, next: ComponentState) -> OrchestratorResult<bool> {
        match self.client.update_state(id, next).await {
            Ok(_) => Ok(true),
            Err(OrchestratorError::NotFound(_)) => {
                warn!(%id, to = %next, "Component unregistered mid-walk, skipping");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn first_idle_dependency(&self, id: &str) -> Option<ComponentId> {
        let snapshot = self.client.snapshot();
        snapshot
            .dependencies_of(id)
            .into_iter()
            .find(|dep| snapshot.state_of(dep) != Some(ComponentState::Running))
    }

    async fn run_hook(&self, component: &Component, phase: Phase) -> OrchestratorResult<()> {
        let hook = self.hooks.get(&component.id);
        let call = async {
            match phase {
                Phase::Start => hook.start(component).await,
                Phase::Stop => hook.stop(component).await,
            }
        };

        let outcome = match self.hook_timeout {
            Some(timeout) => tokio::time::timeout(timeout, call).await.map_err(|_| {
                OrchestratorError::HookTimeout {
                    id: component.id.clone(),
                    timeout,
                }
            })?,
            None => call.await,
        };

        outcome.map_err(|source| OrchestratorError::HookFailed {
            id: component.id.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::RegistryActor;
    use crate::component::ComponentType;
    use crate::config::OrchestratorConfig;
    use crate::error::HookError;
    use crate::hook::ComponentHook;
    use crate::mock::{MockHook, RecordingHook};
    use async_trait::async_trait;
    use std::sync::Arc;

    #[derive(Clone, Copy)]
    enum Write {
        Register(&'static str),
        Unregister(&'static str),
        Depend(&'static str, &'static str),
    }

    /// Performs registry writes from inside a hook, in order, during one phase.
    struct WritingHook {
        client: OrchestratorClient,
        phase: Phase,
        writes: Vec<Write>,
    }

    impl WritingHook {
        fn new(client: &OrchestratorClient, phase: Phase, writes: Vec<Write>) -> Arc<Self> {
            Arc::new(Self {
                client: client.clone(),
                phase,
                writes,
            })
        }

        async fn apply(&self, phase: Phase) -> Result<(), HookError> {
            if phase != self.phase {
                return Ok(());
            }
            for write in &self.writes {
                let accepted = match *write {
                    Write::Register(id) => {
                        self.client
                            .register(Component::new(id, id, ComponentType::Custom, "1.0.0"))
                            .await
                    }
                    Write::Unregister(id) => self.client.unregister(id).await,
                    Write::Depend(from, to) => self.client.add_dependency(from, to).await,
                };
                assert!(accepted.map_err(|e| HookError::new(e.to_string()))?);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ComponentHook for WritingHook {
        async fn start(&self, _component: &Component) -> Result<(), HookError> {
            self.apply(Phase::Start).await
        }

        async fn stop(&self, _component: &Component) -> Result<(), HookError> {
            self.apply(Phase::Stop).await
        }
    }

    async fn setup(ids: &[&str], edges: &[(&str, &str)]) -> (OrchestratorClient, Orchestrator) {
        let (actor, client) = RegistryActor::new(&OrchestratorConfig::default());
        tokio::spawn(actor.run());
        for id in ids {
            let component = Component::new(*id, *id, ComponentType::Core, "1.0.0");
            assert!(client.register(component).await.unwrap());
        }
        for (from, to) in edges {
            assert!(client.add_dependency(from, to).await.unwrap());
        }
        let orchestrator = Orchestrator::new(client.clone(), HookRegistry::new(), None);
        (client, orchestrator)
    }

    fn state(client: &OrchestratorClient, id: &str) -> ComponentState {
        client.get_component(id).unwrap().state
    }

    #[tokio::test]
    async fn start_then_stop_in_reverse() {
        let (client, orchestrator) =
            setup(&["d", "b", "c", "a"], &[("d", "b"), ("d", "c"), ("b", "a"), ("c", "a")]).await;
        let recorder = RecordingHook::new();
        for id in ["a", "b", "c", "d"] {
            orchestrator.hooks().insert(id, Arc::new(recorder.clone()));
        }

        let started = orchestrator.start_components().await.unwrap();
        assert_eq!(started.len(), 4);
        for id in ["a", "b", "c", "d"] {
            assert_eq!(state(&client, id), ComponentState::Running);
        }

        let stopped = orchestrator.shutdown_components().await.unwrap();
        let mut reversed = started.clone();
        reversed.reverse();
        assert_eq!(stopped, reversed);
        assert_eq!(recorder.started(), started);
        assert_eq!(recorder.stopped(), reversed);
        for id in ["a", "b", "c", "d"] {
            assert_eq!(state(&client, id), ComponentState::Stopped);
        }
    }

    #[tokio::test]
    async fn failed_start_aborts_and_leaves_dependents_registered() {
        let (client, orchestrator) = setup(&["a", "b", "c"], &[("b", "a"), ("c", "b")]).await;
        let mut mock = MockHook::new();
        mock.expect_start("b").return_err("disk missing");
        orchestrator.hooks().insert("b", Arc::new(mock.clone()));

        let err = orchestrator.start_components().await.unwrap_err();
        assert!(matches!(err, OrchestratorError::HookFailed { ref id, .. } if id == "b"));
        assert_eq!(state(&client, "a"), ComponentState::Running);
        assert_eq!(state(&client, "b"), ComponentState::Error);
        assert_eq!(state(&client, "c"), ComponentState::Registered);
        mock.verify();

        // retry: a is skipped, b is re-attempted from Error
        mock.expect_start("b").return_ok();
        let started = orchestrator.start_components().await.unwrap();
        assert_eq!(started, vec!["b", "c"]);
        assert_eq!(state(&client, "c"), ComponentState::Running);
        mock.verify();
    }

    #[tokio::test]
    async fn slow_hook_times_out() {
        let (client, orchestrator) = setup(&["slow"], &[]).await;
        let orchestrator = Orchestrator::new(
            client.clone(),
            orchestrator.hooks().clone(),
            Some(Duration::from_millis(20)),
        );
        orchestrator
            .hooks()
            .insert("slow", Arc::new(RecordingHook::new().with_delay(Duration::from_secs(5))));

        let err = orchestrator.start_components().await.unwrap_err();
        assert!(matches!(err, OrchestratorError::HookTimeout { .. }));
        assert_eq!(state(&client, "slow"), ComponentState::Error);
    }

    #[tokio::test]
    async fn stop_failure_does_not_stop_the_walk() {
        let (client, orchestrator) = setup(&["a", "b"], &[("b", "a")]).await;
        orchestrator.start_components().await.unwrap();

        let mut mock = MockHook::new();
        mock.expect_stop("b").return_err("flush failed");
        orchestrator.hooks().insert("b", Arc::new(mock.clone()));

        let err = orchestrator.shutdown_components().await.unwrap_err();
        assert!(matches!(err, OrchestratorError::HookFailed { ref id, .. } if id == "b"));
        assert_eq!(state(&client, "b"), ComponentState::Error);
        assert_eq!(state(&client, "a"), ComponentState::Stopped);
    }

    #[tokio::test]
    async fn components_added_mid_startup_are_left_for_the_next_pass() {
        let (client, orchestrator) = setup(&["a"], &[]).await;
        let late = client.clone();
        let gate = RecordingHook::new().on_start(move |_| {
            let late = late.clone();
            tokio::spawn(async move {
                late.register(Component::new("late", "Late", ComponentType::Custom, "1.0.0"))
                    .await
            });
        });
        orchestrator.hooks().insert("a", Arc::new(gate));

        let started = orchestrator.start_components().await.unwrap();
        assert_eq!(started, vec!["a"]);

        // wait for the spawned registration to land
        let mut stream = client.subscribe_components();
        while !stream.current().contains_key("late") {
            stream.changed().await.unwrap();
        }
        assert_eq!(state(&client, "late"), ComponentState::Registered);
        assert_eq!(orchestrator.start_components().await.unwrap(), vec!["late"]);
    }

    #[tokio::test]
    async fn component_unregistered_before_its_turn_is_skipped() {
        let (client, orchestrator) = setup(&["a", "b", "c"], &[]).await;
        orchestrator
            .hooks()
            .insert("a", WritingHook::new(&client, Phase::Start, vec![Write::Unregister("b")]));

        let started = orchestrator.start_components().await.unwrap();
        assert_eq!(started, vec!["a", "c"]);
        assert!(client.get_component("b").is_none());
        assert_eq!(state(&client, "c"), ComponentState::Running);
    }

    #[tokio::test]
    async fn dependent_of_a_late_component_stays_registered() {
        let (client, orchestrator) = setup(&["a", "b"], &[]).await;
        orchestrator.hooks().insert(
            "a",
            WritingHook::new(
                &client,
                Phase::Start,
                vec![Write::Register("late"), Write::Depend("b", "late")],
            ),
        );

        let started = orchestrator.start_components().await.unwrap();
        assert_eq!(started, vec!["a"]);
        assert_eq!(state(&client, "b"), ComponentState::Registered);
        assert_eq!(state(&client, "late"), ComponentState::Registered);

        // the next pass picks both up in dependency order
        assert_eq!(orchestrator.start_components().await.unwrap(), vec!["late", "b"]);
    }

    #[tokio::test]
    async fn component_unregistering_itself_during_start_is_skipped() {
        let (client, orchestrator) = setup(&["a", "leaf"], &[]).await;
        orchestrator
            .hooks()
            .insert("leaf", WritingHook::new(&client, Phase::Start, vec![Write::Unregister("leaf")]));

        let started = orchestrator.start_components().await.unwrap();
        assert_eq!(started, vec!["a"]);
        assert!(client.get_component("leaf").is_none());
        assert_eq!(state(&client, "a"), ComponentState::Running);
    }

    #[tokio::test]
    async fn component_unregistering_itself_during_stop_does_not_end_the_walk() {
        let (client, orchestrator) = setup(&["a", "leaf"], &[]).await;
        orchestrator
            .hooks()
            .insert("leaf", WritingHook::new(&client, Phase::Stop, vec![Write::Unregister("leaf")]));
        assert_eq!(orchestrator.start_components().await.unwrap(), vec!["a", "leaf"]);

        let stopped = orchestrator.shutdown_components().await.unwrap();
        assert_eq!(stopped, vec!["a"]);
        assert!(client.get_component("leaf").is_none());
        assert_eq!(state(&client, "a"), ComponentState::Stopped);
    }
}
