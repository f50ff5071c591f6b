//! # Registry Actor
//!
//! The single writer for the component registry and the dependency graph. Every
//! mutation arrives as a [`RegistryRequest`] on an mpsc channel and is applied in
//! arrival order, so concurrent callers cannot lose each other's updates.
//!
//! After each successful mutation the actor publishes a new [`Snapshot`] on a
//! `watch` channel. Reads never go through the actor: clients borrow the latest
//! snapshot directly. Because the snapshot is published before the response is sent,
//! a caller always observes its own write.

use crate::client::OrchestratorClient;
use crate::config::OrchestratorConfig;
use crate::graph::DependencyGraph;
use crate::message::RegistryRequest;
use crate::registry::ComponentRegistry;
use crate::snapshot::Snapshot;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Owns the registry and graph and serializes every write to them.
///
/// Create it with [`RegistryActor::new`], spawn [`RegistryActor::run`] on the runtime
/// and talk to it through the returned [`OrchestratorClient`].
pub struct RegistryActor {
    receiver: mpsc::Receiver<RegistryRequest>,
    registry: ComponentRegistry,
    graph: DependencyGraph,
    snapshots: watch::Sender<Snapshot>,
    version: u64,
}

impl RegistryActor {
    pub fn new(config: &OrchestratorConfig) -> (Self, OrchestratorClient) {
        let (sender, receiver) = mpsc::channel(config.channel_buffer.max(1));
        let registry = ComponentRegistry::new(config.capacity);
        let graph = DependencyGraph::new(config.max_dependency_depth);
        let (snapshots, snapshot_rx) = watch::channel(Snapshot {
            components: registry.snapshot(),
            dependencies: graph.snapshot(),
            version: 0,
        });
        let actor = Self {
            receiver,
            registry,
            graph,
            snapshots,
            version: 0,
        };
        let client = OrchestratorClient::new(sender, snapshot_rx);
        (actor, client)
    }

    /// Processes requests until every client is dropped or a `Close` arrives.
    pub async fn run(mut self) {
        info!(
            capacity = self.registry.capacity(),
            max_depth = self.graph.max_depth(),
            "Registry actor started"
        );

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                RegistryRequest::Register {
                    component,
                    respond_to,
                } => {
                    debug!(?component, "Register");
                    let id = component.id.clone();
                    let ok = self.registry.register(component);
                    if ok {
                        self.publish();
                        info!(%id, size = self.registry.len(), "Component registered");
                    }
                    let _ = respond_to.send(ok);
                }
                RegistryRequest::Unregister { id, respond_to } => {
                    debug!(%id, "Unregister");
                    let ok = self.registry.unregister(&id, &mut self.graph);
                    if ok {
                        self.publish();
                        info!(%id, size = self.registry.len(), "Component unregistered");
                    }
                    let _ = respond_to.send(ok);
                }
                RegistryRequest::AddDependency {
                    component_id,
                    dependency_id,
                    respond_to,
                } => {
                    debug!(%component_id, %dependency_id, "AddDependency");
                    let ok = self
                        .graph
                        .add_dependency(&self.registry, &component_id, &dependency_id);
                    if ok {
                        self.publish();
                    }
                    let _ = respond_to.send(ok);
                }
                RegistryRequest::RemoveDependency {
                    component_id,
                    dependency_id,
                    respond_to,
                } => {
                    debug!(%component_id, %dependency_id, "RemoveDependency");
                    let ok = self.graph.remove_dependency(&component_id, &dependency_id);
                    if ok {
                        self.publish();
                    }
                    let _ = respond_to.send(ok);
                }
                RegistryRequest::UpdateState {
                    id,
                    state,
                    respond_to,
                } => {
                    let result = self.registry.update_state(&id, state);
                    match &result {
                        Ok(previous) => {
                            self.publish();
                            debug!(%id, from = %previous, to = %state, "State updated");
                        }
                        Err(e) => warn!(%id, error = %e, "State update rejected"),
                    }
                    let _ = respond_to.send(result);
                }
                RegistryRequest::Close => {
                    debug!("Close requested");
                    break;
                }
            }
        }

        info!(
            size = self.registry.len(),
            edges = self.graph.edge_count(),
            "Registry actor shutdown"
        );
    }

    fn publish(&mut self) {
        self.version += 1;
        self.snapshots.send_replace(Snapshot {
            components: self.registry.snapshot(),
            dependencies: self.graph.snapshot(),
            version: self.version,
        });
    }
}
