//! # Component Orchestrator
//!
//! A registry of application components, a dependency graph between them and a
//! supervisor that starts them in dependency order and stops them in reverse.
//!
//! ## 🚀 Core Components
//!
//! - **[registry]**: [`ComponentRegistry`], a bounded map of [`Component`]s keyed by id.
//! - **[graph]**: [`DependencyGraph`], directed edges that are cycle-checked on insertion.
//! - **[topology]**: [`topological_order`], dependencies-first ordering of a snapshot.
//! - **[actor]** / **[client]**: the single-writer [`RegistryActor`] and its cloneable [`OrchestratorClient`].
//! - **[orchestrator]**: [`Orchestrator`], walks the order and calls each component's [`ComponentHook`].
//! - **[lifecycle]**: [`Supervisor`], the process-wide `initialize()` / `shutdown()` state machine.
//! - **[stats]**: [`OrchestratorStats`], counts by type and state.
//!
//! ## Architecture
//!
//! ```text
//!   callers ──► OrchestratorClient ──mpsc──► RegistryActor (owns registry + graph)
//!      ▲                                          │
//!      └──────────── watch<Snapshot> ◄────────────┘
//! ```
//!
//! Writes are serialized through the actor. Reads and subscriptions are served from the
//! latest published [`Snapshot`], which pairs the component map and the edge map from
//! the same instant.
//!
//! ## 📚 Quick Start
//!
//! ```rust
//! use component_orchestrator::{
//!     Component, ComponentState, ComponentType, LifecycleState, OrchestratorConfig, Seed, Supervisor,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let seed = Seed::new()
//!         .component(Component::new("core", "Core", ComponentType::Core, "1.0.0"))
//!         .component(Component::new("ui", "Shell", ComponentType::Ui, "1.0.0"))
//!         .dependency("ui", "core");
//!
//!     let supervisor = Supervisor::new(OrchestratorConfig::default(), seed);
//!     let started = supervisor.initialize().await.unwrap();
//!     assert_eq!(started, vec!["core", "ui"]);
//!     assert_eq!(supervisor.lifecycle_state(), LifecycleState::Running);
//!
//!     // cycles are refused
//!     assert!(!supervisor.add_dependency("core", "ui").await.unwrap());
//!
//!     let stopped = supervisor.shutdown().await.unwrap();
//!     assert_eq!(stopped, vec!["ui", "core"]);
//!     assert_eq!(supervisor.get_component("core").unwrap().state, ComponentState::Stopped);
//!     supervisor.close().await.unwrap();
//! }
//! ```
//!
//! ## 🧪 Testing
//!
//! See [`mock`] for scripted and recording hooks.

pub mod actor;
pub mod client;
pub mod component;
pub mod config;
pub mod error;
pub mod graph;
pub mod hook;
pub mod lifecycle;
pub mod message;
pub mod mock;
pub mod orchestrator;
pub mod registry;
pub mod snapshot;
pub mod stats;
pub mod topology;
pub mod tracing;

// Re-export core types for convenience
pub use actor::RegistryActor;
pub use client::OrchestratorClient;
pub use component::{Component, ComponentId, ComponentState, ComponentType};
pub use config::OrchestratorConfig;
pub use error::{HookError, OrchestratorError, OrchestratorResult};
pub use graph::{DependencyGraph, DependencyMap};
pub use hook::{ComponentHook, HookRegistry, NoopHook};
pub use lifecycle::{LifecycleState, Seed, Supervisor};
pub use orchestrator::Orchestrator;
pub use registry::{ComponentMap, ComponentRegistry};
pub use snapshot::{ComponentStream, DependencyStream, Snapshot, SnapshotStream};
pub use stats::OrchestratorStats;
pub use topology::topological_order;
