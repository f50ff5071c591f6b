//! # Orchestrator App
//!
//! The process that owns a [`Supervisor`](component_orchestrator::Supervisor): it builds
//! the well-known core seed, initializes it, reports stats and shuts it down.
//!
//! ## 🚀 Modules
//!
//! - **[seed]**: the static set of core subsystems and the dependencies between them.
//! - **[hooks]**: [`SubsystemHook`](hooks::SubsystemHook), a start/stop hook that simulates
//!   asynchronous subsystem bring-up.
//! - **[error]**: [`AppError`](error::AppError), what `main` can fail with.
//!
//! ## 📚 Quick Start
//!
//! The entry point is in `main.rs`:
//! 1. `setup_tracing()`
//! 2. `OrchestratorConfig::from_env()`
//! 3. `Supervisor::new(config, seed::core_seed(..))`, then `initialize()`
//! 4. log [`stats`](component_orchestrator::Supervisor::stats)
//! 5. `shutdown()` and `close()`

pub mod error;
pub mod hooks;
pub mod seed;
