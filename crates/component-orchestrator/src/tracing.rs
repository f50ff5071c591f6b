//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing` subscriber filtered by `RUST_LOG`.
//! Call it once at process start; libraries and tests should not.
//!
//! ## What Gets Traced
//!
//! - **Registry actor**: startup, shutdown and every accepted or rejected write
//! - **Lifecycle**: every process transition (`from`, `to`)
//! - **Components**: start and stop of each component, with its id
//! - **Hooks**: failures and timeouts, with the component id and the cause
//!
//! ## Usage
//!
//! ```bash
//! # Lifecycle and per-component start/stop
//! RUST_LOG=info cargo run
//!
//! # Include rejected writes and skipped components
//! RUST_LOG=debug cargo run
//!
//! # Only the library
//! RUST_LOG=component_orchestrator=debug cargo run
//! ```
//!
//! With `RUST_LOG=info`, a two-component startup reads:
//!
//! ```text
//! INFO Registry actor started capacity=1000 max_depth=10
//! INFO initialize: Lifecycle transition from=UNINITIALIZED to=INITIALIZING
//! INFO initialize:start_components: Component running id=core-runtime
//! INFO initialize:start_components: Component running id=security
//! INFO initialize: Lifecycle transition from=INITIALIZING to=RUNNING
//! ```

/// Initializes the global subscriber. Panics if one is already installed.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
