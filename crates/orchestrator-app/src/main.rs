//! # Orchestrator App
//!
//! Brings the core subsystems up in dependency order, reports what is running and
//! tears everything down again in reverse.
//!
//! ```bash
//! RUST_LOG=info cargo run -p orchestrator-app
//! ORCHESTRATOR_HOOK_TIMEOUT_MS=500 RUST_LOG=debug cargo run -p orchestrator-app
//! ```

use component_orchestrator::tracing::setup_tracing;
use component_orchestrator::{OrchestratorConfig, Supervisor};
use orchestrator_app::error::AppError;
use orchestrator_app::hooks::SubsystemHook;
use orchestrator_app::seed::{self, core_seed};
use std::time::Duration;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = OrchestratorConfig::from_env()?;
    info!(?config, "Starting orchestrator");

    let hook = SubsystemHook::new(Duration::from_millis(25), Duration::from_millis(10));
    let supervisor = Supervisor::new(config, core_seed(hook));

    let span = tracing::info_span!("startup");
    let started = async { supervisor.initialize().await }.instrument(span).await;

    let outcome = match started {
        Ok(started) if started.len() == seed::component_count() => {
            info!(order = ?started, "All components running");
            Ok(())
        }
        Ok(started) => Err(AppError::Incomplete {
            started: started.len(),
            expected: seed::component_count(),
        }),
        Err(e) => Err(e.into()),
    };
    if let Err(e) = &outcome {
        error!(error = %e, "Startup failed");
    }

    let stats = supervisor.stats();
    info!(
        total = stats.total_components,
        running = stats.running_components,
        dependencies = stats.total_dependencies,
        by_type = ?stats.by_type,
        "Orchestrator stats"
    );

    let span = tracing::info_span!("shutdown");
    async {
        match supervisor.shutdown().await {
            Ok(stopped) => info!(order = ?stopped, "All components stopped"),
            Err(e) => error!(error = %e, "Shutdown failed"),
        }
    }
    .instrument(span)
    .await;

    supervisor.close().await?;

    outcome?;
    info!("Application completed successfully");
    Ok(())
}
