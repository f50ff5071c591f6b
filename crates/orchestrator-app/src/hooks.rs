//! # Subsystem Hooks
//!
//! Real subsystems open connections, load models and build window trees when they
//! start. [`SubsystemHook`] stands in for that work with a configurable delay, so the
//! demo exercises the same await points a real integration would.

use async_trait::async_trait;
use component_orchestrator::{Component, ComponentHook, HookError};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct SubsystemHook {
    startup: Duration,
    shutdown: Duration,
}

impl SubsystemHook {
    pub fn new(startup: Duration, shutdown: Duration) -> Self {
        Self { startup, shutdown }
    }

    /// The same delay for both phases.
    pub fn uniform(delay: Duration) -> Self {
        Self::new(delay, delay)
    }
}

#[async_trait]
impl ComponentHook for SubsystemHook {
    async fn start(&self, component: &Component) -> Result<(), HookError> {
        debug!(id = %component.id, delay = ?self.startup, "Bringing up subsystem");
        tokio::time::sleep(self.startup).await;
        info!(
            id = %component.id,
            kind = ?component.component_type,
            version = %component.version,
            "Subsystem up"
        );
        Ok(())
    }

    async fn stop(&self, component: &Component) -> Result<(), HookError> {
        debug!(id = %component.id, delay = ?self.shutdown, "Tearing down subsystem");
        tokio::time::sleep(self.shutdown).await;
        info!(id = %component.id, "Subsystem down");
        Ok(())
    }
}
