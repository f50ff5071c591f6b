//! # Core Seed
//!
//! The subsystems every process brings up, and what each needs before it can start.
//!
//! ```text
//! security, device, performance-monitor ──► core-runtime
//! data-store, network                   ──► security
//! platform                              ──► device
//! ai-assistant                          ──► data-store, network
//! ui-shell                              ──► platform, data-store, ai-assistant
//! ```

use crate::hooks::SubsystemHook;
use component_orchestrator::{Component, ComponentType, Seed};
use std::sync::Arc;

pub const CORE_RUNTIME: &str = "core-runtime";
pub const SECURITY: &str = "security";
pub const DATA_STORE: &str = "data-store";
pub const NETWORK: &str = "network";
pub const DEVICE: &str = "device";
pub const PLATFORM: &str = "platform";
pub const AI_ASSISTANT: &str = "ai-assistant";
pub const PERFORMANCE_MONITOR: &str = "performance-monitor";
pub const UI_SHELL: &str = "ui-shell";

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// (id, name, type)
const COMPONENTS: &[(&str, &str, ComponentType)] = &[
    (CORE_RUNTIME, "Core Runtime", ComponentType::Core),
    (SECURITY, "Security Manager", ComponentType::Security),
    (DATA_STORE, "Data Store", ComponentType::Data),
    (NETWORK, "Network Stack", ComponentType::Network),
    (DEVICE, "Device Manager", ComponentType::Device),
    (PLATFORM, "Platform Services", ComponentType::Platform),
    (AI_ASSISTANT, "AI Assistant", ComponentType::Ai),
    (PERFORMANCE_MONITOR, "Performance Monitor", ComponentType::Performance),
    (UI_SHELL, "UI Shell", ComponentType::Ui),
];

/// (component, dependency)
const DEPENDENCIES: &[(&str, &str)] = &[
    (SECURITY, CORE_RUNTIME),
    (DEVICE, CORE_RUNTIME),
    (PERFORMANCE_MONITOR, CORE_RUNTIME),
    (DATA_STORE, SECURITY),
    (NETWORK, SECURITY),
    (PLATFORM, DEVICE),
    (AI_ASSISTANT, DATA_STORE),
    (AI_ASSISTANT, NETWORK),
    (UI_SHELL, PLATFORM),
    (UI_SHELL, DATA_STORE),
    (UI_SHELL, AI_ASSISTANT),
];

/// Every core subsystem, each driven by `hook`.
pub fn core_seed(hook: SubsystemHook) -> Seed {
    let hook = Arc::new(hook);
    let seed = COMPONENTS.iter().fold(Seed::new(), |seed, (id, name, kind)| {
        let component = Component::new(*id, *name, *kind, VERSION).with_metadata("tier", "core");
        seed.component_with_hook(component, hook.clone())
    });
    DEPENDENCIES
        .iter()
        .fold(seed, |seed, (component, dependency)| seed.dependency(*component, *dependency))
}

pub fn component_count() -> usize {
    COMPONENTS.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_edge_names_a_seeded_component() {
        for (component, dependency) in DEPENDENCIES {
            assert!(COMPONENTS.iter().any(|(id, _, _)| id == component));
            assert!(COMPONENTS.iter().any(|(id, _, _)| id == dependency));
        }
        assert_eq!(core_seed(SubsystemHook::default()).len(), component_count());
    }
}
