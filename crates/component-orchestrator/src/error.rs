//! # Orchestrator Errors
//!
//! Business-rule rejections (duplicate id, capacity, cycles, missing endpoints,
//! remaining dependents) are *not* errors: those operations return `bool`.
//! The types here cover the cases that must be loud: a closed registry actor,
//! invariant violations found during validation or ordering, and hook failures.

use crate::component::ComponentState;
use crate::lifecycle::LifecycleState;
use std::time::Duration;

/// Errors that can occur within the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Registry actor closed")]
    ActorClosed,
    #[error("Registry actor dropped response channel")]
    ActorDropped,
    #[error("Component not found: {0}")]
    NotFound(String),
    #[error("Component {id}: illegal transition {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: ComponentState,
        to: ComponentState,
    },
    #[error("Illegal lifecycle transition {from} -> {to}")]
    InvalidLifecycleTransition {
        from: LifecycleState,
        to: LifecycleState,
    },
    #[error("Component {component} depends on unknown component {dependency}")]
    MissingDependency {
        component: String,
        dependency: String,
    },
    #[error("Dependency cycle detected at {0}")]
    CycleDetected(String),
    #[error("Hook for {id} failed: {source}")]
    HookFailed {
        id: String,
        #[source]
        source: HookError,
    },
    #[error("Hook for {id} timed out after {timeout:?}")]
    HookTimeout { id: String, timeout: Duration },
    #[error("Seed rejected: {0}")]
    InvalidSeed(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Registry actor task failed: {0}")]
    TaskFailed(String),
}

/// Failure reported by a component's start or stop hook.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying collaborator error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<String> for HookError {
    fn from(message: String) -> Self {
        HookError::new(message)
    }
}

impl From<&str> for HookError {
    fn from(message: &str) -> Self {
        HookError::new(message)
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
