//! # Component Hooks
//!
//! The orchestrator does not know what a component *is*. It only knows that each
//! component may provide a [`ComponentHook`] whose `start` is awaited during startup
//! and whose `stop` is awaited during shutdown. A UI layer might build its window
//! tree in `start`; a storage layer might open its connection pool.
//!
//! Both methods have no-op defaults, so a hook only implements the phases it needs.
//! Components registered without a hook get [`NoopHook`].

use crate::component::{Component, ComponentId};
use crate::error::HookError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Collaborator called by the orchestrator when a component starts or stops.
#[async_trait]
pub trait ComponentHook: Send + Sync + 'static {
    async fn start(&self, _component: &Component) -> Result<(), HookError> {
        Ok(())
    }

    async fn stop(&self, _component: &Component) -> Result<(), HookError> {
        Ok(())
    }
}

/// Hook that does nothing in either phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl ComponentHook for NoopHook {}

/// Shared table of hooks keyed by component id.
///
/// The lock is only held to clone an `Arc` in or out, never across an `.await`.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: Arc<RwLock<HashMap<ComponentId, Arc<dyn ComponentHook>>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: impl Into<ComponentId>, hook: Arc<dyn ComponentHook>) {
        self.hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), hook);
    }

    /// Inserts `hook` unless `id` already has one. Returns true if it was inserted.
    pub fn insert_if_absent(&self, id: impl Into<ComponentId>, hook: Arc<dyn ComponentHook>) -> bool {
        let mut hooks = self.hooks.write().unwrap_or_else(PoisonError::into_inner);
        let id = id.into();
        if hooks.contains_key(&id) {
            return false;
        }
        hooks.insert(id, hook);
        true
    }

    pub fn remove(&self, id: &str) -> Option<Arc<dyn ComponentHook>> {
        self.hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Hook for `id`, falling back to [`NoopHook`].
    pub fn get(&self, id: &str) -> Arc<dyn ComponentHook> {
        self.hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .unwrap_or_else(|| Arc::new(NoopHook))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hooks = self.hooks.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("HookRegistry")
            .field("components", &hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}
