//! # Mock Hooks & Testing Guide
//!
//! Hooks are the orchestrator's only outbound calls, so they are where tests inject
//! behavior. Two helpers cover the common cases:
//!
//! | Helper | Use it to |
//! |--------|-----------|
//! | [`MockHook`] | Script exact outcomes per call and assert every scripted call happened |
//! | [`RecordingHook`] | Accept every call and record the order it happened in |
//!
//! ## Scripting failures
//!
//! ```rust
//! use component_orchestrator::mock::MockHook;
//! use component_orchestrator::{Component, ComponentHook, ComponentType};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockHook::new();
//!     mock.expect_start("db").return_err("connection refused");
//!
//!     let db = Component::new("db", "Database", ComponentType::Data, "1.0.0");
//!     assert!(mock.start(&db).await.is_err());
//!     mock.verify();
//! }
//! ```
//!
//! ## Recording order
//!
//! One `RecordingHook` can be shared by many components; clones share the log.
//!
//! ```rust
//! use component_orchestrator::mock::RecordingHook;
//! use component_orchestrator::{Component, ComponentHook, ComponentType};
//!
//! #[tokio::main]
//! async fn main() {
//!     let recorder = RecordingHook::new();
//!     let a = Component::new("a", "A", ComponentType::Core, "1.0.0");
//!     let b = Component::new("b", "B", ComponentType::Core, "1.0.0");
//!     recorder.start(&a).await.unwrap();
//!     recorder.start(&b).await.unwrap();
//!     recorder.stop(&b).await.unwrap();
//!     assert_eq!(recorder.started(), vec!["a", "b"]);
//!     assert_eq!(recorder.stopped(), vec!["b"]);
//! }
//! ```

use crate::component::{Component, ComponentId};
use crate::error::HookError;
use crate::hook::ComponentHook;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Stop,
}

#[derive(Debug)]
struct Expectation {
    phase: Phase,
    id: ComponentId,
    response: Result<(), String>,
}

/// A hook that answers from a queue of scripted expectations.
///
/// Calls must arrive in the order they were scripted. An unscripted or out-of-order
/// call panics, which fails the test at the offending call.
#[derive(Clone, Default)]
pub struct MockHook {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl MockHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `start` call for `id`.
    pub fn expect_start(&mut self, id: impl Into<ComponentId>) -> HookExpectationBuilder {
        HookExpectationBuilder {
            phase: Phase::Start,
            id: id.into(),
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `stop` call for `id`.
    pub fn expect_stop(&mut self, id: impl Into<ComponentId>) -> HookExpectationBuilder {
        HookExpectationBuilder {
            phase: Phase::Stop,
            id: id.into(),
            expectations: self.expectations.clone(),
        }
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all hook expectations were met. {} remaining: {:?}", exps.len(), exps);
        }
    }

    fn answer(&self, phase: Phase, component: &Component) -> Result<(), HookError> {
        let next = self.expectations.lock().unwrap().pop_front();
        match next {
            Some(exp) if exp.phase == phase && exp.id == component.id => {
                exp.response.map_err(HookError::new)
            }
            Some(exp) => panic!(
                "Unexpected {:?} for {}; expected {:?} for {}",
                phase, component.id, exp.phase, exp.id
            ),
            None => panic!("Unexpected {:?} for {}; no expectations left", phase, component.id),
        }
    }
}

#[async_trait]
impl ComponentHook for MockHook {
    async fn start(&self, component: &Component) -> Result<(), HookError> {
        self.answer(Phase::Start, component)
    }

    async fn stop(&self, component: &Component) -> Result<(), HookError> {
        self.answer(Phase::Stop, component)
    }
}

/// Builder for a single hook expectation.
pub struct HookExpectationBuilder {
    phase: Phase,
    id: ComponentId,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl HookExpectationBuilder {
    /// Sets the expectation to succeed.
    pub fn return_ok(self) {
        self.push(Ok(()));
    }

    /// Sets the expectation to fail with `message`.
    pub fn return_err(self, message: impl Into<String>) {
        self.push(Err(message.into()));
    }

    fn push(self, response: Result<(), String>) {
        self.expectations.lock().unwrap().push_back(Expectation {
            phase: self.phase,
            id: self.id,
            response,
        });
    }
}

// =============================================================================
// RECORDING HOOK
// =============================================================================

/// One observed hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    Start(ComponentId),
    Stop(ComponentId),
}

type StartCallback = Arc<dyn Fn(&Component) + Send + Sync>;

/// A hook that always succeeds and records every call in a shared log.
#[derive(Clone, Default)]
pub struct RecordingHook {
    log: Arc<Mutex<Vec<HookCall>>>,
    delay: Option<Duration>,
    on_start: Option<StartCallback>,
}

impl RecordingHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `delay` inside every call before recording it.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Runs `callback` inside every `start`, before the call completes.
    pub fn on_start(mut self, callback: impl Fn(&Component) + Send + Sync + 'static) -> Self {
        self.on_start = Some(Arc::new(callback));
        self
    }

    pub fn calls(&self) -> Vec<HookCall> {
        self.log.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<ComponentId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HookCall::Start(id) => Some(id),
                HookCall::Stop(_) => None,
            })
            .collect()
    }

    pub fn stopped(&self) -> Vec<ComponentId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HookCall::Stop(id) => Some(id),
                HookCall::Start(_) => None,
            })
            .collect()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ComponentHook for RecordingHook {
    async fn start(&self, component: &Component) -> Result<(), HookError> {
        self.pause().await;
        if let Some(callback) = &self.on_start {
            callback(component);
        }
        self.log
            .lock()
            .unwrap()
            .push(HookCall::Start(component.id.clone()));
        Ok(())
    }

    async fn stop(&self, component: &Component) -> Result<(), HookError> {
        self.pause().await;
        self.log
            .lock()
            .unwrap()
            .push(HookCall::Stop(component.id.clone()));
        Ok(())
    }
}
