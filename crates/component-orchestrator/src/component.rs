//! # Component Model
//!
//! A [`Component`] is the registry's record of one external subsystem: its identity,
//! a type tag, a version, free-form metadata and the current [`ComponentState`].
//!
//! The state field is the only thing that changes after registration, and it only
//! changes along the edges of the per-component state machine:
//!
//! ```text
//! Registered ──► Starting ──► Running ──► Stopping ──► Stopped
//!     │             │            │            │
//!     └─────────────┴─────┬──────┴────────────┘
//!                         ▼
//!                       Error ──► Starting   (retry)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier of a component.
pub type ComponentId = String;

/// Coarse classification of the subsystem a component stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    Core,
    Ui,
    Data,
    Network,
    Device,
    Ai,
    Security,
    Performance,
    Platform,
    Custom,
}

/// Per-component lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentState {
    Registered,
    Starting,
    Running,
    Stopping,
    Stopped,
    Error,
}

impl ComponentState {
    /// Returns true if the state machine allows moving from `self` to `next`.
    ///
    /// `Error` is reachable from every state. `Error -> Starting` is allowed so that
    /// a failed component can be retried by a later startup pass.
    pub fn can_transition_to(self, next: ComponentState) -> bool {
        use ComponentState::*;
        matches!(
            (self, next),
            (Registered, Starting)
                | (Starting, Running)
                | (Running, Stopping)
                | (Stopping, Stopped)
                | (Error, Starting)
                | (_, Error)
        )
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentState::Registered => "REGISTERED",
            ComponentState::Starting => "STARTING",
            ComponentState::Running => "RUNNING",
            ComponentState::Stopping => "STOPPING",
            ComponentState::Stopped => "STOPPED",
            ComponentState::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A named, versioned unit tracked by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub component_type: ComponentType,
    pub version: String,
    pub state: ComponentState,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Component {
    /// Creates a component in the `Registered` state with no metadata.
    pub fn new(
        id: impl Into<ComponentId>,
        name: impl Into<String>,
        component_type: ComponentType,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            component_type,
            version: version.into(),
            state: ComponentState::Registered,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Overrides the initial state the component is registered with.
    pub fn with_state(mut self, state: ComponentState) -> Self {
        self.state = state;
        self
    }
}
