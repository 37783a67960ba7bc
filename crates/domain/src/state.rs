//! Scenario execution state machine.
//!
//! ```text
//! Idle -> Sending -> AwaitingAssertions -> Reported
//!            |              |
//!            |              +-> Sending (next step)
//!            +-> NetworkFailure
//! ```
//!
//! `Reported` and `NetworkFailure` are terminal. `Idle -> Reported` covers a
//! scenario with no steps.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Where a scenario is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    /// Not started.
    #[default]
    Idle,
    /// A request is in flight.
    Sending,
    /// A response was captured; assertions are running.
    AwaitingAssertions,
    /// All steps finished and the outcome was recorded.
    Reported,
    /// A transport error ended the scenario.
    NetworkFailure,
}

impl ScenarioState {
    /// Returns true if no further transition is allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Reported | Self::NetworkFailure)
    }

    /// Returns true if `next` is reachable from this state in one move.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle | Self::AwaitingAssertions, Self::Sending)
                | (Self::Sending, Self::AwaitingAssertions | Self::NetworkFailure)
                | (Self::Idle | Self::AwaitingAssertions, Self::Reported)
        )
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidStateTransition`] if the move is not allowed.
    pub fn transition(self, next: Self) -> DomainResult<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidStateTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Sending => "sending",
            Self::AwaitingAssertions => "awaiting_assertions",
            Self::Reported => "reported",
            Self::NetworkFailure => "network_failure",
        };
        f.write_str(name)
    }
}
