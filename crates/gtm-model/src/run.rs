//! Run-level state machine.
//!
//! ```text
//! Init -> Validating -> DryRunDone
//!                    -> ResolvingContainer -> Authenticating
//!                       -> PreparingWorkspace -> Creating -> Finalized(status)
//! ```
//!
//! `Interrupted` and `Aborted` are reachable from every non-terminal state.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::stats::RunStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Init,
    Validating,
    DryRunDone,
    ResolvingContainer,
    Authenticating,
    PreparingWorkspace,
    Creating,
    Finalized(RunStatus),
    Interrupted,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid run state transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: RunState,
    pub to: RunState,
}

impl RunState {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Validating => "VALIDATING",
            Self::DryRunDone => "DRY_RUN_DONE",
            Self::ResolvingContainer => "RESOLVING_CONTAINER",
            Self::Authenticating => "AUTHENTICATING",
            Self::PreparingWorkspace => "PREPARING_WORKSPACE",
            Self::Creating => "CREATING",
            Self::Finalized(_) => "FINALIZED",
            Self::Interrupted => "INTERRUPTED",
            Self::Aborted => "ABORTED",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::DryRunDone | Self::Finalized(_) | Self::Interrupted | Self::Aborted
        )
    }

    /// Status carried by a finalized run.
    pub const fn status(&self) -> Option<RunStatus> {
        match self {
            Self::Finalized(status) => Some(*status),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: RunState) -> bool {
        if self.is_terminal() {
            return false;
        }
        if matches!(next, Self::Interrupted | Self::Aborted) {
            return true;
        }
        matches!(
            (self, next),
            (Self::Init, Self::Validating)
                | (Self::Validating, Self::DryRunDone)
                | (Self::Validating, Self::ResolvingContainer)
                | (Self::ResolvingContainer, Self::Authenticating)
                | (Self::Authenticating, Self::PreparingWorkspace)
                | (Self::PreparingWorkspace, Self::Creating)
                | (Self::Creating, Self::Finalized(_))
        )
    }

    pub fn transition(self, next: RunState) -> Result<RunState, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finalized(status) => write!(f, "FINALIZED({status})"),
            other => f.write_str(other.label()),
        }
    }
}

impl Serialize for RunState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
