//! Error types for overlay reconciliation and modification planning

use thiserror::Error;

use crate::model::FlowNodeId;

/// Errors raised while computing the desired overlay set
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    /// A statistics snapshot carried an execution state outside the known four
    #[error("flow node '{flow_node_id}' has unknown execution state '{tag}'")]
    UnknownExecutionState { flow_node_id: String, tag: String },
}

impl OverlayError {
    /// Create an unknown execution state error
    pub fn unknown_state(flow_node_id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::UnknownExecutionState {
            flow_node_id: flow_node_id.into(),
            tag: tag.into(),
        }
    }
}

/// Caller-contract violations of the modification planning state machine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// The intent is not valid in the simulator's current status
    #[error("cannot {operation} while {status}")]
    InvalidTransition {
        operation: &'static str,
        status: &'static str,
    },

    /// Modification mode is not enabled
    #[error("cannot {operation}: modification mode is not active")]
    ModeInactive { operation: &'static str },

    /// Cancelling zero tokens
    #[error("cannot cancel {count} tokens on flow node '{flow_node_id}'")]
    InvalidTokenCount { flow_node_id: FlowNodeId, count: u32 },
}

impl SimulationError {
    /// Create an invalid transition error
    pub fn invalid_transition(operation: &'static str, status: &'static str) -> Self {
        Self::InvalidTransition { operation, status }
    }

    /// Create a mode inactive error
    pub fn mode_inactive(operation: &'static str) -> Self {
        Self::ModeInactive { operation }
    }
}

/// Errors reported by the commit channel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommitError {
    /// The backend refused the modification list
    #[error("modifications rejected: {0}")]
    Rejected(String),

    /// There is no process instance to commit against
    #[error("no process instance selected")]
    NoProcessInstance,
}

/// Errors surfaced by the diagram sync controller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("overlay error: {0}")]
    Overlay(#[from] OverlayError),

    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("commit error: {0}")]
    Commit(#[from] CommitError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_state_display() {
        let err = OverlayError::unknown_state("task_a", "suspended");
        let msg = err.to_string();
        assert!(msg.contains("task_a"));
        assert!(msg.contains("suspended"));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = SimulationError::invalid_transition("cancel a token", "moving a token");
        assert_eq!(err.to_string(), "cannot cancel a token while moving a token");
    }

    #[test]
    fn test_sync_error_wraps_simulation_error() {
        let err: SyncError = SimulationError::mode_inactive("start moving a token").into();
        assert!(matches!(err, SyncError::Simulation(_)));
        assert!(err.to_string().contains("modification mode is not active"));
    }
}
