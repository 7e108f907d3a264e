//! Client-side planning of process instance modifications
//!
//! The simulator records add/move/cancel token gestures without touching any
//! server state. Badge counts are always folded from the recorded list, so
//! they cannot drift from it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::SimulationError;
use crate::model::FlowNodeId;

/// A planned, uncommitted change to a running process instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Modification {
    #[serde(rename_all = "camelCase")]
    AddToken {
        target_flow_node_id: FlowNodeId,
        token_count: u32,
    },
    #[serde(rename_all = "camelCase")]
    MoveToken {
        source_flow_node_id: FlowNodeId,
        target_flow_node_id: FlowNodeId,
        token_count: u32,
    },
    #[serde(rename_all = "camelCase")]
    CancelToken {
        source_flow_node_id: FlowNodeId,
        token_count: u32,
    },
}

impl Modification {
    pub fn source(&self) -> Option<&FlowNodeId> {
        match self {
            Self::AddToken { .. } => None,
            Self::MoveToken {
                source_flow_node_id,
                ..
            }
            | Self::CancelToken {
                source_flow_node_id,
                ..
            } => Some(source_flow_node_id),
        }
    }

    pub fn target(&self) -> Option<&FlowNodeId> {
        match self {
            Self::AddToken {
                target_flow_node_id,
                ..
            }
            | Self::MoveToken {
                target_flow_node_id,
                ..
            } => Some(target_flow_node_id),
            Self::CancelToken { .. } => None,
        }
    }

    pub fn token_count(&self) -> u32 {
        match self {
            Self::AddToken { token_count, .. }
            | Self::MoveToken { token_count, .. }
            | Self::CancelToken { token_count, .. } => *token_count,
        }
    }
}

/// Pending token counts for one flow node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeSummary {
    pub new_token_count: u32,
    pub cancelled_token_count: u32,
}

/// Where the planning gesture currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SimulationStatus {
    #[default]
    Idle,
    MovingToken {
        source: FlowNodeId,
    },
    AddingToken,
}

impl SimulationStatus {
    fn describe(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::MovingToken { .. } => "moving a token",
            Self::AddingToken => "adding a token",
        }
    }
}

/// Planning state machine scoped to one process instance
#[derive(Debug, Default)]
pub struct ModificationSimulator {
    active: bool,
    status: SimulationStatus,
    modifications: Vec<Modification>,
}

impl ModificationSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter modification mode
    pub fn enable(&mut self) {
        self.active = true;
    }

    /// Leave modification mode, dropping every pending modification
    pub fn disable(&mut self) {
        self.reset();
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn status(&self) -> &SimulationStatus {
        &self.status
    }

    pub fn modifications(&self) -> &[Modification] {
        &self.modifications
    }

    pub fn start_moving_token(&mut self, from: impl Into<FlowNodeId>) -> Result<(), SimulationError> {
        self.require_idle("start moving a token")?;
        self.status = SimulationStatus::MovingToken {
            source: from.into(),
        };
        Ok(())
    }

    pub fn start_adding_token(&mut self) -> Result<(), SimulationError> {
        self.require_idle("start adding a token")?;
        self.status = SimulationStatus::AddingToken;
        Ok(())
    }

    /// Complete the current gesture with the flow node picked on the diagram
    ///
    /// Picking the move source itself ends the gesture without a
    /// modification. Returns the appended modification, if any.
    pub fn select_flow_node(
        &mut self,
        target: impl Into<FlowNodeId>,
    ) -> Result<Option<&Modification>, SimulationError> {
        let target = target.into();
        let modification = match std::mem::take(&mut self.status) {
            SimulationStatus::Idle => {
                return Err(SimulationError::invalid_transition(
                    "select a target flow node",
                    "idle",
                ));
            }
            SimulationStatus::MovingToken { source } if source == target => {
                log::debug!("move of '{}' onto itself ignored", source);
                return Ok(None);
            }
            SimulationStatus::MovingToken { source } => Modification::MoveToken {
                source_flow_node_id: source,
                target_flow_node_id: target,
                token_count: 1,
            },
            SimulationStatus::AddingToken => Modification::AddToken {
                target_flow_node_id: target,
                token_count: 1,
            },
        };
        self.modifications.push(modification);
        Ok(self.modifications.last())
    }

    /// Plan cancelling `count` tokens at a flow node
    pub fn cancel_token(
        &mut self,
        flow_node_id: impl Into<FlowNodeId>,
        count: u32,
    ) -> Result<(), SimulationError> {
        self.require_idle("cancel a token")?;
        let flow_node_id = flow_node_id.into();
        if count == 0 {
            return Err(SimulationError::InvalidTokenCount {
                flow_node_id,
                count,
            });
        }
        self.modifications.push(Modification::CancelToken {
            source_flow_node_id: flow_node_id,
            token_count: count,
        });
        Ok(())
    }

    /// Abandon the gesture in progress
    pub fn discard(&mut self) -> Result<(), SimulationError> {
        if self.status == SimulationStatus::Idle {
            return Err(SimulationError::invalid_transition("discard", "idle"));
        }
        self.status = SimulationStatus::Idle;
        Ok(())
    }

    /// Drop the most recent modification
    pub fn undo_last(&mut self) -> Result<Option<Modification>, SimulationError> {
        self.require_idle("undo a modification")?;
        Ok(self.modifications.pop())
    }

    /// Clear every pending modification and return to idle
    pub fn reset(&mut self) {
        self.modifications.clear();
        self.status = SimulationStatus::Idle;
    }

    /// Fold the modification list into per-node badge counts
    ///
    /// Counts saturate at `u32::MAX`.
    pub fn badges_by_flow_node(&self) -> BTreeMap<FlowNodeId, BadgeSummary> {
        let mut badges: BTreeMap<FlowNodeId, BadgeSummary> = BTreeMap::new();
        for modification in &self.modifications {
            let count = modification.token_count();
            if let Some(target) = modification.target() {
                let badge = badges.entry(target.clone()).or_default();
                badge.new_token_count = badge.new_token_count.saturating_add(count);
            }
            if let Some(source) = modification.source() {
                let badge = badges.entry(source.clone()).or_default();
                badge.cancelled_token_count = badge.cancelled_token_count.saturating_add(count);
            }
        }
        badges
    }

    /// Whether the node's current tokens are planned to leave it
    pub fn has_pending_cancel_or_move(&self, flow_node_id: &str) -> bool {
        self.modifications
            .iter()
            .any(|m| m.source().map(FlowNodeId::as_str) == Some(flow_node_id))
    }

    fn require_idle(&self, operation: &'static str) -> Result<(), SimulationError> {
        if !self.active {
            return Err(SimulationError::mode_inactive(operation));
        }
        if self.status != SimulationStatus::Idle {
            return Err(SimulationError::invalid_transition(
                operation,
                self.status.describe(),
            ));
        }
        Ok(())
    }
}
