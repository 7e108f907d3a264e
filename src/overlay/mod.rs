//! Overlays attached to diagram elements
//!
//! An overlay is identified by its flow node and kind. At most one overlay
//! per key is attached at any time; the registry enforces this.

pub mod position;
pub mod registry;

pub use position::BadgePositionResolver;
pub use registry::{OverlayRegistry, ReconcileStats};

use crate::model::{BoundingBox, ExecutionState, FlowNodeId, Point, TargetValue};
use crate::modification::BadgeSummary;

/// Distances from the edges of an element's shape, in diagram units
///
/// Mirrors the positioning used by diagram viewers: `top`/`left` measure from
/// the top-left corner, `bottom`/`right` from the opposite edges.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlayPosition {
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
}

impl OverlayPosition {
    pub const fn new() -> Self {
        Self {
            top: None,
            right: None,
            bottom: None,
            left: None,
        }
    }

    pub fn top(mut self, top: f64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn right(mut self, right: f64) -> Self {
        self.right = Some(right);
        self
    }

    pub fn bottom(mut self, bottom: f64) -> Self {
        self.bottom = Some(bottom);
        self
    }

    pub fn left(mut self, left: f64) -> Self {
        self.left = Some(left);
        self
    }

    /// The anchor point on `bounds` this position resolves to
    ///
    /// Missing horizontal or vertical components fall back to the left or top
    /// edge respectively.
    pub fn anchor(&self, bounds: &BoundingBox) -> Point {
        let x = match (self.left, self.right) {
            (Some(left), _) => bounds.x + left,
            (None, Some(right)) => bounds.right() - right,
            (None, None) => bounds.x,
        };
        let y = match (self.top, self.bottom) {
            (Some(top), _) => bounds.y + top,
            (None, Some(bottom)) => bounds.bottom() - bottom,
            (None, None) => bounds.y,
        };
        Point::new(x, y)
    }
}

/// The kinds of overlay the engine manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverlayKind {
    /// Token count for one execution state
    State(ExecutionState),
    /// Pending modification counts
    ModificationBadge,
    /// Configured target value
    TargetValueBadge,
    /// Target value details for the hovered element
    TargetValueTooltip,
}

impl OverlayKind {
    pub fn class_name(&self) -> String {
        match self {
            Self::State(state) => format!("state-{}", state),
            Self::ModificationBadge => "modification-badge".to_string(),
            Self::TargetValueBadge => "target-value-badge".to_string(),
            Self::TargetValueTooltip => "target-value-tooltip".to_string(),
        }
    }
}

/// What an overlay displays; the variant determines its kind
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayPayload {
    State {
        state: ExecutionState,
        count: u64,
        /// Tokens are scheduled to leave the node by a pending modification
        faded: bool,
    },
    ModificationBadge(BadgeSummary),
    TargetValueBadge(TargetValue),
    TargetValueTooltip {
        target: TargetValue,
        measured: Option<u64>,
    },
}

impl OverlayPayload {
    pub fn kind(&self) -> OverlayKind {
        match self {
            Self::State { state, .. } => OverlayKind::State(*state),
            Self::ModificationBadge(_) => OverlayKind::ModificationBadge,
            Self::TargetValueBadge(_) => OverlayKind::TargetValueBadge,
            Self::TargetValueTooltip { .. } => OverlayKind::TargetValueTooltip,
        }
    }

    /// Short text label for the overlay
    pub fn label(&self) -> String {
        match self {
            Self::State { count, .. } => count.to_string(),
            Self::ModificationBadge(summary) => {
                let mut parts = Vec::new();
                if summary.new_token_count > 0 {
                    parts.push(format!("+{}", summary.new_token_count));
                }
                if summary.cancelled_token_count > 0 {
                    parts.push(format!("-{}", summary.cancelled_token_count));
                }
                parts.join(" ")
            }
            Self::TargetValueBadge(target) => target.value.to_string(),
            Self::TargetValueTooltip { target, measured } => match measured {
                Some(measured) => format!("target {} / actual {}", target, measured),
                None => format!("target {}", target),
            },
        }
    }
}

/// Registry key: one overlay per flow node and kind
pub type OverlayKey = (FlowNodeId, OverlayKind);

/// A positioned annotation on one diagram element
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub flow_node_id: FlowNodeId,
    pub position: OverlayPosition,
    pub payload: OverlayPayload,
}

impl Overlay {
    /// Create an overlay at the fixed position for its kind
    pub fn new(flow_node_id: impl Into<FlowNodeId>, payload: OverlayPayload) -> Self {
        let position = BadgePositionResolver::position(payload.kind());
        Self {
            flow_node_id: flow_node_id.into(),
            position,
            payload,
        }
    }

    pub fn kind(&self) -> OverlayKind {
        self.payload.kind()
    }

    pub fn key(&self) -> OverlayKey {
        (self.flow_node_id.clone(), self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_payload() {
        let overlay = Overlay::new(
            "a",
            OverlayPayload::State {
                state: ExecutionState::Incident,
                count: 2,
                faded: false,
            },
        );
        assert_eq!(overlay.kind(), OverlayKind::State(ExecutionState::Incident));
        assert_eq!(overlay.key(), (FlowNodeId::from("a"), overlay.kind()));
    }

    #[test]
    fn test_anchor_from_right_and_bottom() {
        let bounds = BoundingBox::new(100.0, 50.0, 100.0, 80.0);
        let position = OverlayPosition::new().bottom(9.0).right(0.0);
        assert_eq!(position.anchor(&bounds), Point::new(200.0, 121.0));
    }

    #[test]
    fn test_anchor_negative_offsets_sit_outside() {
        let bounds = BoundingBox::new(0.0, 0.0, 100.0, 80.0);
        let position = OverlayPosition::new().top(-14.0).right(-7.0);
        assert_eq!(position.anchor(&bounds), Point::new(107.0, -14.0));
    }

    #[test]
    fn test_modification_badge_label() {
        let payload = OverlayPayload::ModificationBadge(BadgeSummary {
            new_token_count: 2,
            cancelled_token_count: 1,
        });
        assert_eq!(payload.label(), "+2 -1");
    }
}
