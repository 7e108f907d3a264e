//! Fixed anchor positions for overlays on a node's shape

use crate::model::ExecutionState;

use super::{OverlayKind, OverlayPosition};

const fn at(
    top: Option<f64>,
    right: Option<f64>,
    bottom: Option<f64>,
    left: Option<f64>,
) -> OverlayPosition {
    OverlayPosition {
        top,
        right,
        bottom,
        left,
    }
}

pub const ACTIVE_BADGE: OverlayPosition = at(None, None, Some(9.0), Some(0.0));
pub const INCIDENTS_BADGE: OverlayPosition = at(None, Some(0.0), Some(9.0), None);
pub const CANCELED_BADGE: OverlayPosition = at(Some(-16.0), None, None, Some(0.0));
pub const COMPLETED_BADGE: OverlayPosition = at(None, None, Some(1.0), Some(17.0));
pub const MODIFICATIONS_BADGE: OverlayPosition = at(Some(-14.0), Some(-7.0), None, None);
pub const TARGET_VALUE_BADGE: OverlayPosition = at(Some(-10.0), Some(10.0), None, None);
pub const TARGET_VALUE_TOOLTIP: OverlayPosition = at(None, None, Some(-10.0), Some(0.0));

/// Pure lookup from overlay kind to anchor position
pub struct BadgePositionResolver;

impl BadgePositionResolver {
    /// Position for a typed overlay kind
    pub fn position(kind: OverlayKind) -> OverlayPosition {
        match kind {
            OverlayKind::State(state) => Self::state_position(state),
            OverlayKind::ModificationBadge => MODIFICATIONS_BADGE,
            OverlayKind::TargetValueBadge => TARGET_VALUE_BADGE,
            OverlayKind::TargetValueTooltip => TARGET_VALUE_TOOLTIP,
        }
    }

    pub fn state_position(state: ExecutionState) -> OverlayPosition {
        match state {
            ExecutionState::Active => ACTIVE_BADGE,
            ExecutionState::Incident => INCIDENTS_BADGE,
            ExecutionState::Canceled => CANCELED_BADGE,
            ExecutionState::Completed => COMPLETED_BADGE,
        }
    }
}
