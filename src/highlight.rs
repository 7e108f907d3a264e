//! Target value highlighting
//!
//! Decides which eligible elements still need a target value (highlighted and
//! clickable) and which already have one (shown as a badge instead).

use crate::model::{FlowNodeId, TargetValue, TargetValues};
use crate::viewer::{ElementInfo, ElementKind};

/// Output of one highlight evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightPlan {
    /// Eligible elements without a target value
    pub to_mark: Vec<FlowNodeId>,
    /// Eligible elements with their configured target value
    pub to_badge: Vec<(FlowNodeId, TargetValue)>,
}

impl HighlightPlan {
    pub fn is_marked(&self, id: &str) -> bool {
        self.to_mark.iter().any(|m| m.as_str() == id)
    }

    pub fn is_badged(&self, id: &str) -> bool {
        self.to_badge.iter().any(|(b, _)| b.as_str() == id)
    }
}

pub struct HighlightEngine;

impl HighlightEngine {
    /// Element kinds a target value can be configured for
    pub fn is_eligible(kind: ElementKind) -> bool {
        matches!(
            kind,
            ElementKind::Task
                | ElementKind::IntermediateCatchEvent
                | ElementKind::SubProcess
                | ElementKind::CallActivity
                | ElementKind::EventBasedGateway
        )
    }

    pub fn evaluate<'a, I>(candidates: I, targets: &TargetValues) -> HighlightPlan
    where
        I: IntoIterator<Item = &'a ElementInfo>,
    {
        let mut plan = HighlightPlan::default();
        for element in candidates {
            if !Self::is_eligible(element.kind) {
                continue;
            }
            match targets.get(&element.id) {
                Some(target) => plan.to_badge.push((element.id.clone(), *target)),
                None => plan.to_mark.push(element.id.clone()),
            }
        }
        plan
    }
}
