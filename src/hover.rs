//! Single-active hover tracking for target value tooltips
//!
//! The last hovered element wins. Leaving an element does not remove its
//! tooltip; only entering a different element does.

use std::collections::BTreeMap;

use crate::model::{FlowNodeId, TargetValues};
use crate::overlay::{Overlay, OverlayKind, OverlayPayload, OverlayRegistry};
use crate::viewer::DiagramViewer;

#[derive(Debug, Default)]
pub struct HoverTracker {
    currently_hovered: Option<FlowNodeId>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&FlowNodeId> {
        self.currently_hovered.as_ref()
    }

    /// Handle a hover-enter on `id`
    ///
    /// Returns `false` when `id` is already the hovered element, in which case
    /// nothing is touched.
    pub fn hover_enter<V>(
        &mut self,
        id: &FlowNodeId,
        targets: &TargetValues,
        totals: &BTreeMap<FlowNodeId, u64>,
        registry: &mut OverlayRegistry,
        viewer: &mut V,
    ) -> bool
    where
        V: DiagramViewer + ?Sized,
    {
        if self.currently_hovered.as_ref() == Some(id) {
            return false;
        }
        if let Some(previous) = self.currently_hovered.take() {
            registry.detach(viewer, &(previous, OverlayKind::TargetValueTooltip));
        }
        self.currently_hovered = Some(id.clone());
        if let Some(tooltip) = self.desired_tooltip(targets, totals) {
            registry.attach(viewer, tooltip);
        }
        true
    }

    /// Hover-leave keeps the tooltip until the next enter elsewhere
    pub fn hover_leave(&mut self, _id: &FlowNodeId) {}

    /// The tooltip implied by the current hover, if the element has a target value
    pub fn desired_tooltip(
        &self,
        targets: &TargetValues,
        totals: &BTreeMap<FlowNodeId, u64>,
    ) -> Option<Overlay> {
        let id = self.currently_hovered.as_ref()?;
        let target = targets.get(id)?;
        Some(Overlay::new(
            id.clone(),
            OverlayPayload::TargetValueTooltip {
                target: *target,
                measured: totals.get(id).copied(),
            },
        ))
    }

    pub fn reset(&mut self) {
        self.currently_hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, TargetValue};
    use crate::viewer::{ElementInfo, SvgViewer};

    struct Fixture {
        viewer: SvgViewer,
        registry: OverlayRegistry,
        targets: TargetValues,
        totals: BTreeMap<FlowNodeId, u64>,
        hover: HoverTracker,
    }

    impl Fixture {
        fn new() -> Self {
            let viewer = SvgViewer::new(vec![
                ElementInfo::new("a", "bpmn:Task", BoundingBox::new(0.0, 0.0, 100.0, 80.0)),
                ElementInfo::new("b", "bpmn:Task", BoundingBox::new(150.0, 0.0, 100.0, 80.0)),
                ElementInfo::new("c", "bpmn:Task", BoundingBox::new(300.0, 0.0, 100.0, 80.0)),
            ]);
            let mut targets = TargetValues::new();
            targets.insert("a".into(), TargetValue::below(5.0));
            targets.insert("b".into(), TargetValue::above(2.0));
            let mut totals = BTreeMap::new();
            totals.insert(FlowNodeId::from("a"), 7);
            Self {
                viewer,
                registry: OverlayRegistry::new(),
                targets,
                totals,
                hover: HoverTracker::new(),
            }
        }

        fn enter(&mut self, id: &str) -> bool {
            self.hover.hover_enter(
                &FlowNodeId::from(id),
                &self.targets,
                &self.totals,
                &mut self.registry,
                &mut self.viewer,
            )
        }

        fn tooltip_handles(&self) -> Vec<crate::viewer::OverlayHandle> {
            self.registry
                .overlays()
                .filter(|o| o.kind() == OverlayKind::TargetValueTooltip)
                .filter_map(|o| self.registry.handle(&o.key()))
                .collect()
        }
    }

    #[test]
    fn test_hover_shows_tooltip() {
        let mut fx = Fixture::new();
        assert!(fx.enter("a"));
        assert_eq!(fx.tooltip_handles().len(), 1);
        assert_eq!(fx.viewer.overlay_count(), 1);
    }

    #[test]
    fn test_rehover_is_noop() {
        let mut fx = Fixture::new();
        fx.enter("a");
        let before = fx.tooltip_handles();
        assert!(!fx.enter("a"));
        assert_eq!(fx.tooltip_handles(), before);
        assert_eq!(fx.viewer.overlay_count(), 1);
    }

    #[test]
    fn test_last_hovered_wins() {
        let mut fx = Fixture::new();
        fx.enter("a");
        fx.enter("b");
        let tooltips: Vec<_> = fx
            .registry
            .overlays()
            .filter(|o| o.kind() == OverlayKind::TargetValueTooltip)
            .map(|o| o.flow_node_id.clone())
            .collect();
        assert_eq!(tooltips, vec![FlowNodeId::from("b")]);
    }

    #[test]
    fn test_hover_without_target_clears_tooltip() {
        let mut fx = Fixture::new();
        fx.enter("a");
        fx.enter("c");
        assert!(fx.tooltip_handles().is_empty());
        assert_eq!(fx.hover.current(), Some(&FlowNodeId::from("c")));
    }

    #[test]
    fn test_leave_keeps_tooltip() {
        let mut fx = Fixture::new();
        fx.enter("a");
        fx.hover.hover_leave(&FlowNodeId::from("a"));
        assert_eq!(fx.tooltip_handles().len(), 1);
    }

    #[test]
    fn test_tooltip_carries_measured_value() {
        let mut fx = Fixture::new();
        fx.enter("a");
        let tooltip = fx.hover.desired_tooltip(&fx.targets, &fx.totals).unwrap();
        assert_eq!(
            tooltip.payload,
            OverlayPayload::TargetValueTooltip {
                target: TargetValue::below(5.0),
                measured: Some(7),
            }
        );
    }
}
