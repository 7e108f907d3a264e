//! Keeps the viewer's markers, overlays and heatmap in step with the
//! application state
//!
//! `DiagramSyncController` is the single owner of every piece of overlay
//! state. Each operation updates its inputs and then recomputes the complete
//! desired overlay set, so the attached overlays never lag behind the
//! statistics, target values, planned modifications or hover.

pub mod config;

pub use config::SyncConfig;

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};

use crate::error::{CommitError, SyncError};
use crate::heatmap::{statistics_heat, target_value_heat, HeatmapGenerator, HeatmapMode};
use crate::highlight::{HighlightEngine, HighlightPlan};
use crate::hover::HoverTracker;
use crate::model::{total_counts, FlowNodeId, FlowNodeStatistic, Snapshot, TargetValues};
use crate::modification::{Modification, ModificationSimulator, SimulationStatus};
use crate::overlay::{Overlay, OverlayKind, OverlayPayload, OverlayRegistry, ReconcileStats};
use crate::stylesheet::Stylesheet;
use crate::viewer::{DiagramViewer, ElementInfo, Marker, ViewerEvent};

/// The modal dialog that edits one element's target value
pub trait TargetValueEditor {
    fn open(&mut self, element: &ElementInfo);
}

/// Backend endpoint that applies a modification list to a process instance
pub trait CommitChannel {
    fn commit(
        &mut self,
        process_instance_id: &str,
        modifications: &[Modification],
    ) -> Result<(), CommitError>;
}

/// Result of handing a snapshot to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Applied(ReconcileStats),
    /// The snapshot was older than the last applied one and was ignored
    Stale { revision: u64, current: u64 },
}

pub struct DiagramSyncController<V> {
    viewer: V,
    config: SyncConfig,
    stylesheet: Stylesheet,
    registry: OverlayRegistry,
    hover: HoverTracker,
    heatmap: HeatmapGenerator,
    simulator: ModificationSimulator,
    statistics: Vec<FlowNodeStatistic>,
    target_values: TargetValues,
    revision: Option<u64>,
    markers: BTreeSet<(FlowNodeId, Marker)>,
    process_instance: Option<String>,
}

impl<V: DiagramViewer> DiagramSyncController<V> {
    pub fn new(viewer: V, config: SyncConfig) -> Self {
        Self {
            viewer,
            config,
            stylesheet: Stylesheet::default(),
            registry: OverlayRegistry::new(),
            hover: HoverTracker::new(),
            heatmap: HeatmapGenerator::new(),
            simulator: ModificationSimulator::new(),
            statistics: Vec::new(),
            target_values: TargetValues::new(),
            revision: None,
            markers: BTreeSet::new(),
            process_instance: None,
        }
    }

    /// Use `stylesheet` for heatmap colours
    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    /// Direct viewer access; call `diagram_rendered` after changing elements
    pub fn viewer_mut(&mut self) -> &mut V {
        &mut self.viewer
    }

    pub fn into_viewer(self) -> V {
        self.viewer
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn registry(&self) -> &OverlayRegistry {
        &self.registry
    }

    pub fn simulator(&self) -> &ModificationSimulator {
        &self.simulator
    }

    pub fn hover(&self) -> &HoverTracker {
        &self.hover
    }

    pub fn heatmap(&self) -> &HeatmapGenerator {
        &self.heatmap
    }

    pub fn statistics(&self) -> &[FlowNodeStatistic] {
        &self.statistics
    }

    pub fn target_values(&self) -> &TargetValues {
        &self.target_values
    }

    pub fn process_instance(&self) -> Option<&str> {
        self.process_instance.as_deref()
    }

    /// Rebuild everything after the viewer (re)rendered the diagram
    ///
    /// A re-render may have discarded the viewer's overlay layer, so every
    /// overlay is detached and attached again rather than reconciled.
    pub fn diagram_rendered(&mut self) -> ReconcileStats {
        self.registry.clear(&mut self.viewer);
        for element in self.viewer.elements() {
            for marker in Marker::ALL {
                self.viewer.remove_marker(element.id.as_str(), marker);
            }
        }
        self.markers.clear();
        let stats = self.sync();
        self.refresh_heatmap();
        stats
    }

    /// Take over a new statistics and target value snapshot
    ///
    /// The snapshot is validated before anything is touched: an unknown
    /// execution state leaves markers, overlays and heatmap as they were.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> Result<SyncOutcome, SyncError> {
        if let Some(current) = self.revision {
            if snapshot.revision < current {
                debug!(
                    "ignoring snapshot revision {} older than {}",
                    snapshot.revision, current
                );
                return Ok(SyncOutcome::Stale {
                    revision: snapshot.revision,
                    current,
                });
            }
        }
        let statistics = snapshot.flow_nodes()?;

        self.revision = Some(snapshot.revision);
        self.statistics = statistics;
        self.target_values = snapshot.target_values;
        let stats = self.sync();
        self.refresh_heatmap();
        Ok(SyncOutcome::Applied(stats))
    }

    /// Replace the target values, e.g. after the editor saved one
    pub fn set_target_values(&mut self, target_values: TargetValues) -> ReconcileStats {
        self.target_values = target_values;
        let stats = self.sync();
        if self.config.heatmap == HeatmapMode::TargetValue {
            self.refresh_heatmap();
        }
        stats
    }

    pub fn enable_modification_mode(&mut self) -> ReconcileStats {
        self.simulator.enable();
        self.sync()
    }

    /// Leave modification mode, dropping every planned modification
    pub fn disable_modification_mode(&mut self) -> ReconcileStats {
        self.simulator.disable();
        self.sync()
    }

    pub fn start_moving_token(&mut self, from: impl Into<FlowNodeId>) -> Result<(), SyncError> {
        self.simulator.start_moving_token(from)?;
        self.sync();
        Ok(())
    }

    pub fn start_adding_token(&mut self) -> Result<(), SyncError> {
        self.simulator.start_adding_token()?;
        self.sync();
        Ok(())
    }

    pub fn select_flow_node(
        &mut self,
        target: impl Into<FlowNodeId>,
    ) -> Result<Option<Modification>, SyncError> {
        let appended = self.simulator.select_flow_node(target)?.cloned();
        self.sync();
        Ok(appended)
    }

    pub fn cancel_token(&mut self, id: impl Into<FlowNodeId>, count: u32) -> Result<(), SyncError> {
        self.simulator.cancel_token(id, count)?;
        self.sync();
        Ok(())
    }

    pub fn discard(&mut self) -> Result<(), SyncError> {
        self.simulator.discard()?;
        self.sync();
        Ok(())
    }

    pub fn undo_last_modification(&mut self) -> Result<Option<Modification>, SyncError> {
        let removed = self.simulator.undo_last()?;
        self.sync();
        Ok(removed)
    }

    /// Route a pointer event forwarded by the host
    pub fn handle_event<E>(&mut self, event: ViewerEvent, editor: &mut E) -> Result<(), SyncError>
    where
        E: TargetValueEditor + ?Sized,
    {
        match event {
            ViewerEvent::Click(id) => {
                if self.simulator.status() != &SimulationStatus::Idle {
                    self.select_flow_node(id)?;
                } else if self.markers.contains(&(id.clone(), Marker::Clickable)) {
                    self.open_editor(&id, editor);
                }
            }
            ViewerEvent::OverlayClick(handle) => {
                let badge_owner = self
                    .registry
                    .key_for_handle(handle)
                    .filter(|(_, kind)| *kind == OverlayKind::TargetValueBadge)
                    .map(|(id, _)| id.clone());
                match badge_owner {
                    Some(id) => self.open_editor(&id, editor),
                    None => debug!("click on overlay {:?} ignored", handle),
                }
            }
            ViewerEvent::HoverEnter(id) => {
                if self.config.target_values {
                    let totals = total_counts(&self.statistics);
                    self.hover.hover_enter(
                        &id,
                        &self.target_values,
                        &totals,
                        &mut self.registry,
                        &mut self.viewer,
                    );
                }
            }
            ViewerEvent::HoverLeave(id) => self.hover.hover_leave(&id),
        }
        Ok(())
    }

    /// Switch to another process instance, or to none
    ///
    /// Everything tied to the previous instance is dropped: statistics,
    /// overlays, markers, heatmap, hover and planned modifications.
    pub fn set_process_instance(&mut self, id: Option<String>) -> ReconcileStats {
        if self.process_instance == id {
            return ReconcileStats::default();
        }
        info!(
            "switching process instance from {:?} to {:?}",
            self.process_instance, id
        );
        self.process_instance = id;

        self.registry.clear(&mut self.viewer);
        for (id, marker) in std::mem::take(&mut self.markers) {
            self.viewer.remove_marker(id.as_str(), marker);
        }
        self.heatmap.remove(&mut self.viewer);
        self.hover.reset();
        self.simulator.reset();
        self.statistics.clear();
        self.revision = None;

        self.sync()
    }

    /// Hand the planned modifications to the backend
    ///
    /// On success the plan is cleared and the number of committed
    /// modifications returned. On failure the plan is kept for another try.
    pub fn commit<C>(&mut self, channel: &mut C) -> Result<usize, SyncError>
    where
        C: CommitChannel + ?Sized,
    {
        let instance = self
            .process_instance
            .clone()
            .ok_or(CommitError::NoProcessInstance)?;
        let modifications = self.simulator.modifications();
        if modifications.is_empty() {
            debug!("nothing to commit for {}", instance);
            return Ok(0);
        }
        let count = modifications.len();
        if let Err(err) = channel.commit(&instance, modifications) {
            warn!("commit of {} modifications to {} failed: {}", count, instance, err);
            return Err(err.into());
        }
        info!("committed {} modifications to {}", count, instance);
        self.simulator.reset();
        self.sync();
        Ok(count)
    }

    fn open_editor<E>(&self, id: &FlowNodeId, editor: &mut E)
    where
        E: TargetValueEditor + ?Sized,
    {
        match self.viewer.element(id.as_str()) {
            Some(element) => editor.open(&element),
            None => debug!("editor not opened for unknown element '{}'", id),
        }
    }

    /// Recompute markers and the full desired overlay set, then reconcile
    fn sync(&mut self) -> ReconcileStats {
        let plan = if self.config.target_values {
            HighlightEngine::evaluate(&self.viewer.elements(), &self.target_values)
        } else {
            HighlightPlan::default()
        };
        self.apply_markers(&plan);
        let desired = self.desired_overlays(&plan);
        let stats = self.registry.reconcile(&mut self.viewer, desired);
        debug!("reconciled overlays: {:?}", stats);
        stats
    }

    fn apply_markers(&mut self, plan: &HighlightPlan) {
        let desired: BTreeSet<(FlowNodeId, Marker)> = plan
            .to_mark
            .iter()
            .flat_map(|id| Marker::ALL.into_iter().map(move |m| (id.clone(), m)))
            .collect();
        for (id, marker) in self.markers.difference(&desired) {
            self.viewer.remove_marker(id.as_str(), *marker);
        }
        for (id, marker) in desired.difference(&self.markers) {
            self.viewer.add_marker(id.as_str(), *marker);
        }
        self.markers = desired;
    }

    fn desired_overlays(&self, plan: &HighlightPlan) -> Vec<Overlay> {
        let mut desired: Vec<Overlay> = self
            .statistics
            .iter()
            .map(|node| {
                let faded = self.simulator.is_active()
                    && self
                        .simulator
                        .has_pending_cancel_or_move(node.flow_node_id.as_str());
                Overlay::new(
                    node.flow_node_id.clone(),
                    OverlayPayload::State {
                        state: node.state,
                        count: node.count,
                        faded,
                    },
                )
            })
            .collect();

        if self.simulator.is_active() && self.config.modification_badges {
            desired.extend(
                self.simulator
                    .badges_by_flow_node()
                    .into_iter()
                    .map(|(id, summary)| Overlay::new(id, OverlayPayload::ModificationBadge(summary))),
            );
        }

        desired.extend(
            plan.to_badge
                .iter()
                .map(|(id, target)| Overlay::new(id.clone(), OverlayPayload::TargetValueBadge(*target))),
        );

        if self.config.target_values {
            let totals = total_counts(&self.statistics);
            desired.extend(self.hover.desired_tooltip(&self.target_values, &totals));
        }
        desired
    }

    fn refresh_heatmap(&mut self) {
        let totals: BTreeMap<FlowNodeId, u64> = total_counts(&self.statistics);
        let points = match self.config.heatmap {
            HeatmapMode::Off => {
                self.heatmap.remove(&mut self.viewer);
                return;
            }
            HeatmapMode::Statistics => statistics_heat(&self.viewer.elements(), &totals),
            HeatmapMode::TargetValue => {
                target_value_heat(&self.viewer.elements(), &self.target_values, &totals)
            }
        };
        self.heatmap
            .replace(&mut self.viewer, &points, &self.stylesheet);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, ExecutionState, StatisticEntry, TargetValue};
    use crate::viewer::SvgViewer;

    #[derive(Default)]
    struct RecordingEditor {
        opened: Vec<FlowNodeId>,
    }

    impl TargetValueEditor for RecordingEditor {
        fn open(&mut self, element: &ElementInfo) {
            self.opened.push(element.id.clone());
        }
    }

    struct FailingChannel;

    impl CommitChannel for FailingChannel {
        fn commit(&mut self, _: &str, _: &[Modification]) -> Result<(), CommitError> {
            Err(CommitError::Rejected("instance is finished".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingChannel {
        committed: Vec<(String, Vec<Modification>)>,
    }

    impl CommitChannel for RecordingChannel {
        fn commit(&mut self, id: &str, modifications: &[Modification]) -> Result<(), CommitError> {
            self.committed.push((id.to_string(), modifications.to_vec()));
            Ok(())
        }
    }

    fn elements() -> Vec<ElementInfo> {
        vec![
            ElementInfo::new("start", "bpmn:StartEvent", BoundingBox::new(0.0, 22.0, 36.0, 36.0)),
            ElementInfo::new("a", "bpmn:UserTask", BoundingBox::new(100.0, 0.0, 100.0, 80.0)),
            ElementInfo::new("b", "bpmn:ServiceTask", BoundingBox::new(250.0, 0.0, 100.0, 80.0)),
        ]
    }

    fn controller(config: SyncConfig) -> DiagramSyncController<SvgViewer> {
        let viewer = SvgViewer::new(elements());
        let mut controller = DiagramSyncController::new(viewer, config);
        controller.set_process_instance(Some("pi-1".to_string()));
        controller.diagram_rendered();
        controller
    }

    fn snapshot(revision: u64) -> Snapshot {
        Snapshot::new(revision)
            .with_statistic(StatisticEntry::new("a", "active", 2))
            .with_statistic(StatisticEntry::new("a", "incidents", 1))
            .with_target_value("b", TargetValue::below(10.0))
    }

    fn has_overlay(c: &DiagramSyncController<SvgViewer>, id: &str, kind: OverlayKind) -> bool {
        c.registry().get(&(FlowNodeId::from(id), kind)).is_some()
    }

    #[test]
    fn test_render_marks_unconfigured_elements() {
        let c = controller(SyncConfig::default());
        assert!(c.viewer().has_marker("a", Marker::Highlight));
        assert!(c.viewer().has_marker("b", Marker::Clickable));
        assert!(!c.viewer().has_marker("start", Marker::Highlight));
    }

    #[test]
    fn test_snapshot_attaches_states_and_badges() {
        let mut c = controller(SyncConfig::default());
        let outcome = c.apply_snapshot(snapshot(1)).unwrap();
        assert!(matches!(outcome, SyncOutcome::Applied(_)));
        assert!(has_overlay(&c, "a", OverlayKind::State(ExecutionState::Active)));
        assert!(has_overlay(&c, "a", OverlayKind::State(ExecutionState::Incident)));
        assert!(has_overlay(&c, "b", OverlayKind::TargetValueBadge));
        assert!(!c.viewer().has_marker("b", Marker::Highlight));
        assert_eq!(c.viewer().overlay_count(), c.registry().len());
    }

    #[test]
    fn test_stale_snapshot_is_ignored() {
        let mut c = controller(SyncConfig::default());
        c.apply_snapshot(snapshot(5)).unwrap();
        let outcome = c.apply_snapshot(Snapshot::new(4)).unwrap();
        assert_eq!(
            outcome,
            SyncOutcome::Stale {
                revision: 4,
                current: 5
            }
        );
        assert!(has_overlay(&c, "a", OverlayKind::State(ExecutionState::Active)));
    }

    #[test]
    fn test_unknown_state_leaves_overlays_untouched() {
        let mut c = controller(SyncConfig::default());
        c.apply_snapshot(snapshot(1)).unwrap();
        let before = c.registry().len();
        let bad = Snapshot::new(2).with_statistic(StatisticEntry::new("b", "suspended", 1));
        let err = c.apply_snapshot(bad).unwrap_err();
        assert!(matches!(err, SyncError::Overlay(_)));
        assert_eq!(c.registry().len(), before);
        assert_eq!(c.statistics().len(), 2);
    }

    #[test]
    fn test_modification_badges_follow_mode() {
        let mut c = controller(SyncConfig::default());
        c.apply_snapshot(snapshot(1)).unwrap();
        assert!(c.start_moving_token("a").is_err());

        c.enable_modification_mode();
        c.start_moving_token("a").unwrap();
        c.select_flow_node("b").unwrap();
        assert!(has_overlay(&c, "a", OverlayKind::ModificationBadge));
        assert!(has_overlay(&c, "b", OverlayKind::ModificationBadge));

        let active = c
            .registry()
            .get(&(FlowNodeId::from("a"), OverlayKind::State(ExecutionState::Active)))
            .unwrap();
        assert!(matches!(active.payload, OverlayPayload::State { faded: true, .. }));

        c.disable_modification_mode();
        assert!(!has_overlay(&c, "a", OverlayKind::ModificationBadge));
        assert!(c.simulator().modifications().is_empty());
    }

    #[test]
    fn test_click_selects_target_while_adding() {
        let mut c = controller(SyncConfig::default());
        let mut editor = RecordingEditor::default();
        c.enable_modification_mode();
        c.start_adding_token().unwrap();
        c.handle_event(ViewerEvent::Click("b".into()), &mut editor).unwrap();
        assert_eq!(c.simulator().modifications().len(), 1);
        assert!(editor.opened.is_empty());
    }

    #[test]
    fn test_click_opens_editor_for_unconfigured_element() {
        let mut c = controller(SyncConfig::default());
        let mut editor = RecordingEditor::default();
        c.handle_event(ViewerEvent::Click("a".into()), &mut editor).unwrap();
        c.handle_event(ViewerEvent::Click("start".into()), &mut editor).unwrap();
        assert_eq!(editor.opened, vec![FlowNodeId::from("a")]);
    }

    #[test]
    fn test_badge_click_opens_editor() {
        let mut c = controller(SyncConfig::default());
        c.apply_snapshot(snapshot(1)).unwrap();
        let mut editor = RecordingEditor::default();
        let badge = c
            .registry()
            .handle(&(FlowNodeId::from("b"), OverlayKind::TargetValueBadge))
            .unwrap();
        let state = c
            .registry()
            .handle(&(FlowNodeId::from("a"), OverlayKind::State(ExecutionState::Active)))
            .unwrap();
        c.handle_event(ViewerEvent::OverlayClick(state), &mut editor).unwrap();
        c.handle_event(ViewerEvent::OverlayClick(badge), &mut editor).unwrap();
        assert_eq!(editor.opened, vec![FlowNodeId::from("b")]);
    }

    #[test]
    fn test_hover_tooltip_survives_resync() {
        let mut c = controller(SyncConfig::default());
        c.apply_snapshot(snapshot(1)).unwrap();
        let mut editor = RecordingEditor::default();
        c.handle_event(ViewerEvent::HoverEnter("b".into()), &mut editor).unwrap();
        assert!(has_overlay(&c, "b", OverlayKind::TargetValueTooltip));
        c.apply_snapshot(snapshot(2)).unwrap();
        assert!(has_overlay(&c, "b", OverlayKind::TargetValueTooltip));
        c.handle_event(ViewerEvent::HoverLeave("b".into()), &mut editor).unwrap();
        assert!(has_overlay(&c, "b", OverlayKind::TargetValueTooltip));
    }

    #[test]
    fn test_target_values_disabled() {
        let mut c = controller(SyncConfig::new().with_target_values(false));
        c.apply_snapshot(snapshot(1)).unwrap();
        assert!(!c.viewer().has_marker("a", Marker::Highlight));
        assert!(!has_overlay(&c, "b", OverlayKind::TargetValueBadge));
    }

    #[test]
    fn test_heatmap_replaced_on_snapshot() {
        let mut c = controller(SyncConfig::new().with_heatmap(HeatmapMode::Statistics));
        c.apply_snapshot(snapshot(1)).unwrap();
        c.apply_snapshot(snapshot(2)).unwrap();
        assert_eq!(c.viewer().viewport_children().len(), 1);
        c.diagram_rendered();
        assert_eq!(c.viewer().viewport_children().len(), 1);
    }

    #[test]
    fn test_rerender_reattaches_every_overlay() {
        let mut c = controller(SyncConfig::new().with_heatmap(HeatmapMode::Statistics));
        c.apply_snapshot(snapshot(1)).unwrap();
        let before = c.registry().len();
        assert!(before > 0);

        // the host re-imported the diagram, dropping its overlay layer
        *c.viewer_mut() = SvgViewer::new(elements());
        let stats = c.diagram_rendered();

        assert_eq!(stats.attached, before);
        assert_eq!(stats.unchanged, 0);
        assert_eq!(c.registry().len(), before);
        assert_eq!(c.viewer().overlay_count(), c.registry().len());
        for overlay in c.registry().overlays() {
            let handle = c.registry().handle(&overlay.key()).unwrap();
            assert!(c.viewer().overlay(handle).is_some());
        }
        assert!(c.viewer().has_marker("a", Marker::Highlight));
        assert_eq!(c.viewer().viewport_children().len(), 1);
    }

    #[test]
    fn test_rerender_on_same_viewer_keeps_one_copy() {
        let mut c = controller(SyncConfig::default());
        c.apply_snapshot(snapshot(1)).unwrap();
        let before = c.viewer().overlay_count();
        c.diagram_rendered();
        c.diagram_rendered();
        assert_eq!(c.viewer().overlay_count(), before);
        assert_eq!(c.registry().len(), before);
    }

    #[test]
    fn test_target_value_change_refreshes_target_heatmap() {
        let mut c = controller(SyncConfig::new().with_heatmap(HeatmapMode::TargetValue));
        c.apply_snapshot(Snapshot::new(1).with_statistic(StatisticEntry::new("a", "active", 2)))
            .unwrap();
        assert!(c.viewer().viewport_children().is_empty());

        let mut targets = TargetValues::new();
        targets.insert("a".into(), TargetValue::below(4.0));
        c.set_target_values(targets);
        assert_eq!(c.viewer().viewport_children().len(), 1);
        let first = c.heatmap().current();

        c.set_target_values(TargetValues::new());
        assert!(c.viewer().viewport_children().is_empty());
        assert_ne!(c.heatmap().current(), first);
    }

    #[test]
    fn test_target_value_change_leaves_statistics_heatmap() {
        let mut c = controller(SyncConfig::new().with_heatmap(HeatmapMode::Statistics));
        c.apply_snapshot(snapshot(1)).unwrap();
        let layer = c.heatmap().current();
        assert!(layer.is_some());
        c.set_target_values(TargetValues::new());
        assert_eq!(c.heatmap().current(), layer);
    }

    #[test]
    fn test_process_instance_change_clears_everything() {
        let mut c = controller(SyncConfig::new().with_heatmap(HeatmapMode::Statistics));
        c.apply_snapshot(snapshot(3)).unwrap();
        c.enable_modification_mode();
        c.cancel_token("a", 1).unwrap();

        c.set_process_instance(Some("pi-2".to_string()));
        assert!(c.simulator().modifications().is_empty());
        assert!(c.statistics().is_empty());
        assert!(c.viewer().viewport_children().is_empty());
        assert!(!has_overlay(&c, "a", OverlayKind::State(ExecutionState::Active)));
        // target values belong to the diagram, not the instance
        assert!(has_overlay(&c, "b", OverlayKind::TargetValueBadge));
        assert!(matches!(
            c.apply_snapshot(snapshot(1)).unwrap(),
            SyncOutcome::Applied(_)
        ));
    }

    #[test]
    fn test_commit_success_resets_plan() {
        let mut c = controller(SyncConfig::default());
        c.enable_modification_mode();
        c.cancel_token("a", 2).unwrap();
        let mut channel = RecordingChannel::default();
        assert_eq!(c.commit(&mut channel).unwrap(), 1);
        assert_eq!(channel.committed[0].0, "pi-1");
        assert!(c.simulator().modifications().is_empty());
        assert!(!has_overlay(&c, "a", OverlayKind::ModificationBadge));
    }

    #[test]
    fn test_commit_failure_keeps_plan() {
        let mut c = controller(SyncConfig::default());
        c.enable_modification_mode();
        c.cancel_token("a", 2).unwrap();
        let err = c.commit(&mut FailingChannel).unwrap_err();
        assert!(matches!(err, SyncError::Commit(CommitError::Rejected(_))));
        assert_eq!(c.simulator().modifications().len(), 1);
    }

    #[test]
    fn test_commit_without_instance() {
        let viewer = SvgViewer::new(Vec::new());
        let mut c = DiagramSyncController::new(viewer, SyncConfig::default());
        let err = c.commit(&mut RecordingChannel::default()).unwrap_err();
        assert_eq!(err, SyncError::Commit(CommitError::NoProcessInstance));
    }
}
