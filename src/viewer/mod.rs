//! The diagram viewer capability consumed by the overlay engine
//!
//! The engine never renders the diagram itself. It only needs element lookup,
//! marker and overlay primitives, and one viewport slot for the heatmap.
//! `SvgViewer` is an in-memory implementation that renders to SVG.

pub mod bpmn;
pub mod config;
pub mod svg;

pub use bpmn::{load_elements, BpmnError};
pub use config::SvgConfig;
pub use svg::SvgViewer;

use crate::heatmap::{HeatmapLayer, LayerId};
use crate::model::{BoundingBox, FlowNodeId};
use crate::overlay::{OverlayPayload, OverlayPosition};

/// Diagram element kinds the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Task,
    SubProcess,
    CallActivity,
    StartEvent,
    EndEvent,
    IntermediateCatchEvent,
    IntermediateThrowEvent,
    BoundaryEvent,
    EventBasedGateway,
    Gateway,
    Other,
}

impl ElementKind {
    /// Classify a BPMN type name such as `bpmn:UserTask`
    ///
    /// Subtypes collapse onto their family: every task flavour is a `Task`,
    /// transactions and ad-hoc sub-processes are `SubProcess`.
    pub fn from_bpmn_type(bpmn_type: &str) -> Self {
        let local = bpmn_type.rsplit(':').next().unwrap_or(bpmn_type);
        match local {
            "Task" | "UserTask" | "ServiceTask" | "ScriptTask" | "SendTask" | "ReceiveTask"
            | "ManualTask" | "BusinessRuleTask" => Self::Task,
            "SubProcess" | "Transaction" | "AdHocSubProcess" => Self::SubProcess,
            "CallActivity" => Self::CallActivity,
            "StartEvent" => Self::StartEvent,
            "EndEvent" => Self::EndEvent,
            "IntermediateCatchEvent" => Self::IntermediateCatchEvent,
            "IntermediateThrowEvent" => Self::IntermediateThrowEvent,
            "BoundaryEvent" => Self::BoundaryEvent,
            "EventBasedGateway" => Self::EventBasedGateway,
            "ExclusiveGateway" | "ParallelGateway" | "InclusiveGateway" | "ComplexGateway" => {
                Self::Gateway
            }
            _ => Self::Other,
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(
            self,
            Self::StartEvent
                | Self::EndEvent
                | Self::IntermediateCatchEvent
                | Self::IntermediateThrowEvent
                | Self::BoundaryEvent
        )
    }

    pub fn is_gateway(&self) -> bool {
        matches!(self, Self::EventBasedGateway | Self::Gateway)
    }
}

/// A diagram element as reported by the viewer
#[derive(Debug, Clone, PartialEq)]
pub struct ElementInfo {
    pub id: FlowNodeId,
    pub kind: ElementKind,
    /// The BPMN type name the kind was derived from
    pub bpmn_type: String,
    pub name: Option<String>,
    pub bounds: BoundingBox,
}

impl ElementInfo {
    pub fn new(id: impl Into<FlowNodeId>, bpmn_type: impl Into<String>, bounds: BoundingBox) -> Self {
        let bpmn_type = bpmn_type.into();
        Self {
            id: id.into(),
            kind: ElementKind::from_bpmn_type(&bpmn_type),
            bpmn_type,
            name: None,
            bounds,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// CSS markers the engine toggles on elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Marker {
    /// Rounded outline emphasis on elements lacking a target value
    Highlight,
    /// Element opens the target value editor when clicked
    Clickable,
}

impl Marker {
    pub const ALL: [Marker; 2] = [Marker::Highlight, Marker::Clickable];

    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Highlight => "highlight",
            Self::Clickable => "clickable",
        }
    }
}

/// Handle returned by the viewer for an attached overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayHandle(pub u64);

/// Pointer events the host forwards from the viewer
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// `element.click`
    Click(FlowNodeId),
    /// Click on an attached overlay
    OverlayClick(OverlayHandle),
    /// `element.hover`
    HoverEnter(FlowNodeId),
    /// `element.out`
    HoverLeave(FlowNodeId),
}

/// Capability interface of the external diagram viewer
pub trait DiagramViewer {
    /// Look up an element by id
    fn element(&self, id: &str) -> Option<ElementInfo>;

    /// Every element currently in the diagram
    fn elements(&self) -> Vec<ElementInfo>;

    fn add_marker(&mut self, id: &str, marker: Marker);

    fn remove_marker(&mut self, id: &str, marker: Marker);

    /// Attach an overlay to an element
    fn add_overlay(
        &mut self,
        id: &str,
        position: OverlayPosition,
        content: &OverlayPayload,
    ) -> OverlayHandle;

    /// Detach an overlay; `false` if the viewer no longer knows the handle
    fn remove_overlay(&mut self, handle: OverlayHandle) -> bool;

    /// Append a child to the viewport container
    fn append_viewport_child(&mut self, layer: HeatmapLayer);

    /// Remove a viewport child; `false` if it was not attached
    fn remove_viewport_child(&mut self, id: LayerId) -> bool;

    fn has_element(&self, id: &str) -> bool {
        self.element(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_family() {
        assert_eq!(ElementKind::from_bpmn_type("bpmn:UserTask"), ElementKind::Task);
        assert_eq!(ElementKind::from_bpmn_type("bpmn:ServiceTask"), ElementKind::Task);
        assert_eq!(ElementKind::from_bpmn_type("Task"), ElementKind::Task);
    }

    #[test]
    fn test_sub_process_family() {
        assert_eq!(
            ElementKind::from_bpmn_type("bpmn:Transaction"),
            ElementKind::SubProcess
        );
        assert_eq!(
            ElementKind::from_bpmn_type("bpmn:AdHocSubProcess"),
            ElementKind::SubProcess
        );
    }

    #[test]
    fn test_unknown_type_is_other() {
        assert_eq!(
            ElementKind::from_bpmn_type("bpmn:SequenceFlow"),
            ElementKind::Other
        );
        assert_eq!(ElementKind::from_bpmn_type("bpmn:Lane"), ElementKind::Other);
    }

    #[test]
    fn test_gateway_classification() {
        assert!(ElementKind::from_bpmn_type("bpmn:EventBasedGateway").is_gateway());
        assert!(ElementKind::from_bpmn_type("bpmn:ExclusiveGateway").is_gateway());
        assert!(!ElementKind::from_bpmn_type("bpmn:EndEvent").is_gateway());
    }
}
