//! Core data types shared by the overlay engine
//!
//! Statistics and target values arrive as immutable snapshots from the data
//! layer. Geometry types describe element bounds as reported by the viewer.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::OverlayError;

/// Identifier of a flow node, equal to its diagram element id
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowNodeId(pub String);

impl FlowNodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlowNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FlowNodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FlowNodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FlowNodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A 2D point in diagram coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The rectangle a diagram element's shape occupies
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a zero-sized bounding box at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the bounding box
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Compute the union of two bounding boxes (smallest box containing both)
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// Execution state of the tokens counted at a flow node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionState {
    Active,
    Incident,
    Canceled,
    Completed,
}

impl ExecutionState {
    pub const ALL: [ExecutionState; 4] = [
        ExecutionState::Active,
        ExecutionState::Incident,
        ExecutionState::Canceled,
        ExecutionState::Completed,
    ];

    /// Parse a raw state tag as delivered by the statistics endpoint
    ///
    /// `incidents` is accepted as well since the statistics payload names
    /// the bucket in the plural.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "active" => Some(Self::Active),
            "incident" | "incidents" => Some(Self::Incident),
            "canceled" => Some(Self::Canceled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Incident => "incident",
            Self::Canceled => "canceled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw statistics row, before its state tag is validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticEntry {
    pub flow_node_id: String,
    pub state: String,
    pub count: u64,
}

impl StatisticEntry {
    pub fn new(flow_node_id: impl Into<String>, state: impl Into<String>, count: u64) -> Self {
        Self {
            flow_node_id: flow_node_id.into(),
            state: state.into(),
            count,
        }
    }
}

/// A validated statistics row: `count` tokens of one state at one node
#[derive(Debug, Clone, PartialEq)]
pub struct FlowNodeStatistic {
    pub flow_node_id: FlowNodeId,
    pub state: ExecutionState,
    pub count: u64,
}

/// Expected threshold configured for a flow node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetValue {
    pub value: f64,
    /// `true` if the measured value should stay below `value`
    #[serde(default = "default_below")]
    pub below: bool,
}

fn default_below() -> bool {
    true
}

impl TargetValue {
    pub fn below(value: f64) -> Self {
        Self { value, below: true }
    }

    pub fn above(value: f64) -> Self {
        Self {
            value,
            below: false,
        }
    }
}

impl fmt::Display for TargetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.below { "<" } else { ">" };
        write!(f, "{} {}", op, self.value)
    }
}

/// Target values keyed by flow node
pub type TargetValues = BTreeMap<FlowNodeId, TargetValue>;

/// An immutable view of the data layer at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Monotonically increasing; older snapshots are dropped
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub statistics: Vec<StatisticEntry>,
    #[serde(default)]
    pub target_values: TargetValues,
}

impl Snapshot {
    pub fn new(revision: u64) -> Self {
        Self {
            revision,
            ..Self::default()
        }
    }

    pub fn with_statistic(mut self, entry: StatisticEntry) -> Self {
        self.statistics.push(entry);
        self
    }

    pub fn with_target_value(mut self, id: impl Into<FlowNodeId>, target: TargetValue) -> Self {
        self.target_values.insert(id.into(), target);
        self
    }

    /// Validate every statistics row
    ///
    /// Rows with a zero count are dropped; an unknown state tag fails the
    /// whole snapshot.
    pub fn flow_nodes(&self) -> Result<Vec<FlowNodeStatistic>, OverlayError> {
        self.statistics
            .iter()
            .filter(|entry| entry.count > 0)
            .map(|entry| {
                let state = ExecutionState::from_tag(&entry.state)
                    .ok_or_else(|| OverlayError::unknown_state(&entry.flow_node_id, &entry.state))?;
                Ok(FlowNodeStatistic {
                    flow_node_id: FlowNodeId::new(entry.flow_node_id.clone()),
                    state,
                    count: entry.count,
                })
            })
            .collect()
    }
}

/// Sum the counts of all states per flow node
pub fn total_counts(nodes: &[FlowNodeStatistic]) -> BTreeMap<FlowNodeId, u64> {
    let mut totals = BTreeMap::new();
    for node in nodes {
        let total = totals.entry(node.flow_node_id.clone()).or_insert(0u64);
        *total = total.saturating_add(node.count);
    }
    totals
}
