//! Scripted sessions replayed against the in-memory viewer
//!
//! A scenario is a TOML file describing a diagram, the process instance
//! being inspected, its statistics and target values, and a list of user
//! steps. Replaying it drives a `DiagramSyncController` exactly as a host
//! application would.
//!
//! ```toml
//! process_instance = "order-4711"
//!
//! [diagram]
//! bpmn = "order.bpmn"
//!
//! [[statistics]]
//! flow_node_id = "review"
//! state = "active"
//! count = 3
//!
//! [target_values]
//! review = { value = 5.0 }
//!
//! [[steps]]
//! action = "enable_modifications"
//!
//! [[steps]]
//! action = "move_token"
//! from = "review"
//! ```

use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::error::{CommitError, SyncError};
use crate::model::{BoundingBox, FlowNodeId, Snapshot, StatisticEntry, TargetValue, TargetValues};
use crate::modification::Modification;
use crate::stylesheet::Stylesheet;
use crate::sync::{CommitChannel, DiagramSyncController, SyncConfig, TargetValueEditor};
use crate::viewer::{load_elements, BpmnError, ElementInfo, SvgViewer, ViewerEvent};

/// Errors that can occur when loading or replaying a scenario
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read scenario input: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse scenario TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to load diagram: {0}")]
    Bpmn(#[from] BpmnError),

    #[error("diagram must use only one of 'bpmn', 'xml' or 'elements'")]
    AmbiguousDiagram,

    #[error("initial snapshot rejected: {0}")]
    Sync(#[from] SyncError),

    #[error("step {index} failed: {source}")]
    Step {
        index: usize,
        #[source]
        source: SyncError,
    },
}

/// Where the diagram elements come from
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiagramSource {
    /// BPMN file, relative to the scenario file
    pub bpmn: Option<PathBuf>,
    /// Inline BPMN XML
    pub xml: Option<String>,
    /// Elements given directly
    pub elements: Vec<ElementSpec>,
}

/// One inline diagram element
#[derive(Debug, Clone, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub bpmn_type: String,
    pub name: Option<String>,
    pub bounds: BoundingBox,
}

impl From<&ElementSpec> for ElementInfo {
    fn from(spec: &ElementSpec) -> Self {
        let info = ElementInfo::new(spec.id.as_str(), spec.bpmn_type.as_str(), spec.bounds);
        match &spec.name {
            Some(name) => info.with_name(name.as_str()),
            None => info,
        }
    }
}

/// A user or data-layer action
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// The viewer rendered the diagram again
    Render,
    EnableModifications,
    DisableModifications,
    MoveToken {
        from: FlowNodeId,
    },
    AddToken,
    Select {
        node: FlowNodeId,
    },
    CancelToken {
        node: FlowNodeId,
        #[serde(default = "default_count")]
        count: u32,
    },
    Discard,
    Undo,
    Click {
        node: FlowNodeId,
    },
    Hover {
        node: FlowNodeId,
    },
    Leave {
        node: FlowNodeId,
    },
    /// The target value editor saved a value
    SetTargetValue {
        node: FlowNodeId,
        value: f64,
        #[serde(default = "default_below")]
        below: bool,
    },
    /// A new statistics snapshot arrived
    Snapshot {
        revision: u64,
        #[serde(default)]
        statistics: Vec<StatisticEntry>,
        /// Keeps the current target values when absent
        target_values: Option<TargetValues>,
    },
    ProcessInstance {
        id: Option<String>,
    },
    /// Commit the plan; `reject` makes the backend refuse it
    Commit {
        reject: Option<String>,
    },
}

fn default_count() -> u32 {
    1
}

fn default_below() -> bool {
    true
}

/// A parsed scenario file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    pub process_instance: Option<String>,
    #[serde(default)]
    pub diagram: DiagramSource,
    /// Overlay features; the session default applies when absent
    pub config: Option<SyncConfig>,
    #[serde(default)]
    pub statistics: Vec<StatisticEntry>,
    #[serde(default)]
    pub target_values: TargetValues,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// Editor stand-in that records which elements it was opened for
#[derive(Debug, Default)]
pub struct EditorLog {
    pub opened: Vec<FlowNodeId>,
}

impl TargetValueEditor for EditorLog {
    fn open(&mut self, element: &ElementInfo) {
        debug!("target value editor opened for '{}'", element.id);
        self.opened.push(element.id.clone());
    }
}

/// Commit channel stand-in that records accepted modification lists
#[derive(Debug, Default)]
pub struct CommitLog {
    pub accepted: Vec<(String, Vec<Modification>)>,
    reject: Option<String>,
}

impl CommitChannel for CommitLog {
    fn commit(
        &mut self,
        process_instance_id: &str,
        modifications: &[Modification],
    ) -> Result<(), CommitError> {
        if let Some(reason) = self.reject.take() {
            return Err(CommitError::Rejected(reason));
        }
        self.accepted
            .push((process_instance_id.to_string(), modifications.to_vec()));
        Ok(())
    }
}

/// Final state of a replayed scenario
pub struct Replay {
    pub controller: DiagramSyncController<SvgViewer>,
    pub editor: EditorLog,
    pub commits: CommitLog,
}

impl Scenario {
    /// Load a scenario from a TOML file
    ///
    /// A relative `diagram.bpmn` path is resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        let mut scenario = Self::from_str(&content)?;
        scenario.base_dir = path.parent().map(Path::to_path_buf);
        Ok(scenario)
    }

    /// Load a scenario from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(content)?)
    }

    /// The diagram elements this scenario runs against
    pub fn elements(&self) -> Result<Vec<ElementInfo>, ScenarioError> {
        let source = &self.diagram;
        let sources = [
            source.bpmn.is_some(),
            source.xml.is_some(),
            !source.elements.is_empty(),
        ];
        if sources.iter().filter(|s| **s).count() > 1 {
            return Err(ScenarioError::AmbiguousDiagram);
        }

        if let Some(path) = &source.bpmn {
            let path = match &self.base_dir {
                Some(dir) if path.is_relative() => dir.join(path),
                _ => path.clone(),
            };
            let xml = std::fs::read_to_string(path)?;
            return Ok(load_elements(&xml)?);
        }
        if let Some(xml) = &source.xml {
            return Ok(load_elements(xml)?);
        }
        Ok(source.elements.iter().map(ElementInfo::from).collect())
    }

    /// Run every step against a fresh `SvgViewer`
    ///
    /// Rejected commits do not stop the replay; the plan simply stays
    /// pending. Any other failing step does.
    pub fn replay(&self, config: SyncConfig, stylesheet: Stylesheet) -> Result<Replay, ScenarioError> {
        let viewer = SvgViewer::new(self.elements()?);
        let mut controller = DiagramSyncController::new(viewer, config).with_stylesheet(stylesheet);
        controller.set_process_instance(self.process_instance.clone());
        controller.diagram_rendered();

        let initial = Snapshot {
            revision: 0,
            statistics: self.statistics.clone(),
            target_values: self.target_values.clone(),
        };
        controller.apply_snapshot(initial)?;

        let mut editor = EditorLog::default();
        let mut commits = CommitLog::default();
        for (i, step) in self.steps.iter().enumerate() {
            debug!("step {}: {:?}", i + 1, step);
            run_step(&mut controller, step, &mut editor, &mut commits)
                .map_err(|source| ScenarioError::Step { index: i + 1, source })?;
        }

        Ok(Replay {
            controller,
            editor,
            commits,
        })
    }
}

fn run_step(
    controller: &mut DiagramSyncController<SvgViewer>,
    step: &Step,
    editor: &mut EditorLog,
    commits: &mut CommitLog,
) -> Result<(), SyncError> {
    match step {
        Step::Render => {
            controller.diagram_rendered();
        }
        Step::EnableModifications => {
            controller.enable_modification_mode();
        }
        Step::DisableModifications => {
            controller.disable_modification_mode();
        }
        Step::MoveToken { from } => controller.start_moving_token(from.clone())?,
        Step::AddToken => controller.start_adding_token()?,
        Step::Select { node } => {
            controller.select_flow_node(node.clone())?;
        }
        Step::CancelToken { node, count } => controller.cancel_token(node.clone(), *count)?,
        Step::Discard => controller.discard()?,
        Step::Undo => {
            controller.undo_last_modification()?;
        }
        Step::Click { node } => controller.handle_event(ViewerEvent::Click(node.clone()), editor)?,
        Step::Hover { node } => {
            controller.handle_event(ViewerEvent::HoverEnter(node.clone()), editor)?
        }
        Step::Leave { node } => {
            controller.handle_event(ViewerEvent::HoverLeave(node.clone()), editor)?
        }
        Step::SetTargetValue { node, value, below } => {
            let mut targets = controller.target_values().clone();
            let target = if *below {
                TargetValue::below(*value)
            } else {
                TargetValue::above(*value)
            };
            targets.insert(node.clone(), target);
            controller.set_target_values(targets);
        }
        Step::Snapshot {
            revision,
            statistics,
            target_values,
        } => {
            let snapshot = Snapshot {
                revision: *revision,
                statistics: statistics.clone(),
                target_values: target_values
                    .clone()
                    .unwrap_or_else(|| controller.target_values().clone()),
            };
            controller.apply_snapshot(snapshot)?;
        }
        Step::ProcessInstance { id } => {
            controller.set_process_instance(id.clone());
        }
        Step::Commit { reject } => {
            commits.reject = reject.clone();
            match controller.commit(commits) {
                Ok(_) | Err(SyncError::Commit(CommitError::Rejected(_))) => {}
                Err(err) => return Err(err),
            }
            commits.reject = None;
        }
    }
    Ok(())
}
