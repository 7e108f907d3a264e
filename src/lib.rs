//! Process Overlay - live execution state and modification planning on
//! process diagrams
//!
//! This library keeps a diagram viewer's overlay layer in step with process
//! instance statistics, target values and a client-side plan of token
//! modifications. Scenario files replay a session against the in-memory
//! SVG viewer.
//!
//! # Example
//!
//! ```rust
//! use process_overlay::render;
//!
//! let svg = render(r#"
//! [[diagram.elements]]
//! id = "review"
//! type = "bpmn:UserTask"
//! bounds = { x = 0, y = 0, width = 100, height = 80 }
//! "#).unwrap();
//! assert!(svg.contains("<svg"));
//! ```

pub mod error;
pub mod heatmap;
pub mod highlight;
pub mod hover;
pub mod model;
pub mod modification;
pub mod overlay;
pub mod scenario;
pub mod stylesheet;
pub mod sync;
pub mod viewer;

pub use error::{CommitError, OverlayError, SimulationError, SyncError};
pub use heatmap::HeatmapMode;
pub use model::{FlowNodeId, Snapshot, StatisticEntry, TargetValue, TargetValues};
pub use modification::{Modification, ModificationSimulator};
pub use scenario::{Replay, Scenario, ScenarioError};
pub use stylesheet::Stylesheet;
pub use sync::{CommitChannel, DiagramSyncController, SyncConfig, SyncOutcome, TargetValueEditor};
pub use viewer::{DiagramViewer, SvgConfig, SvgViewer, ViewerEvent};

use thiserror::Error;

/// Errors that can occur while running a scenario
#[derive(Debug, Error)]
pub enum RunError {
    /// Error loading or replaying the scenario
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// Error serializing the modification plan
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for a complete scenario run
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Overlay features, unless the scenario sets its own
    pub sync: SyncConfig,
    /// Heatmap mode that overrides both the scenario and `sync`
    pub heatmap: Option<HeatmapMode>,
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Stylesheet for color resolution
    pub stylesheet: Stylesheet,
    /// Debug mode: dump attached overlays to stderr
    pub debug: bool,
}

impl SessionConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sync configuration
    pub fn with_sync(mut self, config: SyncConfig) -> Self {
        self.sync = config;
        self
    }

    /// Force a heatmap mode
    pub fn with_heatmap(mut self, mode: HeatmapMode) -> Self {
        self.heatmap = Some(mode);
        self
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Set the stylesheet for color resolution
    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The sync configuration that applies to `scenario`
    pub fn sync_for(&self, scenario: &Scenario) -> SyncConfig {
        let mut sync = scenario.config.clone().unwrap_or_else(|| self.sync.clone());
        if let Some(mode) = self.heatmap {
            sync.heatmap = mode;
        }
        sync
    }
}

/// Replay scenario TOML and render the annotated diagram with default configuration
pub fn render(source: &str) -> Result<String, RunError> {
    render_with_config(source, SessionConfig::default())
}

/// Replay scenario TOML and render the annotated diagram
///
/// # Example
///
/// ```rust
/// use process_overlay::{render_with_config, HeatmapMode, SessionConfig, SvgConfig};
///
/// let config = SessionConfig::new()
///     .with_heatmap(HeatmapMode::Statistics)
///     .with_svg(SvgConfig::default().with_viewbox_padding(10.0));
///
/// let svg = render_with_config(r#"
/// [[diagram.elements]]
/// id = "a"
/// type = "bpmn:Task"
/// bounds = { x = 0, y = 0, width = 100, height = 80 }
///
/// [[statistics]]
/// flow_node_id = "a"
/// state = "active"
/// count = 4
/// "#, config).unwrap();
/// assert!(svg.contains("po-heatmap"));
/// ```
pub fn render_with_config(source: &str, config: SessionConfig) -> Result<String, RunError> {
    let scenario = Scenario::from_str(source)?;
    render_scenario(&scenario, &config)
}

/// Replay a loaded scenario and render the annotated diagram
pub fn render_scenario(scenario: &Scenario, config: &SessionConfig) -> Result<String, RunError> {
    let replay = replay(scenario, config)?;
    Ok(replay
        .controller
        .viewer()
        .render(&config.svg, &config.stylesheet))
}

/// Replay a loaded scenario, returning the final session state
pub fn replay(scenario: &Scenario, config: &SessionConfig) -> Result<Replay, RunError> {
    let replay = scenario.replay(config.sync_for(scenario), config.stylesheet.clone())?;

    if config.debug {
        eprintln!("=== Overlay Debug ===");
        for overlay in replay.controller.registry().overlays() {
            eprintln!(
                "[{}] {} {:?} '{}'",
                overlay.flow_node_id,
                overlay.kind().class_name(),
                overlay.position,
                overlay.payload.label()
            );
        }
        eprintln!("=====================");
    }

    Ok(replay)
}

/// The pending modification plan as JSON
pub fn modifications_json(replay: &Replay) -> Result<String, RunError> {
    Ok(serde_json::to_string_pretty(
        replay.controller.simulator().modifications(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
process_instance = "pi-1"

[[diagram.elements]]
id = "a"
type = "bpmn:UserTask"
name = "Check"
bounds = { x = 0, y = 0, width = 100, height = 80 }

[[diagram.elements]]
id = "b"
type = "bpmn:UserTask"
bounds = { x = 150, y = 0, width = 100, height = 80 }

[[statistics]]
flow_node_id = "a"
state = "incident"
count = 1

[[steps]]
action = "enable_modifications"

[[steps]]
action = "add_token"

[[steps]]
action = "select"
node = "b"
"#;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.sync, SyncConfig::default());
        assert_eq!(config.heatmap, None);
        assert!(!config.debug);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SessionConfig::new()
            .with_sync(SyncConfig::new().with_target_values(false))
            .with_heatmap(HeatmapMode::TargetValue)
            .with_svg(SvgConfig::new().with_pretty_print(false))
            .with_debug(true);
        assert!(!config.sync.target_values);
        assert_eq!(config.heatmap, Some(HeatmapMode::TargetValue));
        assert!(!config.svg.pretty_print);
        assert!(config.debug);
    }

    #[test]
    fn test_heatmap_override_wins_over_scenario() {
        let mut scenario = Scenario::from_str(SCENARIO).unwrap();
        scenario.config = Some(SyncConfig::new().with_heatmap(HeatmapMode::Statistics));
        let config = SessionConfig::new().with_heatmap(HeatmapMode::Off);
        assert_eq!(config.sync_for(&scenario).heatmap, HeatmapMode::Off);
        assert_eq!(
            SessionConfig::new().sync_for(&scenario).heatmap,
            HeatmapMode::Statistics
        );
    }

    #[test]
    fn test_render_overlays() {
        let svg = render(SCENARIO).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("po-state-incident"));
        assert!(svg.contains("po-modification-badge"));
        assert!(svg.contains("Check"));
    }

    #[test]
    fn test_render_parse_error() {
        let result = render("this is not toml {{{{");
        assert!(matches!(
            result,
            Err(RunError::Scenario(ScenarioError::ParseError(_)))
        ));
    }

    #[test]
    fn test_modifications_json() {
        let scenario = Scenario::from_str(SCENARIO).unwrap();
        let replay = replay(&scenario, &SessionConfig::default()).unwrap();
        let json = modifications_json(&replay).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["kind"], "addToken");
        assert_eq!(value[0]["targetFlowNodeId"], "b");
    }
}
