//! Configuration for diagram synchronization

use serde::Deserialize;

use crate::heatmap::HeatmapMode;

/// Which overlay features the controller maintains
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Values driving the heatmap layer
    pub heatmap: HeatmapMode,

    /// Highlight unconfigured elements, show target value badges and tooltips
    pub target_values: bool,

    /// Show pending modification counts while modification mode is active
    pub modification_badges: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            heatmap: HeatmapMode::Off,
            target_values: true,
            modification_badges: true,
        }
    }
}

impl SyncConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heatmap mode
    pub fn with_heatmap(mut self, mode: HeatmapMode) -> Self {
        self.heatmap = mode;
        self
    }

    /// Enable or disable target value highlighting
    pub fn with_target_values(mut self, enabled: bool) -> Self {
        self.target_values = enabled;
        self
    }

    /// Enable or disable modification badges
    pub fn with_modification_badges(mut self, enabled: bool) -> Self {
        self.modification_badges = enabled;
        self
    }
}
