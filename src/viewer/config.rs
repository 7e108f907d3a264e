//! Output options of the SVG viewer

/// How `SvgViewer::render` draws the diagram and its overlays
#[derive(Debug, Clone)]
pub struct SvgConfig {
    /// Margin added around the union of element and heatmap bounds
    pub viewbox_padding: f64,

    /// Emit the XML declaration
    pub standalone: bool,

    /// Indent nested groups, one element per line
    pub pretty_print: bool,

    /// Prepended to every CSS class, e.g. `po-` gives `po-overlay`
    pub class_prefix: Option<String>,

    /// Draw element names inside their shapes
    pub show_labels: bool,

    /// Height of an overlay badge; corners are fully rounded
    pub badge_height: f64,

    /// Opacity of state badges whose tokens are planned to leave the node
    pub faded_opacity: f64,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            viewbox_padding: 40.0,
            standalone: true,
            pretty_print: true,
            class_prefix: Some("po-".to_string()),
            show_labels: true,
            badge_height: 18.0,
            faded_opacity: 0.4,
        }
    }
}

impl SvgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewbox_padding(mut self, padding: f64) -> Self {
        self.viewbox_padding = padding;
        self
    }

    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Use `prefix` for CSS classes; an empty prefix disables prefixing
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return self.without_class_prefix();
        }
        self.class_prefix = Some(prefix);
        self
    }

    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    pub fn with_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }

    pub fn with_badge_height(mut self, height: f64) -> Self {
        self.badge_height = height;
        self
    }

    /// Opacity of faded state badges, clamped to `0.0..=1.0`
    pub fn with_faded_opacity(mut self, opacity: f64) -> Self {
        self.faded_opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SvgConfig::default();
        assert_eq!(config.viewbox_padding, 40.0);
        assert!(config.standalone);
        assert!(config.show_labels);
        assert_eq!(config.class_prefix.as_deref(), Some("po-"));
        assert_eq!(config.badge_height, 18.0);
        assert_eq!(config.faded_opacity, 0.4);
    }

    #[test]
    fn test_overlay_options() {
        let config = SvgConfig::new()
            .with_labels(false)
            .with_badge_height(24.0)
            .with_faded_opacity(1.5);
        assert!(!config.show_labels);
        assert_eq!(config.badge_height, 24.0);
        assert_eq!(config.faded_opacity, 1.0);
    }

    #[test]
    fn test_class_prefix() {
        assert_eq!(
            SvgConfig::new().with_class_prefix("bpmn-").class_prefix.as_deref(),
            Some("bpmn-")
        );
        assert_eq!(SvgConfig::new().with_class_prefix("").class_prefix, None);
        assert_eq!(SvgConfig::new().without_class_prefix().class_prefix, None);
    }
}
