//! In-memory diagram viewer that renders to SVG
//!
//! `SvgViewer` keeps the elements, markers, overlays and viewport children
//! the engine manipulates, and can serialize the current state as a
//! standalone SVG document.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::heatmap::{HeatmapLayer, LayerId};
use crate::model::{BoundingBox, FlowNodeId, Point};
use crate::overlay::{OverlayPayload, OverlayPosition};
use crate::stylesheet::Stylesheet;

use super::{DiagramViewer, ElementInfo, ElementKind, Marker, OverlayHandle, SvgConfig};

/// Approximate advance of one label character
const CHAR_WIDTH: f64 = 7.0;

/// An overlay as the viewer stores it
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerOverlay {
    pub element: FlowNodeId,
    pub position: OverlayPosition,
    pub payload: OverlayPayload,
}

/// Diagram viewer backed by plain data
#[derive(Debug, Default)]
pub struct SvgViewer {
    elements: Vec<ElementInfo>,
    markers: BTreeMap<FlowNodeId, BTreeSet<Marker>>,
    overlays: BTreeMap<OverlayHandle, ViewerOverlay>,
    viewport: Vec<HeatmapLayer>,
    next_handle: u64,
}

impl SvgViewer {
    pub fn new(elements: Vec<ElementInfo>) -> Self {
        Self {
            elements,
            ..Self::default()
        }
    }

    /// Number of overlays currently attached
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn overlay(&self, handle: OverlayHandle) -> Option<&ViewerOverlay> {
        self.overlays.get(&handle)
    }

    /// Overlays attached to one element, in attach order
    pub fn overlays_on(&self, id: &str) -> Vec<&ViewerOverlay> {
        self.overlays
            .values()
            .filter(|o| o.element.as_str() == id)
            .collect()
    }

    pub fn has_marker(&self, id: &str, marker: Marker) -> bool {
        self.markers
            .get(id)
            .map(|set| set.contains(&marker))
            .unwrap_or(false)
    }

    /// Ids of every element carrying `marker`
    pub fn marked(&self, marker: Marker) -> Vec<&FlowNodeId> {
        self.markers
            .iter()
            .filter(|(_, set)| set.contains(&marker))
            .map(|(id, _)| id)
            .collect()
    }

    /// Children of the viewport container, in append order
    pub fn viewport_children(&self) -> &[HeatmapLayer] {
        &self.viewport
    }

    /// Drop an element along with its markers and overlays
    pub fn remove_element(&mut self, id: &str) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id.as_str() != id);
        self.markers.remove(id);
        self.overlays.retain(|_, o| o.element.as_str() != id);
        self.elements.len() != before
    }

    /// Serialize the annotated diagram
    pub fn render(&self, config: &SvgConfig, stylesheet: &Stylesheet) -> String {
        let mut builder = SvgBuilder::new(config.clone());
        builder.add_stylesheet(stylesheet);

        let prefix = builder.prefix();
        builder.start_group(None, &[format!("{}elements", prefix)]);
        for element in &self.elements {
            self.render_element(element, config, &mut builder);
        }
        builder.end_group();

        builder.start_group(None, &[format!("{}viewport", prefix)]);
        for layer in &self.viewport {
            builder.add_image(&layer.bounds, &layer.href, &[format!("{}heatmap", prefix)]);
        }
        builder.end_group();

        builder.start_group(None, &[format!("{}overlays", prefix)]);
        for (handle, overlay) in &self.overlays {
            if let Some(element) = self.find(overlay.element.as_str()) {
                render_overlay(*handle, overlay, &element.bounds, config, stylesheet, &mut builder);
            }
        }
        builder.end_group();

        builder.build(self.bounds())
    }

    fn find(&self, id: &str) -> Option<&ElementInfo> {
        self.elements.iter().find(|e| e.id.as_str() == id)
    }

    fn bounds(&self) -> BoundingBox {
        self.elements
            .iter()
            .map(|e| e.bounds)
            .chain(self.viewport.iter().map(|l| l.bounds))
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(BoundingBox::zero)
    }

    fn render_element(&self, element: &ElementInfo, config: &SvgConfig, builder: &mut SvgBuilder) {
        let prefix = builder.prefix();
        let mut classes = vec![
            format!("{}element", prefix),
            format!("{}{}", prefix, kind_class(element.kind)),
        ];
        if let Some(markers) = self.markers.get(&element.id) {
            classes.extend(markers.iter().map(|m| format!("{}{}", prefix, m.class_name())));
        }
        builder.start_group(Some(element.id.as_str()), &classes);

        let b = &element.bounds;
        if element.kind.is_event() {
            let r = b.width.min(b.height) / 2.0;
            let c = b.center();
            builder.add_circle(c.x, c.y, r);
        } else if element.kind.is_gateway() {
            let points = [
                Point::new(b.x + b.width / 2.0, b.y),
                Point::new(b.right(), b.y + b.height / 2.0),
                Point::new(b.x + b.width / 2.0, b.bottom()),
                Point::new(b.x, b.y + b.height / 2.0),
            ];
            builder.add_polygon(&points);
        } else {
            let rx = match element.kind {
                ElementKind::Other => 0.0,
                _ => 10.0,
            };
            builder.add_rect(b, rx, &[], "");
        }

        if config.show_labels {
            if let Some(name) = &element.name {
                let c = b.center();
                builder.add_text(name, c.x, c.y, &[], "");
            }
        }
        builder.end_group();
    }
}

impl DiagramViewer for SvgViewer {
    fn element(&self, id: &str) -> Option<ElementInfo> {
        self.find(id).cloned()
    }

    fn elements(&self) -> Vec<ElementInfo> {
        self.elements.clone()
    }

    fn add_marker(&mut self, id: &str, marker: Marker) {
        if self.find(id).is_none() {
            debug!("ignoring {:?} marker for unknown element '{}'", marker, id);
            return;
        }
        self.markers.entry(FlowNodeId::from(id)).or_default().insert(marker);
    }

    fn remove_marker(&mut self, id: &str, marker: Marker) {
        if let Some(set) = self.markers.get_mut(id) {
            set.remove(&marker);
            if set.is_empty() {
                self.markers.remove(id);
            }
        }
    }

    fn add_overlay(
        &mut self,
        id: &str,
        position: OverlayPosition,
        content: &OverlayPayload,
    ) -> OverlayHandle {
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.overlays.insert(
            handle,
            ViewerOverlay {
                element: FlowNodeId::from(id),
                position,
                payload: content.clone(),
            },
        );
        handle
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) -> bool {
        self.overlays.remove(&handle).is_some()
    }

    fn append_viewport_child(&mut self, layer: HeatmapLayer) {
        self.viewport.push(layer);
    }

    fn remove_viewport_child(&mut self, id: LayerId) -> bool {
        match self.viewport.iter().position(|l| l.id == id) {
            Some(index) => {
                self.viewport.remove(index);
                true
            }
            None => false,
        }
    }
}

fn kind_class(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Task => "task",
        ElementKind::SubProcess => "sub-process",
        ElementKind::CallActivity => "call-activity",
        ElementKind::StartEvent => "start-event",
        ElementKind::EndEvent => "end-event",
        ElementKind::IntermediateCatchEvent => "intermediate-catch-event",
        ElementKind::IntermediateThrowEvent => "intermediate-throw-event",
        ElementKind::BoundaryEvent => "boundary-event",
        ElementKind::EventBasedGateway => "event-based-gateway",
        ElementKind::Gateway => "gateway",
        ElementKind::Other => "other",
    }
}

/// Background and text colour tokens of an overlay
fn overlay_colors(payload: &OverlayPayload) -> (String, &'static str) {
    match payload {
        OverlayPayload::State { state, .. } => (format!("state-{}", state), "text-light"),
        OverlayPayload::ModificationBadge(_) => ("badge-background".to_string(), "text-1"),
        OverlayPayload::TargetValueBadge(_) => ("target-badge".to_string(), "text-light"),
        OverlayPayload::TargetValueTooltip { .. } => {
            ("tooltip-background".to_string(), "text-light")
        }
    }
}

fn render_overlay(
    handle: OverlayHandle,
    overlay: &ViewerOverlay,
    bounds: &BoundingBox,
    config: &SvgConfig,
    stylesheet: &Stylesheet,
    builder: &mut SvgBuilder,
) {
    let prefix = builder.prefix();
    let anchor = overlay.position.anchor(bounds);
    let label = overlay.payload.label();
    let width = label.chars().count() as f64 * CHAR_WIDTH + 10.0;
    let (fill_token, text_token) = overlay_colors(&overlay.payload);

    let mut classes = vec![
        format!("{}overlay", prefix),
        format!("{}{}", prefix, overlay.payload.kind().class_name()),
    ];
    let faded = matches!(overlay.payload, OverlayPayload::State { faded: true, .. });
    if faded {
        classes.push(format!("{}faded", prefix));
    }
    builder.start_group(Some(format!("{}overlay-{}", prefix, handle.0).as_str()), &classes);

    let opacity = if faded {
        format!(r#" opacity="{}""#, config.faded_opacity)
    } else {
        String::new()
    };
    let badge = BoundingBox::new(anchor.x, anchor.y, width, config.badge_height);
    builder.add_rect(
        &badge,
        config.badge_height / 2.0,
        &[],
        &format!(
            r#" fill="{}"{}"#,
            stylesheet.resolve_or_default(&fill_token),
            opacity
        ),
    );
    let center = badge.center();
    builder.add_text(
        &label,
        center.x,
        center.y,
        &[],
        &format!(r#" fill="{}""#, stylesheet.resolve_or_default(text_token)),
    );
    builder.end_group();
}

/// Build SVG elements incrementally
struct SvgBuilder {
    config: SvgConfig,
    styles: Vec<String>,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    fn new(config: SvgConfig) -> Self {
        Self {
            config,
            styles: vec![],
            elements: vec![],
            indent: 1,
        }
    }

    /// Add CSS custom properties and marker rules from a stylesheet
    fn add_stylesheet(&mut self, stylesheet: &Stylesheet) {
        let mut tokens: Vec<_> = stylesheet.colors.iter().collect();
        tokens.sort();
        let mut css = String::from(":root {\n");
        for (token, value) in tokens {
            css.push_str(&format!("    --{}: {};\n", token, value));
        }
        css.push_str("  }\n");

        let prefix = self.prefix();
        css.push_str(&format!(
            "  .{p}shape {{ fill: {fill}; stroke: {stroke}; stroke-width: 2; }}\n",
            p = prefix,
            fill = stylesheet.resolve_or_default("shape-fill"),
            stroke = stylesheet.resolve_or_default("shape-stroke"),
        ));
        css.push_str(&format!(
            "  .{p}highlight > .{p}shape {{ stroke: {color}; stroke-width: 4; }}\n",
            p = prefix,
            color = stylesheet.resolve_or_default("highlight"),
        ));
        css.push_str(&format!("  .{}clickable {{ cursor: pointer; }}", prefix));
        self.styles.push(css);
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    fn shape_classes(&self, shape: &str, extra: &[String]) -> String {
        let prefix = self.prefix();
        std::iter::once(format!("{}shape", prefix))
            .chain(std::iter::once(format!("{}{}", prefix, shape)))
            .chain(extra.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn add_rect(&mut self, b: &BoundingBox, rx: f64, classes: &[String], styles: &str) {
        let class_list = self.shape_classes("rect", classes);
        let rx_attr = if rx > 0.0 {
            format!(r#" rx="{}""#, rx)
        } else {
            String::new()
        };
        self.elements.push(format!(
            r#"{}<rect class="{}" x="{}" y="{}" width="{}" height="{}"{}{}/>"#,
            self.indent_str(),
            class_list,
            b.x,
            b.y,
            b.width,
            b.height,
            rx_attr,
            styles
        ));
    }

    fn add_circle(&mut self, cx: f64, cy: f64, r: f64) {
        let class_list = self.shape_classes("circle", &[]);
        self.elements.push(format!(
            r#"{}<circle class="{}" cx="{}" cy="{}" r="{}"/>"#,
            self.indent_str(),
            class_list,
            cx,
            cy,
            r
        ));
    }

    fn add_polygon(&mut self, points: &[Point]) {
        let class_list = self.shape_classes("polygon", &[]);
        let points_str: String = points
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        self.elements.push(format!(
            r#"{}<polygon class="{}" points="{}"/>"#,
            self.indent_str(),
            class_list,
            points_str
        ));
    }

    fn add_text(&mut self, text: &str, x: f64, y: f64, classes: &[String], styles: &str) {
        let prefix = self.prefix();
        let class_list = std::iter::once(format!("{}label", prefix))
            .chain(classes.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        self.elements.push(format!(
            r#"{}<text class="{}" x="{}" y="{}" text-anchor="middle" dominant-baseline="middle"{}>{}</text>"#,
            self.indent_str(),
            class_list,
            x,
            y,
            styles,
            escape_xml(text)
        ));
    }

    fn add_image(&mut self, b: &BoundingBox, href: &str, classes: &[String]) {
        self.elements.push(format!(
            r#"{}<image class="{}" x="{}" y="{}" width="{}" height="{}" href="{}"/>"#,
            self.indent_str(),
            classes.join(" "),
            b.x,
            b.y,
            b.width,
            b.height,
            escape_xml(href)
        ));
    }

    /// Add a group element with optional ID and classes
    fn start_group(&mut self, id: Option<&str>, classes: &[String]) {
        let id_attr = id
            .map(|i| format!(r#" id="{}""#, escape_xml(i)))
            .unwrap_or_default();
        let class_attr = if classes.is_empty() {
            String::new()
        } else {
            format!(r#" class="{}""#, classes.join(" "))
        };

        self.elements
            .push(format!("{}<g{}{}>", self.indent_str(), id_attr, class_attr));
        self.indent += 1;
    }

    /// Close a group element
    fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Build the final SVG string
    fn build(self, viewbox: BoundingBox) -> String {
        let padding = self.config.viewbox_padding;
        let vb_x = viewbox.x - padding;
        let vb_y = viewbox.y - padding;
        let vb_w = viewbox.width + 2.0 * padding;
        let vb_h = viewbox.height + 2.0 * padding;

        let nl = self.newline();

        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            vb_x, vb_y, vb_w, vb_h
        ));
        svg.push_str(nl);

        if !self.styles.is_empty() {
            svg.push_str("  <style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str("    ");
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str("  </style>");
            svg.push_str(nl);
        }

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");

        svg
    }
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
