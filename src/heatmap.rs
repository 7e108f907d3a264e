//! Aggregate heatmap layer
//!
//! The heatmap is a single image laid over the diagram viewport. It is never
//! patched: every refresh renders a new layer and swaps it in, detaching the
//! previous one first so the viewport holds at most one heatmap child.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use serde::Deserialize;

use crate::model::{BoundingBox, FlowNodeId, TargetValues};
use crate::stylesheet::Stylesheet;
use crate::viewer::{DiagramViewer, ElementInfo};

/// Extra radius around a node's shape covered by its heat blob
const BLOB_PADDING: f64 = 20.0;

/// Which values drive the heatmap colouring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeatmapMode {
    #[default]
    Off,
    /// Token counts, normalized by the busiest node
    Statistics,
    /// Measured counts compared against configured target values
    TargetValue,
}

/// Identifier of a viewport child
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

/// A rendered heatmap, ready to be attached to the viewport
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapLayer {
    pub id: LayerId,
    /// Area of the diagram the image covers
    pub bounds: BoundingBox,
    /// `data:` URI of the SVG image
    pub href: String,
}

/// Heat of one node, between 0.0 (cold) and 1.0 (hot)
#[derive(Debug, Clone, PartialEq)]
pub struct HeatPoint {
    pub flow_node_id: FlowNodeId,
    pub bounds: BoundingBox,
    pub value: f64,
}

/// Heat from token counts relative to the busiest node
pub fn statistics_heat(
    elements: &[ElementInfo],
    totals: &BTreeMap<FlowNodeId, u64>,
) -> Vec<HeatPoint> {
    let max = totals.values().copied().max().unwrap_or(0);
    if max == 0 {
        return Vec::new();
    }
    elements
        .iter()
        .filter_map(|element| {
            let count = *totals.get(&element.id)?;
            Some(HeatPoint {
                flow_node_id: element.id.clone(),
                bounds: element.bounds,
                value: count as f64 / max as f64,
            })
        })
        .collect()
}

/// Heat from measured counts against each node's target value
///
/// Only nodes with a target value contribute. A node expected below its
/// target heats up as it approaches it; a node expected above its target is
/// cold once it reaches it.
pub fn target_value_heat(
    elements: &[ElementInfo],
    targets: &TargetValues,
    totals: &BTreeMap<FlowNodeId, u64>,
) -> Vec<HeatPoint> {
    elements
        .iter()
        .filter_map(|element| {
            let target = targets.get(&element.id)?;
            let measured = totals.get(&element.id).copied().unwrap_or(0) as f64;
            let ratio = if target.value > 0.0 {
                measured / target.value
            } else if measured > 0.0 {
                f64::INFINITY
            } else {
                0.0
            };
            let value = if target.below {
                ratio.min(1.0)
            } else if ratio >= 1.0 {
                0.0
            } else {
                1.0 - ratio
            };
            Some(HeatPoint {
                flow_node_id: element.id.clone(),
                bounds: element.bounds,
                value,
            })
        })
        .collect()
}

/// Owns the single heatmap child of the viewer's viewport
#[derive(Debug, Default)]
pub struct HeatmapGenerator {
    next_id: u64,
    current: Option<LayerId>,
}

impl HeatmapGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The layer currently attached, if any
    pub fn current(&self) -> Option<LayerId> {
        self.current
    }

    /// Swap in a freshly rendered layer
    ///
    /// The previous layer is always detached; no new layer is attached when
    /// there are no heat points.
    pub fn replace<V>(
        &mut self,
        viewer: &mut V,
        points: &[HeatPoint],
        stylesheet: &Stylesheet,
    ) -> Option<LayerId>
    where
        V: DiagramViewer + ?Sized,
    {
        self.remove(viewer);
        let layer = self.render(points, stylesheet)?;
        let id = layer.id;
        viewer.append_viewport_child(layer);
        self.current = Some(id);
        Some(id)
    }

    /// Detach the current layer, if any
    pub fn remove<V>(&mut self, viewer: &mut V)
    where
        V: DiagramViewer + ?Sized,
    {
        if let Some(id) = self.current.take() {
            if !viewer.remove_viewport_child(id) {
                debug!("heatmap layer {:?} was already detached", id);
            }
        }
    }

    fn render(&mut self, points: &[HeatPoint], stylesheet: &Stylesheet) -> Option<HeatmapLayer> {
        let bounds = points
            .iter()
            .map(blob_bounds)
            .reduce(|a, b| a.union(&b))?;
        self.next_id += 1;
        let svg = render_heat_svg(points, bounds, stylesheet);
        Some(HeatmapLayer {
            id: LayerId(self.next_id),
            bounds,
            href: format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg)),
        })
    }
}

fn blob_radius(bounds: &BoundingBox) -> f64 {
    bounds.width.max(bounds.height) / 2.0 + BLOB_PADDING
}

fn blob_bounds(point: &HeatPoint) -> BoundingBox {
    let center = point.bounds.center();
    let r = blob_radius(&point.bounds);
    BoundingBox::new(center.x - r, center.y - r, 2.0 * r, 2.0 * r)
}

fn render_heat_svg(points: &[HeatPoint], bounds: BoundingBox, stylesheet: &Stylesheet) -> String {
    let cold = stylesheet.resolve_or_default("heat-cold");
    let hot = stylesheet.resolve_or_default("heat-hot");

    let mut defs = String::new();
    let mut blobs = String::new();
    for (i, point) in points.iter().enumerate() {
        let color = mix_hex(&cold, &hot, point.value).unwrap_or_else(|| hot.clone());
        let center = point.bounds.center();
        defs.push_str(&format!(
            r#"<radialGradient id="heat-{i}"><stop offset="0" stop-color="{color}" stop-opacity="0.8"/><stop offset="1" stop-color="{color}" stop-opacity="0"/></radialGradient>"#
        ));
        blobs.push_str(&format!(
            r#"<circle cx="{}" cy="{}" r="{}" fill="url(#heat-{i})"/>"#,
            center.x - bounds.x,
            center.y - bounds.y,
            blob_radius(&point.bounds)
        ));
    }

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><defs>{defs}</defs>{blobs}</svg>"#,
        w = bounds.width,
        h = bounds.height
    )
}

/// Linear interpolation between two `#rrggbb` colours
fn mix_hex(from: &str, to: &str, t: f64) -> Option<String> {
    let parse = |hex: &str| -> Option<[u8; 3]> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some([channel(0)?, channel(2)?, channel(4)?])
    };
    let a = parse(from)?;
    let b = parse(to)?;
    let t = t.clamp(0.0, 1.0);
    let mix = |i: usize| (a[i] as f64 + (b[i] as f64 - a[i] as f64) * t).round() as u8;
    Some(format!("#{:02x}{:02x}{:02x}", mix(0), mix(1), mix(2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TargetValue;
    use crate::viewer::SvgViewer;

    fn elements() -> Vec<ElementInfo> {
        vec![
            ElementInfo::new("a", "bpmn:Task", BoundingBox::new(0.0, 0.0, 100.0, 80.0)),
            ElementInfo::new("b", "bpmn:Task", BoundingBox::new(200.0, 0.0, 100.0, 80.0)),
        ]
    }

    fn totals() -> BTreeMap<FlowNodeId, u64> {
        BTreeMap::from([(FlowNodeId::from("a"), 10), (FlowNodeId::from("b"), 5)])
    }

    #[test]
    fn test_statistics_heat_normalizes() {
        let points = statistics_heat(&elements(), &totals());
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 1.0);
        assert_eq!(points[1].value, 0.5);
    }

    #[test]
    fn test_target_value_heat() {
        let mut targets = TargetValues::new();
        targets.insert("a".into(), TargetValue::below(20.0));
        targets.insert("b".into(), TargetValue::above(4.0));
        let points = target_value_heat(&elements(), &targets, &totals());
        assert_eq!(points[0].value, 0.5);
        assert_eq!(points[1].value, 0.0);
    }

    #[test]
    fn test_replace_twice_keeps_one_layer() {
        let mut viewer = SvgViewer::new(elements());
        let mut generator = HeatmapGenerator::new();
        let stylesheet = Stylesheet::default();
        let points = statistics_heat(&elements(), &totals());

        let first = generator.replace(&mut viewer, &points, &stylesheet);
        let second = generator.replace(&mut viewer, &points, &stylesheet);

        assert_ne!(first, second);
        assert_eq!(viewer.viewport_children().len(), 1);
        assert_eq!(viewer.viewport_children()[0].id, second.unwrap());
    }

    #[test]
    fn test_empty_points_remove_layer() {
        let mut viewer = SvgViewer::new(elements());
        let mut generator = HeatmapGenerator::new();
        let stylesheet = Stylesheet::default();
        generator.replace(&mut viewer, &statistics_heat(&elements(), &totals()), &stylesheet);
        assert_eq!(generator.replace(&mut viewer, &[], &stylesheet), None);
        assert!(viewer.viewport_children().is_empty());
        assert_eq!(generator.current(), None);
    }

    #[test]
    fn test_layer_is_base64_svg() {
        let mut generator = HeatmapGenerator::new();
        let layer = generator
            .render(&statistics_heat(&elements(), &totals()), &Stylesheet::default())
            .unwrap();
        let encoded = layer.href.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn test_mix_hex() {
        assert_eq!(mix_hex("#000000", "#ffffff", 0.0).as_deref(), Some("#000000"));
        assert_eq!(mix_hex("#000000", "#ffffff", 1.0).as_deref(), Some("#ffffff"));
        assert_eq!(mix_hex("#000000", "#ff0000", 0.5).as_deref(), Some("#800000"));
        assert_eq!(mix_hex("blue", "#ff0000", 0.5), None);
    }
}
