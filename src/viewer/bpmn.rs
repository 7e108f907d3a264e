//! Loading diagram elements from BPMN 2.0 XML
//!
//! Only what the overlay engine needs is extracted: each shape of the
//! diagram interchange section joined with the type and name of the model
//! element it depicts.

use std::collections::HashMap;

use log::debug;
use roxmltree::{Document, Node};
use thiserror::Error;

use crate::model::BoundingBox;

use super::ElementInfo;

const MODEL_NS: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";

/// Errors that can occur when reading a BPMN document
#[derive(Error, Debug)]
pub enum BpmnError {
    #[error("Failed to parse BPMN XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("<{element}> is missing the '{attribute}' attribute")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("Invalid number '{value}' for '{attribute}' of shape '{shape}'")]
    InvalidNumber {
        shape: String,
        attribute: &'static str,
        value: String,
    },

    #[error("Shape refers to unknown element '{0}'")]
    UnknownElement(String),
}

/// Type and name of a model element, keyed by id
struct ModelElement<'a> {
    local_name: &'a str,
    name: Option<&'a str>,
}

/// Read every shape of a BPMN document as an `ElementInfo`
///
/// Elements keep the document order of their shapes. Edges, labels and
/// model elements without a shape are not reported.
pub fn load_elements(xml: &str) -> Result<Vec<ElementInfo>, BpmnError> {
    let doc = Document::parse(xml)?;

    let mut model: HashMap<&str, ModelElement<'_>> = HashMap::new();
    for node in doc.descendants().filter(|n| n.is_element()) {
        if node.tag_name().namespace() != Some(MODEL_NS) {
            continue;
        }
        if let Some(id) = node.attribute("id") {
            model.insert(
                id,
                ModelElement {
                    local_name: node.tag_name().name(),
                    name: node.attribute("name"),
                },
            );
        }
    }

    let mut elements = Vec::new();
    for shape in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "BPMNShape")
    {
        let element_id = required(shape, "bpmnElement")?;
        let target = model
            .get(element_id)
            .ok_or_else(|| BpmnError::UnknownElement(element_id.to_string()))?;
        let bounds = match shape
            .children()
            .find(|c| c.is_element() && c.tag_name().name() == "Bounds")
        {
            Some(bounds) => parse_bounds(element_id, bounds)?,
            None => {
                debug!("shape for '{}' has no bounds, skipping", element_id);
                continue;
            }
        };

        let mut info = ElementInfo::new(element_id, type_name(target.local_name), bounds);
        if let Some(name) = target.name {
            info = info.with_name(name);
        }
        elements.push(info);
    }

    debug!("loaded {} diagram elements", elements.len());
    Ok(elements)
}

/// `userTask` becomes `bpmn:UserTask`
fn type_name(local_name: &str) -> String {
    let mut chars = local_name.chars();
    match chars.next() {
        Some(first) => format!("bpmn:{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "bpmn:".to_string(),
    }
}

fn required<'a>(node: Node<'a, '_>, attribute: &'static str) -> Result<&'a str, BpmnError> {
    node.attribute(attribute)
        .ok_or_else(|| BpmnError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute,
        })
}

fn parse_bounds(shape: &str, node: Node<'_, '_>) -> Result<BoundingBox, BpmnError> {
    let number = |attribute: &'static str| -> Result<f64, BpmnError> {
        let value = required(node, attribute)?;
        value.trim().parse().map_err(|_| BpmnError::InvalidNumber {
            shape: shape.to_string(),
            attribute,
            value: value.to_string(),
        })
    };
    Ok(BoundingBox::new(
        number("x")?,
        number("y")?,
        number("width")?,
        number("height")?,
    ))
}
