//! Design-graph simplification engine.
//!
//! Turns a raw Figma response tree into the compact [`SimplifiedDesign`]
//! schema: styles deduplicated through the interner, repetitive table rows
//! collapsed to exemplars, invisible subtrees dropped, depth clamped, and
//! Figma's layout vocabulary translated to CSS terms.

pub mod cleanup;
pub mod effects;
pub mod interner;
pub mod layout;
pub mod paint;
pub mod signature;
pub mod text;
pub mod types;
pub mod units;


pub use cleanup::remove_empty_keys;
pub use interner::{StyleInterner, StylePrefix, INLINE_THRESHOLD};
pub use signature::{content_signature, is_table_container, structure_signature, TableCounter};
pub use types::{
    ComponentPropertyEntry, ComponentSetSummary, ComponentSummary, DesignMetadata, DesignPayload,
    GlobalVars, Layout, LayoutMode, SimplifiedDesign, SimplifiedFill, SimplifiedNode, StyleSlot,
    StyleValue,
};

use std::collections::BTreeMap;

use tracing::debug;

use crate::figma::api_types::{RawNode, RawResponse};

use self::types::StyleId;
use self::units::px;

/// Simplify either upstream response shape.
///
/// `max_depth` is the caller-visible depth budget: nodes past it are
/// replaced by `DEPTH_LIMIT` placeholders. All interner and table state is
/// scoped to this call.
pub fn parse_response(raw: &RawResponse, max_depth: Option<u32>) -> SimplifiedDesign {
    let mut parser = Parser {
        interner: StyleInterner::new(),
        max_depth,
    };

    let mut nodes = Vec::new();
    let mut components = BTreeMap::new();
    let mut component_sets = BTreeMap::new();

    let (name, last_modified, thumbnail_url) = match raw {
        RawResponse::File(file) => {
            for (id, def) in &file.components {
                components.insert(id.clone(), component_summary(id, def));
            }
            for (id, def) in &file.component_sets {
                component_sets.insert(id.clone(), component_set_summary(id, def));
            }
            for child in &file.document.children {
                if let Some(node) = parser.parse_node(child, Some(&file.document), 0) {
                    nodes.push(node);
                }
            }
            (
                file.name.clone(),
                file.last_modified.clone(),
                file.thumbnail_url.clone(),
            )
        }
        RawResponse::Nodes(response) => {
            // Map order from the wire is arbitrary; sort for stable output.
            let mut entries: Vec<_> = response.nodes.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (_, entry) in entries {
                for (id, def) in &entry.components {
                    components.insert(id.clone(), component_summary(id, def));
                }
                for (id, def) in &entry.component_sets {
                    component_sets.insert(id.clone(), component_set_summary(id, def));
                }
                if let Some(node) = parser.parse_node(&entry.document, None, 0) {
                    nodes.push(node);
                }
            }
            (
                response.name.clone().unwrap_or_default(),
                response.last_modified.clone(),
                response.thumbnail_url.clone(),
            )
        }
    };

    let global_vars = parser.interner.finalize(&mut nodes);

    SimplifiedDesign {
        name,
        last_modified,
        thumbnail_url,
        nodes,
        components,
        component_sets,
        global_vars,
    }
}

fn component_summary(id: &str, def: &crate::figma::api_types::ComponentDef) -> ComponentSummary {
    ComponentSummary {
        id: id.to_string(),
        key: def.key.clone(),
        name: def.name.clone(),
        component_set_id: def.component_set_id.clone(),
    }
}

fn component_set_summary(
    id: &str,
    def: &crate::figma::api_types::ComponentSetDef,
) -> ComponentSetSummary {
    ComponentSetSummary {
        id: id.to_string(),
        key: def.key.clone(),
        name: def.name.clone(),
        description: def.description.clone(),
    }
}

struct Parser {
    interner: StyleInterner,
    max_depth: Option<u32>,
}

impl Parser {
    fn parse_node(
        &mut self,
        node: &RawNode,
        parent: Option<&RawNode>,
        depth: u32,
    ) -> Option<SimplifiedNode> {
        if !node.is_visible() {
            return None;
        }

        if let Some(max) = self.max_depth {
            if depth > max {
                debug!(id = %node.id, depth, "depth budget reached");
                return Some(depth_limit_node(node, depth));
            }
        }

        let mut simplified = SimplifiedNode::new(&node.id, &node.name, &node.node_type);

        if node.node_type == "INSTANCE" {
            simplified.component_id = node.component_id.clone();
            simplified.component_properties = component_properties(node);
        }

        if let Some(style) = text::build_text_style(node) {
            simplified.text_style = Some(self.intern(StyleValue::Text(style), StylePrefix::Style));
        }

        let fills = paint::build_fills(&node.fills);
        if !fills.is_empty() {
            simplified.fills = Some(self.intern(StyleValue::Fills(fills), StylePrefix::Fill));
        }

        if let Some(stroke) = paint::build_strokes(node) {
            simplified.strokes = Some(self.intern(StyleValue::Stroke(stroke), StylePrefix::Stroke));
        }

        if let Some(effects) = effects::build_effects(&node.effects) {
            simplified.effects =
                Some(self.intern(StyleValue::Effects(effects), StylePrefix::Effect));
        }

        // The full semantic layout is computed, then narrowed to the
        // dedup-worthy core before it reaches the interner.
        if let Some(full) = layout::build_layout(node, parent) {
            if let Some(filtered) = layout::filter_for_interning(&full) {
                simplified.layout =
                    Some(self.intern(StyleValue::Layout(filtered), StylePrefix::Layout));
            }
        }

        if let Some(opacity) = node.opacity {
            if opacity != 1.0 {
                simplified.opacity = Some(opacity);
            }
        }

        simplified.border_radius = border_radius_string(node);

        if let Some(characters) = &node.characters {
            if !characters.is_empty() {
                simplified.text = Some(characters.clone());
            }
        }

        let is_table = node.children.len() > 3 && is_table_container(node);
        let mut counter = is_table.then(TableCounter::new);
        if is_table {
            debug!(id = %node.id, children = node.children.len(), "table container detected");
        }

        let mut children = Vec::new();
        for child in &node.children {
            if !child.is_visible() {
                continue;
            }

            // Wrapper elision: an INSTANCE wrapping exactly one node is
            // skipped and its content recursed into directly.
            let (target, target_parent) =
                if child.node_type == "INSTANCE" && child.children.len() == 1 {
                    (&child.children[0], child)
                } else {
                    (child, node)
                };

            if !target.is_visible() {
                continue;
            }

            if let Some(counter) = counter.as_mut() {
                if !counter.admit(target) {
                    debug!(id = %target.id, "duplicate row dropped");
                    continue;
                }
            }

            if let Some(parsed) = self.parse_node(target, Some(target_parent), depth + 1) {
                children.push(parsed);
            }
        }

        if let Some(counter) = counter {
            if counter.dropped() > 0 {
                children.push(self.summary_node(counter.dropped()));
            }
        }
        simplified.children = children;

        if node.node_type == "VECTOR" {
            // Downstream agents fetch vectors as SVG exports.
            simplified.node_type = "IMAGE-SVG".to_string();
        }

        Some(simplified)
    }

    fn intern(&mut self, value: StyleValue, prefix: StylePrefix) -> StyleSlot {
        let id: StyleId = self.interner.intern(value, prefix);
        StyleSlot::Reference(id)
    }

    fn summary_node(&mut self, omitted: u32) -> SimplifiedNode {
        SimplifiedNode {
            text: Some(format!("(Omitted {omitted} similar items)")),
            ..SimplifiedNode::new(
                &format!("summary_{}", self.interner.next_short_id()),
                "Repetitive content summary",
                "SUMMARY",
            )
        }
    }
}

fn depth_limit_node(node: &RawNode, depth: u32) -> SimplifiedNode {
    SimplifiedNode {
        text: Some(format!(
            "Subtree truncated at depth {depth}; request node {} directly for full detail",
            node.id
        )),
        ..SimplifiedNode::new(&format!("depth_limit_{}", node.id), &node.name, "DEPTH_LIMIT")
    }
}

fn component_properties(node: &RawNode) -> Option<Vec<ComponentPropertyEntry>> {
    let properties = node.component_properties.as_ref()?;
    if properties.is_empty() {
        return None;
    }

    let mut entries: Vec<ComponentPropertyEntry> = properties
        .iter()
        .map(|(name, property)| ComponentPropertyEntry {
            name: name.clone(),
            value: property_value_string(&property.value),
            property_type: property.property_type.clone(),
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Some(entries)
}

fn property_value_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn border_radius_string(node: &RawNode) -> Option<String> {
    if let Some(radii) = &node.rectangle_corner_radii {
        if radii.len() == 4 && radii.iter().any(|r| *r != 0.0) {
            let parts: Vec<String> = radii.iter().map(|r| px(*r)).collect();
            return Some(parts.join(" "));
        }
    }
    match node.corner_radius {
        Some(radius) if radius > 0.0 => Some(px(radius)),
        _ => None,
    }
}
