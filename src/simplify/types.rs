//! Simplified design schema emitted to agents.
//!
//! This is the compact counterpart of the raw Figma graph: a tree of
//! [`SimplifiedNode`]s whose style slots either reference an entry in
//! [`GlobalVars`] or carry the style inline after low-usage inlining.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::figma::api_types::Vector;

pub type StyleId = String;

/// A style slot: either a reference into `globalVars.styles` or the literal
/// value after inlining. Exactly one arm is ever present; a reference always
/// resolves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StyleSlot {
    Reference(StyleId),
    Inline(Box<StyleValue>),
}

impl StyleSlot {
    pub fn reference(&self) -> Option<&str> {
        match self {
            StyleSlot::Reference(id) => Some(id),
            StyleSlot::Inline(_) => None,
        }
    }
}

/// Any value the interner can hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StyleValue {
    Text(TextStyle),
    Fills(Vec<SimplifiedFill>),
    Stroke(SimplifiedStroke),
    Effects(SimplifiedEffects),
    Layout(Layout),
}

/// Typography in CSS-flavored units.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Line height relative to font size, e.g. `"1.5em"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<String>,
    /// Letter spacing as a percentage of font size, e.g. `"2%"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align_horizontal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align_vertical: Option<String>,
}

/// A single simplified paint.
///
/// A solid paint at full opacity collapses to its CSS hex string; everything
/// else keeps a discriminated object form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SimplifiedFill {
    Css(String),
    Solid(SolidFill),
    Image(ImageFill),
    Gradient(GradientFill),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolidFill {
    #[serde(rename = "type")]
    pub fill_type: String,
    pub hex: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFill {
    #[serde(rename = "type")]
    pub fill_type: String,
    pub image_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientFill {
    /// Original gradient kind, e.g. `GRADIENT_LINEAR`.
    #[serde(rename = "type")]
    pub fill_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gradient_handle_positions: Vec<Vector>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gradient_stops: Vec<GradientStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientStop {
    pub position: f64,
    pub hex: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedStroke {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<SimplifiedFill>,
    /// `"2px"` for a uniform weight, CSS shorthand for per-edge weights.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_dashes: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedEffects {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_filter: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    None,
    Row,
    Column,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sizing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

/// CSS-flavored layout description.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub mode: LayoutMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justify_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_items: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_self: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizing: Option<Sizing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_relative_to_parent: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow_scroll: Option<Vec<String>>,
}

impl Layout {
    /// True when the layout equals the empty default: `none` mode and no
    /// other property set.
    pub fn is_vacant(&self) -> bool {
        *self == Layout::default()
    }
}

/// Normalized `{name, value, type}` triple from an INSTANCE's component
/// properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentPropertyEntry {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub property_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_properties: Option<Vec<ComponentPropertyEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_style: Option<StyleSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fills: Option<StyleSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strokes: Option<StyleSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<StyleSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<StyleSlot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SimplifiedNode>,
}

impl SimplifiedNode {
    pub fn new(id: &str, name: &str, node_type: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            node_type: node_type.to_string(),
            ..Default::default()
        }
    }

    /// All style slots of this node, for finalize-time rewriting.
    pub fn style_slots_mut(&mut self) -> impl Iterator<Item = &mut StyleSlot> {
        [
            &mut self.text_style,
            &mut self.fills,
            &mut self.strokes,
            &mut self.effects,
            &mut self.layout,
        ]
        .into_iter()
        .flatten()
    }

    pub fn style_slots(&self) -> impl Iterator<Item = &StyleSlot> {
        [
            &self.text_style,
            &self.fills,
            &self.strokes,
            &self.effects,
            &self.layout,
        ]
        .into_iter()
        .flatten()
    }
}

/// Flat style table keyed by generated [`StyleId`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalVars {
    pub styles: BTreeMap<StyleId, StyleValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    pub id: String,
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_set_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSetSummary {
    pub id: String,
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fully simplified design, frozen on emission.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedDesign {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub nodes: Vec<SimplifiedNode>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, ComponentSummary>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub component_sets: BTreeMap<String, ComponentSetSummary>,
    pub global_vars: GlobalVars,
}

/// Tool payload shape: everything except the trees under `metadata`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignPayload {
    pub metadata: DesignMetadata,
    pub nodes: Vec<SimplifiedNode>,
    pub global_vars: GlobalVars,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, ComponentSummary>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub component_sets: BTreeMap<String, ComponentSetSummary>,
}

impl SimplifiedDesign {
    pub fn into_payload(self) -> DesignPayload {
        DesignPayload {
            metadata: DesignMetadata {
                name: self.name,
                last_modified: self.last_modified,
                thumbnail_url: self.thumbnail_url,
                components: self.components,
                component_sets: self.component_sets,
            },
            nodes: self.nodes,
            global_vars: self.global_vars,
        }
    }
}
