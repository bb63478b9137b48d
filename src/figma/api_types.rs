//! Figma REST API response types.
//!
//! The upstream schema is large and loosely specified; everything beyond
//! `id`, `name` and `type` is optional here, and unknown fields are ignored.
//! Enum-like upstream fields (layout modes, alignments, paint kinds) stay as
//! strings so a schema drift upstream degrades to "no value" in the
//! transformers instead of a deserialization failure.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A raw node of the Figma document graph.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub visible: Option<bool>,
    pub children: Vec<RawNode>,

    // Geometry
    pub absolute_bounding_box: Option<Rect>,
    pub preserve_ratio: Option<bool>,

    // Visuals
    pub opacity: Option<f64>,
    pub corner_radius: Option<f64>,
    pub rectangle_corner_radii: Option<Vec<f64>>,
    pub fills: Vec<Paint>,
    pub strokes: Vec<Paint>,
    pub stroke_weight: Option<f64>,
    pub individual_stroke_weights: Option<StrokeWeights>,
    pub stroke_dashes: Option<Vec<f64>>,
    pub effects: Vec<Effect>,

    // Text
    pub characters: Option<String>,
    pub style: Option<TypeStyle>,

    // Auto-layout
    pub layout_mode: Option<String>,
    pub layout_wrap: Option<String>,
    pub primary_axis_align_items: Option<String>,
    pub counter_axis_align_items: Option<String>,
    pub layout_align: Option<String>,
    pub layout_grow: Option<f64>,
    pub layout_sizing_horizontal: Option<String>,
    pub layout_sizing_vertical: Option<String>,
    pub layout_positioning: Option<String>,
    pub item_spacing: Option<f64>,
    pub padding_left: Option<f64>,
    pub padding_right: Option<f64>,
    pub padding_top: Option<f64>,
    pub padding_bottom: Option<f64>,
    pub overflow_direction: Option<String>,

    // Instances
    pub component_id: Option<String>,
    pub component_properties: Option<HashMap<String, ComponentProperty>>,
}

impl RawNode {
    /// Figma omits `visible` for visible nodes.
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }

    pub fn is_auto_layout(&self) -> bool {
        matches!(self.layout_mode.as_deref(), Some("HORIZONTAL" | "VERTICAL"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

/// RGBA color, channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "default_alpha")]
    pub a: f64,
}

fn default_alpha() -> f64 {
    1.0
}

impl Color {
    /// Hex form `#RRGGBB`, uppercase, alpha dropped.
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round().clamp(0.0, 255.0) as u32;
        let g = (self.g * 255.0).round().clamp(0.0, 255.0) as u32;
        let b = (self.b * 255.0).round().clamp(0.0, 255.0) as u32;
        format!("#{:06X}", (r << 16) | (g << 8) | b)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Paint {
    #[serde(rename = "type")]
    pub paint_type: String,
    pub visible: Option<bool>,
    pub opacity: Option<f64>,
    pub color: Option<Color>,
    pub image_ref: Option<String>,
    pub scale_mode: Option<String>,
    pub gradient_handle_positions: Option<Vec<Vector>>,
    pub gradient_stops: Option<Vec<ColorStop>>,
}

impl Paint {
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorStop {
    pub position: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Effect {
    #[serde(rename = "type")]
    pub effect_type: String,
    pub visible: Option<bool>,
    pub radius: Option<f64>,
    pub spread: Option<f64>,
    pub color: Option<Color>,
    pub offset: Option<Vector>,
}

impl Effect {
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeWeights {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Typography attributes attached to TEXT nodes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeStyle {
    pub font_family: Option<String>,
    pub font_weight: Option<f64>,
    pub font_size: Option<f64>,
    pub line_height_px: Option<f64>,
    pub letter_spacing: Option<f64>,
    pub text_case: Option<String>,
    pub text_align_horizontal: Option<String>,
    pub text_align_vertical: Option<String>,
}

/// One entry of an INSTANCE node's `componentProperties` map.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProperty {
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(rename = "type", default)]
    pub property_type: String,
}

/// Component metadata attached at the response (not node) level.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDef {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_set_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSetDef {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `GET /v1/files/{key}` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub name: String,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub document: RawNode,
    #[serde(default)]
    pub components: HashMap<String, ComponentDef>,
    #[serde(default)]
    pub component_sets: HashMap<String, ComponentSetDef>,
}

/// `GET /v1/files/{key}/nodes` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodesResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub nodes: HashMap<String, NodeEntry>,
}

/// Per-node wrapper inside a nodes response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEntry {
    pub document: RawNode,
    #[serde(default)]
    pub components: HashMap<String, ComponentDef>,
    #[serde(default)]
    pub component_sets: HashMap<String, ComponentSetDef>,
}

/// Either upstream response shape, as handed to the simplifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawResponse {
    File(FileResponse),
    Nodes(NodesResponse),
}

/// `GET /v1/files/{key}/images` response (image-fill URL table).
#[derive(Debug, Clone, Deserialize)]
pub struct ImageFillsResponse {
    #[serde(default)]
    pub meta: ImageFillsMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageFillsMeta {
    #[serde(default)]
    pub images: HashMap<String, String>,
}

/// `GET /v1/images/{key}` response (render export URL table).
#[derive(Debug, Clone, Deserialize)]
pub struct ImageRenderResponse {
    #[serde(default)]
    pub images: HashMap<String, Option<String>>,
    #[serde(default)]
    pub err: Option<String>,
}
