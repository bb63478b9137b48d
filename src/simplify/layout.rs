//! Auto-layout translation into CSS flexbox vocabulary.
//!
//! The transformer emits the full semantic layout (alignment, sizing,
//! dimensions, positioning); the traversal in `simplify::parse_node` filters
//! that down before interning.

use crate::figma::api_types::RawNode;

use super::types::{Dimensions, Layout, LayoutMode, Location, Sizing};
use super::units::{css_shorthand, pixel_round, px, round2};

/// Build the semantic layout for `node` inside `parent`, or nothing when the
/// node carries no layout information at all.
pub fn build_layout(node: &RawNode, parent: Option<&RawNode>) -> Option<Layout> {
    let mode = match node.layout_mode.as_deref() {
        Some("HORIZONTAL") => LayoutMode::Row,
        Some("VERTICAL") => LayoutMode::Column,
        _ => LayoutMode::None,
    };

    let mut layout = Layout {
        mode,
        ..Default::default()
    };

    if mode != LayoutMode::None {
        layout.justify_content = convert_alignment(node.primary_axis_align_items.as_deref());
        layout.align_items = convert_alignment(node.counter_axis_align_items.as_deref());
        if children_fill_counter_axis(node, mode) {
            layout.align_items = Some("stretch".to_string());
        }
        if node.layout_wrap.as_deref() == Some("WRAP") {
            layout.wrap = Some(true);
        }
        if let Some(spacing) = node.item_spacing {
            if spacing != 0.0 {
                layout.gap = Some(px(spacing));
            }
        }
        layout.padding = padding_shorthand(node);
    }

    layout.align_self = match node.layout_align.as_deref() {
        Some("STRETCH") => Some("stretch".to_string()),
        Some("MAX") => Some("flex-end".to_string()),
        Some("CENTER") => Some("center".to_string()),
        _ => None,
    };

    if node.layout_positioning.as_deref() == Some("ABSOLUTE") {
        layout.position = Some("absolute".to_string());
    }

    layout.sizing = build_sizing(node);
    layout.dimensions = build_dimensions(node, parent, mode);
    layout.location_relative_to_parent = build_location(node, parent);
    layout.overflow_scroll = convert_overflow(node.overflow_direction.as_deref());

    if layout.is_vacant() {
        None
    } else {
        Some(layout)
    }
}

/// Keep only the properties the interner deduplicates on: mode, alignment,
/// gap, padding and wrap. Discards the layout entirely when nothing but a
/// `none` mode survives.
pub fn filter_for_interning(layout: &Layout) -> Option<Layout> {
    let filtered = Layout {
        mode: layout.mode,
        justify_content: layout.justify_content.clone(),
        align_items: layout.align_items.clone(),
        gap: layout.gap.clone(),
        padding: layout.padding.clone(),
        wrap: layout.wrap,
        ..Default::default()
    };

    if filtered.mode == LayoutMode::None && filtered.is_vacant() {
        None
    } else {
        Some(filtered)
    }
}

fn convert_alignment(value: Option<&str>) -> Option<String> {
    match value {
        // MIN is the flex default; omitting it keeps the output lean.
        Some("MAX") => Some("flex-end".to_string()),
        Some("CENTER") => Some("center".to_string()),
        Some("SPACE_BETWEEN") => Some("space-between".to_string()),
        Some("BASELINE") => Some("baseline".to_string()),
        _ => None,
    }
}

/// Counter-axis stretch upgrade: every child either absolutely positioned or
/// filling the counter axis means the container behaves as `align-items:
/// stretch` regardless of its declared alignment.
fn children_fill_counter_axis(node: &RawNode, mode: LayoutMode) -> bool {
    if node.children.is_empty() {
        return false;
    }
    node.children.iter().all(|child| {
        if child.layout_positioning.as_deref() == Some("ABSOLUTE") {
            return true;
        }
        let sizing = match mode {
            LayoutMode::Row => child.layout_sizing_vertical.as_deref(),
            LayoutMode::Column => child.layout_sizing_horizontal.as_deref(),
            LayoutMode::None => None,
        };
        sizing == Some("FILL")
    })
}

fn padding_shorthand(node: &RawNode) -> Option<String> {
    let top = node.padding_top.unwrap_or(0.0);
    let right = node.padding_right.unwrap_or(0.0);
    let bottom = node.padding_bottom.unwrap_or(0.0);
    let left = node.padding_left.unwrap_or(0.0);
    if top == 0.0 && right == 0.0 && bottom == 0.0 && left == 0.0 {
        return None;
    }
    Some(css_shorthand(top, right, bottom, left))
}

fn build_sizing(node: &RawNode) -> Option<Sizing> {
    let sizing = Sizing {
        horizontal: convert_sizing(node.layout_sizing_horizontal.as_deref()),
        vertical: convert_sizing(node.layout_sizing_vertical.as_deref()),
    };
    if sizing == Sizing::default() {
        None
    } else {
        Some(sizing)
    }
}

fn convert_sizing(value: Option<&str>) -> Option<String> {
    match value {
        Some("FIXED") => Some("fixed".to_string()),
        Some("FILL") => Some("fill".to_string()),
        Some("HUG") => Some("hug".to_string()),
        _ => None,
    }
}

fn build_dimensions(node: &RawNode, parent: Option<&RawNode>, mode: LayoutMode) -> Option<Dimensions> {
    let bbox = node.absolute_bounding_box?;
    let absolute = node.layout_positioning.as_deref() == Some("ABSOLUTE");
    let in_flow = parent.map(|p| p.is_auto_layout()).unwrap_or(false) && !absolute;
    let no_grow = node.layout_grow.unwrap_or(0.0) == 0.0;

    let fixed_on = |sizing: Option<&str>| sizing == Some("FIXED") && no_grow;

    let include_width =
        !in_flow || fixed_on(node.layout_sizing_horizontal.as_deref());
    let include_height =
        !in_flow || fixed_on(node.layout_sizing_vertical.as_deref());

    let mut dimensions = Dimensions {
        width: include_width.then(|| pixel_round(bbox.width)),
        height: include_height.then(|| pixel_round(bbox.height)),
        aspect_ratio: None,
    };

    if node.preserve_ratio == Some(true)
        && mode == LayoutMode::Column
        && bbox.height > 0.0
        && dimensions.width.is_some()
        && dimensions.height.is_some()
    {
        dimensions.aspect_ratio = Some(round2(bbox.width / bbox.height));
    }

    if dimensions == Dimensions::default() {
        None
    } else {
        Some(dimensions)
    }
}

fn build_location(node: &RawNode, parent: Option<&RawNode>) -> Option<Location> {
    let parent = parent?;
    let absolute = node.layout_positioning.as_deref() == Some("ABSOLUTE");
    if parent.is_auto_layout() && !absolute {
        return None;
    }
    let child_box = node.absolute_bounding_box?;
    let parent_box = parent.absolute_bounding_box?;
    Some(Location {
        x: pixel_round(child_box.x - parent_box.x),
        y: pixel_round(child_box.y - parent_box.y),
    })
}

fn convert_overflow(value: Option<&str>) -> Option<Vec<String>> {
    match value {
        Some("HORIZONTAL_SCROLLING") => Some(vec!["x".to_string()]),
        Some("VERTICAL_SCROLLING") => Some(vec!["y".to_string()]),
        Some("HORIZONTAL_AND_VERTICAL_SCROLLING") => {
            Some(vec!["x".to_string(), "y".to_string()])
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figma::api_types::Rect;

    fn auto_frame(mode: &str) -> RawNode {
        RawNode {
            id: "1:1".to_string(),
            name: "Frame".to_string(),
            node_type: "FRAME".to_string(),
            layout_mode: Some(mode.to_string()),
            ..Default::default()
        }
    }

    fn with_bbox(mut node: RawNode, x: f64, y: f64, w: f64, h: f64) -> RawNode {
        node.absolute_bounding_box = Some(Rect {
            x,
            y,
            width: w,
            height: h,
        });
        node
    }

    #[test]
    fn horizontal_auto_layout_becomes_row() {
        let mut node = auto_frame("HORIZONTAL");
        node.primary_axis_align_items = Some("SPACE_BETWEEN".to_string());
        node.counter_axis_align_items = Some("CENTER".to_string());
        node.item_spacing = Some(8.0);

        let layout = build_layout(&node, None).unwrap();
        assert_eq!(layout.mode, LayoutMode::Row);
        assert_eq!(layout.justify_content.as_deref(), Some("space-between"));
        assert_eq!(layout.align_items.as_deref(), Some("center"));
        assert_eq!(layout.gap.as_deref(), Some("8px"));
    }

    #[test]
    fn min_alignment_is_omitted_as_flex_default() {
        let mut node = auto_frame("VERTICAL");
        node.primary_axis_align_items = Some("MIN".to_string());
        let layout = build_layout(&node, None).unwrap();
        assert!(layout.justify_content.is_none());
    }

    #[test]
    fn filling_children_upgrade_align_items_to_stretch() {
        let mut node = auto_frame("HORIZONTAL");
        node.counter_axis_align_items = Some("MIN".to_string());
        node.children = vec![
            RawNode {
                layout_sizing_vertical: Some("FILL".to_string()),
                ..Default::default()
            },
            RawNode {
                layout_positioning: Some("ABSOLUTE".to_string()),
                ..Default::default()
            },
        ];

        let layout = build_layout(&node, None).unwrap();
        assert_eq!(layout.align_items.as_deref(), Some("stretch"));
    }

    #[test]
    fn one_hugging_child_blocks_stretch_upgrade() {
        let mut node = auto_frame("HORIZONTAL");
        node.children = vec![
            RawNode {
                layout_sizing_vertical: Some("FILL".to_string()),
                ..Default::default()
            },
            RawNode {
                layout_sizing_vertical: Some("HUG".to_string()),
                ..Default::default()
            },
        ];

        let layout = build_layout(&node, None).unwrap();
        assert!(layout.align_items.is_none());
    }

    #[test]
    fn padding_collapses_to_shorthand() {
        let mut node = auto_frame("VERTICAL");
        node.padding_top = Some(8.0);
        node.padding_bottom = Some(8.0);
        node.padding_left = Some(16.0);
        node.padding_right = Some(16.0);

        let layout = build_layout(&node, None).unwrap();
        assert_eq!(layout.padding.as_deref(), Some("8px 16px"));
    }

    #[test]
    fn non_layout_node_without_attributes_yields_no_value() {
        let node = RawNode {
            id: "1:1".to_string(),
            name: "Box".to_string(),
            node_type: "RECTANGLE".to_string(),
            ..Default::default()
        };
        assert!(build_layout(&node, None).is_none());
    }

    #[test]
    fn none_mode_still_forwards_dimensions_and_position() {
        let parent = with_bbox(
            RawNode {
                node_type: "FRAME".to_string(),
                ..Default::default()
            },
            100.0,
            100.0,
            800.0,
            600.0,
        );
        let node = with_bbox(
            RawNode {
                node_type: "RECTANGLE".to_string(),
                ..Default::default()
            },
            140.0,
            120.0,
            200.0,
            100.0,
        );

        let layout = build_layout(&node, Some(&parent)).unwrap();
        assert_eq!(layout.mode, LayoutMode::None);
        let dims = layout.dimensions.unwrap();
        assert_eq!(dims.width, Some(200.0));
        assert_eq!(dims.height, Some(100.0));
        let location = layout.location_relative_to_parent.unwrap();
        assert_eq!(location.x, 40.0);
        assert_eq!(location.y, 20.0);
    }

    #[test]
    fn flow_children_omit_grow_axis_dimensions() {
        let parent = auto_frame("HORIZONTAL");
        let node = with_bbox(
            RawNode {
                node_type: "FRAME".to_string(),
                layout_sizing_horizontal: Some("FILL".to_string()),
                layout_sizing_vertical: Some("FIXED".to_string()),
                ..Default::default()
            },
            0.0,
            0.0,
            320.0,
            48.0,
        );

        let layout = build_layout(&node, Some(&parent)).unwrap();
        let dims = layout.dimensions.unwrap();
        assert!(dims.width.is_none(), "fill-sized axis must not emit width");
        assert_eq!(dims.height, Some(48.0));
    }

    #[test]
    fn flow_children_omit_location_and_fluid_dimensions() {
        let parent = with_bbox(auto_frame("VERTICAL"), 0.0, 0.0, 400.0, 400.0);
        let node = with_bbox(RawNode::default(), 10.0, 10.0, 50.0, 50.0);
        // In-flow, no fixed sizing, no position: nothing survives at all.
        assert!(build_layout(&node, Some(&parent)).is_none());
    }

    #[test]
    fn absolute_children_keep_location_inside_auto_layout() {
        let parent = with_bbox(auto_frame("VERTICAL"), 0.0, 0.0, 400.0, 400.0);
        let node = with_bbox(
            RawNode {
                layout_positioning: Some("ABSOLUTE".to_string()),
                ..Default::default()
            },
            25.0,
            30.0,
            50.0,
            50.0,
        );

        let layout = build_layout(&node, Some(&parent)).unwrap();
        assert_eq!(layout.position.as_deref(), Some("absolute"));
        let location = layout.location_relative_to_parent.unwrap();
        assert_eq!(location.x, 25.0);
        assert_eq!(location.y, 30.0);
    }

    #[test]
    fn preserve_ratio_on_column_emits_aspect_ratio() {
        let mut node = with_bbox(auto_frame("VERTICAL"), 0.0, 0.0, 400.0, 200.0);
        node.preserve_ratio = Some(true);

        let layout = build_layout(&node, None).unwrap();
        assert_eq!(layout.dimensions.unwrap().aspect_ratio, Some(2.0));
    }

    #[test]
    fn overflow_flags_map_to_scroll_axes() {
        let mut node = auto_frame("VERTICAL");
        node.overflow_direction = Some("HORIZONTAL_AND_VERTICAL_SCROLLING".to_string());
        let layout = build_layout(&node, None).unwrap();
        assert_eq!(
            layout.overflow_scroll,
            Some(vec!["x".to_string(), "y".to_string()])
        );
    }

    #[test]
    fn interning_filter_drops_geometry_and_keeps_flex_core() {
        let full = Layout {
            mode: LayoutMode::Row,
            justify_content: Some("center".to_string()),
            gap: Some("8px".to_string()),
            dimensions: Some(Dimensions {
                width: Some(100.0),
                ..Default::default()
            }),
            position: Some("absolute".to_string()),
            ..Default::default()
        };

        let filtered = filter_for_interning(&full).unwrap();
        assert_eq!(filtered.mode, LayoutMode::Row);
        assert_eq!(filtered.justify_content.as_deref(), Some("center"));
        assert!(filtered.dimensions.is_none());
        assert!(filtered.position.is_none());
    }

    #[test]
    fn interning_filter_discards_vacant_none_layouts() {
        let geometry_only = Layout {
            mode: LayoutMode::None,
            dimensions: Some(Dimensions {
                width: Some(10.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(filter_for_interning(&geometry_only).is_none());

        let with_padding = Layout {
            mode: LayoutMode::None,
            padding: Some("8px".to_string()),
            ..Default::default()
        };
        assert!(filter_for_interning(&with_padding).is_some());
    }
}
