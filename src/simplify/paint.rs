//! Fill and stroke translation.

use crate::figma::api_types::{Paint, RawNode};

use super::types::{GradientFill, GradientStop, ImageFill, SimplifiedFill, SimplifiedStroke, SolidFill};
use super::units::{css_shorthand, fmt_num, pixel_round, round2};

/// Translate the visible paints of a fill list.
pub fn build_fills(paints: &[Paint]) -> Vec<SimplifiedFill> {
    paints
        .iter()
        .filter(|paint| paint.is_visible())
        .filter_map(convert_paint)
        .collect()
}

/// Translate one paint, or nothing when it is malformed for its kind.
pub fn convert_paint(paint: &Paint) -> Option<SimplifiedFill> {
    match paint.paint_type.as_str() {
        "SOLID" => {
            let color = paint.color.as_ref()?;
            let opacity = round2(color.a * paint.opacity.unwrap_or(1.0));
            let hex = color.to_hex();
            if opacity >= 1.0 {
                // Full-opacity solids collapse to a plain CSS color.
                Some(SimplifiedFill::Css(hex))
            } else {
                Some(SimplifiedFill::Solid(SolidFill {
                    fill_type: "SOLID".to_string(),
                    hex,
                    opacity,
                }))
            }
        }
        "IMAGE" => {
            let image_ref = paint.image_ref.clone()?;
            Some(SimplifiedFill::Image(ImageFill {
                fill_type: "IMAGE".to_string(),
                image_ref,
                scale_mode: paint.scale_mode.clone(),
            }))
        }
        kind if kind.starts_with("GRADIENT") => {
            let stops = paint
                .gradient_stops
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|stop| GradientStop {
                    position: round2(stop.position),
                    hex: stop.color.to_hex(),
                    opacity: round2(stop.color.a * paint.opacity.unwrap_or(1.0)),
                })
                .collect();
            Some(SimplifiedFill::Gradient(GradientFill {
                fill_type: kind.to_string(),
                gradient_handle_positions: paint
                    .gradient_handle_positions
                    .clone()
                    .unwrap_or_default(),
                gradient_stops: stops,
            }))
        }
        _ => None,
    }
}

/// Translate strokes: visible paints plus weight and dash pattern.
pub fn build_strokes(node: &RawNode) -> Option<SimplifiedStroke> {
    let colors = build_fills(&node.strokes);
    let stroke_weight = stroke_weight_string(node);
    let stroke_dashes = node
        .stroke_dashes
        .as_ref()
        .filter(|dashes| !dashes.is_empty())
        .cloned();

    if colors.is_empty() && stroke_weight.is_none() && stroke_dashes.is_none() {
        return None;
    }

    Some(SimplifiedStroke {
        colors,
        stroke_weight,
        stroke_dashes,
    })
}

fn stroke_weight_string(node: &RawNode) -> Option<String> {
    if let Some(weights) = &node.individual_stroke_weights {
        return Some(css_shorthand(
            weights.top,
            weights.right,
            weights.bottom,
            weights.left,
        ));
    }
    match node.stroke_weight {
        Some(weight) if weight > 0.0 => Some(format!("{}px", fmt_num(pixel_round(weight)))),
        _ => None,
    }
}
