//! Effect translation into CSS shadow and filter strings.

use crate::figma::api_types::{Color, Effect};

use super::types::SimplifiedEffects;
use super::units::{fmt_num, round2};

/// Compose visible effects into CSS strings, or nothing when no visible
/// effect contributes.
pub fn build_effects(effects: &[Effect]) -> Option<SimplifiedEffects> {
    let mut shadows: Vec<String> = Vec::new();
    let mut blurs: Vec<String> = Vec::new();
    let mut backdrop_blurs: Vec<String> = Vec::new();

    for effect in effects.iter().filter(|e| e.is_visible()) {
        match effect.effect_type.as_str() {
            "DROP_SHADOW" => shadows.push(shadow_string(effect, false)),
            "INNER_SHADOW" => shadows.push(shadow_string(effect, true)),
            "LAYER_BLUR" => blurs.push(blur_string(effect)),
            "BACKGROUND_BLUR" => backdrop_blurs.push(blur_string(effect)),
            _ => {}
        }
    }

    if shadows.is_empty() && blurs.is_empty() && backdrop_blurs.is_empty() {
        return None;
    }

    Some(SimplifiedEffects {
        box_shadow: join_nonempty(shadows, ", "),
        filter: join_nonempty(blurs, " "),
        backdrop_filter: join_nonempty(backdrop_blurs, " "),
    })
}

fn join_nonempty(parts: Vec<String>, separator: &str) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(separator))
    }
}

fn shadow_string(effect: &Effect, inset: bool) -> String {
    let offset = effect.offset.unwrap_or(crate::figma::api_types::Vector { x: 0.0, y: 0.0 });
    let radius = effect.radius.unwrap_or(0.0);
    let spread = effect.spread.unwrap_or(0.0);
    let color = effect.color.unwrap_or(Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    });

    let body = format!(
        "{}px {}px {}px {}px {}",
        fmt_num(offset.x),
        fmt_num(offset.y),
        fmt_num(radius),
        fmt_num(spread),
        rgba_string(&color)
    );
    if inset {
        format!("inset {body}")
    } else {
        body
    }
}

fn blur_string(effect: &Effect) -> String {
    format!("blur({}px)", fmt_num(effect.radius.unwrap_or(0.0)))
}

fn rgba_string(color: &Color) -> String {
    let r = (color.r * 255.0).round() as u32;
    let g = (color.g * 255.0).round() as u32;
    let b = (color.b * 255.0).round() as u32;
    format!("rgba({r}, {g}, {b}, {})", fmt_num(round2(color.a)))
}
