//! Typography translation from Figma's TypeStyle to CSS-flavored terms.

use crate::figma::api_types::RawNode;

use super::types::TextStyle;
use super::units::{em, percent};

/// Build the simplified text style, or nothing when the node carries no
/// typography worth emitting.
pub fn build_text_style(node: &RawNode) -> Option<TextStyle> {
    let style = node.style.as_ref()?;

    let mut out = TextStyle {
        font_family: style.font_family.clone(),
        font_weight: style.font_weight.map(|w| w.round() as u32),
        font_size: style.font_size,
        text_case: style.text_case.clone(),
        text_align_horizontal: style.text_align_horizontal.clone(),
        text_align_vertical: style.text_align_vertical.clone(),
        ..Default::default()
    };

    if let (Some(line_px), Some(size)) = (style.line_height_px, style.font_size) {
        if size > 0.0 {
            out.line_height = Some(em(line_px / size));
        }
    }

    if let (Some(spacing), Some(size)) = (style.letter_spacing, style.font_size) {
        if spacing != 0.0 && size > 0.0 {
            out.letter_spacing = Some(percent(spacing / size * 100.0));
        }
    }

    if out == TextStyle::default() {
        None
    } else {
        Some(out)
    }
}
