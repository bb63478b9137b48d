//! CSS unit and number formatting shared by the transformers.

/// Pixel rounding with a small positive bias so values sitting on a `.5`
/// boundary from float noise round consistently upward.
pub fn pixel_round(value: f64) -> f64 {
    (value + 1e-6).round()
}

/// Format a number the way CSS expects: no trailing zeros, at most two
/// decimal places.
pub fn fmt_num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let text = format!("{rounded:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

pub fn px(value: f64) -> String {
    format!("{}px", fmt_num(pixel_round(value)))
}

pub fn em(value: f64) -> String {
    format!("{}em", fmt_num(value))
}

pub fn percent(value: f64) -> String {
    format!("{}%", fmt_num(value))
}

/// Round to two decimals, for opacities and ratios.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Collapse four edge values into the shortest CSS shorthand.
pub fn css_shorthand(top: f64, right: f64, bottom: f64, left: f64) -> String {
    let (t, r, b, l) = (
        fmt_num(pixel_round(top)),
        fmt_num(pixel_round(right)),
        fmt_num(pixel_round(bottom)),
        fmt_num(pixel_round(left)),
    );
    if t == r && r == b && b == l {
        format!("{t}px")
    } else if t == b && r == l {
        format!("{t}px {r}px")
    } else if r == l {
        format!("{t}px {r}px {b}px")
    } else {
        format!("{t}px {r}px {b}px {l}px")
    }
}
