//! Heat values to colors.
//!
//! A heat value `v` in `[0, 1]` maps to hue `(1 - v) * 240`: 0 is blue,
//! 1 is red, and hue decreases monotonically in between. Saturation and
//! lightness are fixed at 100% and 50%.

use std::fmt;

/// A CSS `hsl()` color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Degrees, `0.0..=360.0`.
    pub hue: f64,
    /// Percent.
    pub saturation: u8,
    /// Percent.
    pub lightness: u8,
}

impl Hsl {
    #[must_use]
    pub const fn new(hue: f64, saturation: u8, lightness: u8) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Heat map color for `value`. Values outside `[0, 1]` are clamped and
/// NaN counts as 0.
#[must_use]
pub fn heat_color(value: f64) -> Hsl {
    let v = if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    };
    Hsl::new((1.0 - v) * 240.0, 100, 50)
}

/// CSS color for a decoration: an explicit color wins, otherwise the heat
/// value is mapped. `None` means the decoration gets no class.
#[must_use]
pub fn resolve_color(color: Option<&str>, heat: Option<f64>) -> Option<String> {
    match (color, heat) {
        (Some(color), _) if !color.is_empty() => Some(color.to_owned()),
        (_, Some(heat)) => Some(heat_color(heat).to_string()),
        _ => None,
    }
}
