use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Diverging colour scale for correlation coefficients
// ---------------------------------------------------------------------------

const NEGATIVE_HUE: f32 = 220.0;
const POSITIVE_HUE: f32 = 0.0;
const MISSING: [u8; 3] = [160, 160, 160];

/// Map a coefficient in [-1, 1] to an sRGB triple: blue for negative,
/// white at zero, red for positive. Non-finite values are gray.
pub fn diverging_rgb(value: f64) -> [u8; 3] {
    if !value.is_finite() {
        return MISSING;
    }
    let strength = value.clamp(-1.0, 1.0).abs() as f32;
    let hue = if value < 0.0 { NEGATIVE_HUE } else { POSITIVE_HUE };
    // Lightness runs from white (1.0) down to a saturated mid tone.
    let hsl = Hsl::new(hue, 0.75, 1.0 - 0.5 * strength);
    let rgb: Srgb = hsl.into_color();
    [
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    ]
}

/// [`diverging_rgb`] as an egui colour.
pub fn diverging_color(value: f64) -> Color32 {
    let [r, g, b] = diverging_rgb(value);
    Color32::from_rgb(r, g, b)
}

/// Readable text colour on top of a cell of the given coefficient.
pub fn label_color(value: f64) -> Color32 {
    if value.is_finite() && value.abs() > 0.6 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}
