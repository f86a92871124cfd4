use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::audio::compare::Verdict;
use crate::state::TrackId;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues,
/// starting at `hue_offset` degrees.
pub fn generate_palette(n: usize, hue_offset: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = hue_offset + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Spectrum line colour for a track slot; the two slots sit on opposite hues.
pub fn track_color(id: TrackId) -> Color32 {
    generate_palette(TrackId::ALL.len(), 210.0)[id.index()]
}

// ---------------------------------------------------------------------------
// Comparison highlighting
// ---------------------------------------------------------------------------

pub const FAVORABLE_FILL: Color32 = Color32::from_rgb(200, 255, 200);
pub const UNFAVORABLE_FILL: Color32 = Color32::from_rgb(255, 200, 200);

/// Background behind a highlighted property value.
pub fn highlight_fill(verdict: Verdict) -> Color32 {
    match verdict {
        Verdict::Favorable => FAVORABLE_FILL,
        Verdict::Unfavorable => UNFAVORABLE_FILL,
    }
}

/// Text colour that stays readable on top of [`highlight_fill`].
pub const HIGHLIGHT_TEXT: Color32 = Color32::from_rgb(26, 32, 44);
