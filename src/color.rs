use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.75, 0.55))
        .collect()
}

/// Sequential scale from pale to saturated, for ordered classes such as wind
/// speed bins.
pub fn sequential_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 1.0 };
            hsl_to_color32(200.0 - 160.0 * t, 0.7, 0.75 - 0.35 * t)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Correlation scale: -1 → blue, 0 → white, +1 → red
// ---------------------------------------------------------------------------

const NEGATIVE_HUE: f32 = 225.0;
const POSITIVE_HUE: f32 = 5.0;

/// Heatmap cell colour for a correlation coefficient. Undefined cells are grey.
pub fn correlation_color(r: Option<f64>) -> Color32 {
    let Some(r) = r else {
        return Color32::GRAY;
    };
    let r = r.clamp(-1.0, 1.0) as f32;
    let hue = if r < 0.0 { NEGATIVE_HUE } else { POSITIVE_HUE };
    hsl_to_color32(hue, 0.7, 1.0 - 0.5 * r.abs())
}

/// Readable text colour on top of a correlation cell.
pub fn correlation_text_color(r: Option<f64>) -> Color32 {
    match r {
        Some(r) if r.abs() > 0.6 => Color32::WHITE,
        _ => Color32::BLACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palettes_have_requested_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(4).len(), 4);
        let seq = sequential_palette(5);
        assert_eq!(seq.len(), 5);
        assert_ne!(seq[0], seq[4]);
    }

    #[test]
    fn correlation_scale_is_diverging() {
        let pos = correlation_color(Some(1.0));
        let neg = correlation_color(Some(-1.0));
        assert!(pos.r() > pos.b());
        assert!(neg.b() > neg.r());
        assert_eq!(correlation_color(Some(0.0)), Color32::from_rgb(255, 255, 255));
        assert_eq!(correlation_color(None), Color32::GRAY);
        assert_eq!(correlation_text_color(Some(-0.9)), Color32::WHITE);
    }
}
