//! Light/dark theme and the HSL-based color theme transform.
//!
//! The transform remaps lightness across five bands per direction, tuned so
//! common swatch steps map to a visually analogous step in the opposite
//! theme. It is deliberately not an exact involution; convergence across
//! repeated toggles comes from always converting the authored base color,
//! never the displayed one.

use serde::{Deserialize, Serialize};

/// UI color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

/// HSL color: hue in degrees [0, 360), saturation and lightness in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// Parse a `#rrggbb` or `#rgb` hex string into HSL.
pub fn hex_to_hsl(hex: &str) -> Option<Hsl> {
    let hex = hex.trim().strip_prefix('#')?;
    let (r, g, b) = match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            (r, g, b)
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            (r, g, b)
        }
        _ => return None,
    };

    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return Some(Hsl {
            h: 0.0,
            s: 0.0,
            l: l * 100.0,
        });
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if (max - r).abs() < f64::EPSILON {
        ((g - b) / d + if g < b { 6.0 } else { 0.0 }) * 60.0
    } else if (max - g).abs() < f64::EPSILON {
        ((b - r) / d + 2.0) * 60.0
    } else {
        ((r - g) / d + 4.0) * 60.0
    };

    Some(Hsl {
        h,
        s: s * 100.0,
        l: l * 100.0,
    })
}

/// Render an HSL color as a lowercase `#rrggbb` hex string.
pub fn hsl_to_hex(hsl: Hsl) -> String {
    let h = hsl.h.rem_euclid(360.0);
    let s = (hsl.s / 100.0).clamp(0.0, 1.0);
    let l = (hsl.l / 100.0).clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", to_byte(r), to_byte(g), to_byte(b))
}

/// Classify a color by lightness: >= 50 is a light-theme color.
pub fn detect_color_theme(hex: &str) -> Theme {
    match hex_to_hsl(hex) {
        Some(hsl) if hsl.l >= 50.0 => Theme::Light,
        Some(_) => Theme::Dark,
        None => Theme::Light,
    }
}

/// One lightness remapping band: inputs in `[in_lo, in_hi]` map linearly
/// onto `[out_at_lo, out_at_hi]`.
struct Band {
    in_lo: f64,
    in_hi: f64,
    out_at_lo: f64,
    out_at_hi: f64,
}

const LIGHT_TO_DARK_BANDS: [Band; 5] = [
    Band { in_lo: 90.0, in_hi: 100.0, out_at_lo: 16.0, out_at_hi: 10.0 },
    Band { in_lo: 75.0, in_hi: 90.0, out_at_lo: 24.0, out_at_hi: 16.0 },
    Band { in_lo: 60.0, in_hi: 75.0, out_at_lo: 32.0, out_at_hi: 24.0 },
    Band { in_lo: 50.0, in_hi: 60.0, out_at_lo: 40.0, out_at_hi: 32.0 },
    Band { in_lo: 0.0, in_hi: 50.0, out_at_lo: 48.0, out_at_hi: 40.0 },
];

const DARK_TO_LIGHT_BANDS: [Band; 5] = [
    Band { in_lo: 0.0, in_hi: 10.0, out_at_lo: 95.0, out_at_hi: 90.0 },
    Band { in_lo: 10.0, in_hi: 25.0, out_at_lo: 90.0, out_at_hi: 82.0 },
    Band { in_lo: 25.0, in_hi: 40.0, out_at_lo: 82.0, out_at_hi: 72.0 },
    Band { in_lo: 40.0, in_hi: 50.0, out_at_lo: 72.0, out_at_hi: 60.0 },
    Band { in_lo: 50.0, in_hi: 100.0, out_at_lo: 60.0, out_at_hi: 52.0 },
];

fn remap_lightness(l: f64, bands: &[Band]) -> f64 {
    for band in bands {
        if l >= band.in_lo && l <= band.in_hi {
            let t = if (band.in_hi - band.in_lo).abs() < f64::EPSILON {
                0.0
            } else {
                (l - band.in_lo) / (band.in_hi - band.in_lo)
            };
            return band.out_at_lo + t * (band.out_at_hi - band.out_at_lo);
        }
    }
    l
}

/// Remap a (light-theme) color into the dark theme.
pub fn generate_dark_mode_color(hex: &str) -> String {
    let Some(hsl) = hex_to_hsl(hex) else {
        return hex.to_string();
    };
    let l = remap_lightness(hsl.l, &LIGHT_TO_DARK_BANDS).clamp(10.0, 90.0);
    let s = (hsl.s * 0.9).clamp(0.0, 100.0);
    hsl_to_hex(Hsl { h: hsl.h, s, l })
}

/// Remap a (dark-theme) color into the light theme.
pub fn generate_light_mode_color(hex: &str) -> String {
    let Some(hsl) = hex_to_hsl(hex) else {
        return hex.to_string();
    };
    let l = remap_lightness(hsl.l, &DARK_TO_LIGHT_BANDS).clamp(10.0, 95.0);
    let s = (hsl.s * 1.1).clamp(0.0, 100.0);
    hsl_to_hex(Hsl { h: hsl.h, s, l })
}

/// Convert a color for the target theme.
///
/// Identity for "transparent"/empty strings and for colors whose detected
/// theme already matches the target.
pub fn convert_color_for_theme(color: &str, target: Theme) -> String {
    if color.is_empty() || color == "transparent" {
        return color.to_string();
    }
    if detect_color_theme(color) == target {
        return color.to_string();
    }
    match target {
        Theme::Dark => generate_dark_mode_color(color),
        Theme::Light => generate_light_mode_color(color),
    }
}
