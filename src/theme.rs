//! Accent color handling for the per-track background theme.
//!
//! Tracks carry an accent color as a CSS-style hex string. The UI paints the
//! whole screen with the accent of the current track and picks a foreground
//! that stays readable on top of it.

use ratatui::style::Color;

/// Background used before any track has been chosen.
pub const DEFAULT_BACKGROUND: Rgb = Rgb::new(0x07, 0x19, 0x52);
/// Background used for tracks without an accent color.
pub const FALLBACK_ACCENT: Rgb = Rgb::new(0xff, 0xff, 0xff);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }

    /// Perceived brightness in `0.0..=255.0` (ITU-R BT.601 weights).
    pub fn brightness(self) -> f32 {
        0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32
    }

    /// Black on light backgrounds, white on dark ones.
    pub fn contrast_fg(self) -> Color {
        if self.brightness() > 150.0 {
            Color::Black
        } else {
            Color::White
        }
    }
}

/// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb`. Anything else is `None`.
pub fn parse_hex(s: &str) -> Option<Rgb> {
    let hex = s.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb::new(r, g, b))
        }
        3 => {
            let mut it = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            let r = it.next()??;
            let g = it.next()??;
            let b = it.next()??;
            Some(Rgb::new(r, g, b))
        }
        _ => None,
    }
}

/// Resolve the background for a track accent, falling back when the accent
/// is missing or unparseable.
pub fn background_for(accent: Option<&str>, fallback: Rgb) -> Rgb {
    accent.and_then(parse_hex).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_accepts_long_and_short_forms() {
        assert_eq!(parse_hex("#331E00"), Some(Rgb::new(0x33, 0x1e, 0x00)));
        assert_eq!(parse_hex("331e00"), Some(Rgb::new(0x33, 0x1e, 0x00)));
        assert_eq!(parse_hex("#fff"), Some(Rgb::new(0xff, 0xff, 0xff)));
        assert_eq!(parse_hex("  #071952 "), Some(DEFAULT_BACKGROUND));
    }

    #[test]
    fn parse_hex_rejects_garbage() {
        assert_eq!(parse_hex(""), None);
        assert_eq!(parse_hex("#"), None);
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#gggggg"), None);
        assert_eq!(parse_hex("#ffé"), None);
        assert_eq!(parse_hex("red"), None);
    }

    #[test]
    fn background_for_falls_back_on_missing_or_bad_accent() {
        assert_eq!(background_for(None, FALLBACK_ACCENT), FALLBACK_ACCENT);
        assert_eq!(background_for(Some("nope"), FALLBACK_ACCENT), FALLBACK_ACCENT);
        assert_eq!(
            background_for(Some("#102030"), FALLBACK_ACCENT),
            Rgb::new(0x10, 0x20, 0x30)
        );
    }

    #[test]
    fn contrast_fg_is_readable() {
        assert_eq!(FALLBACK_ACCENT.contrast_fg(), Color::Black);
        assert_eq!(DEFAULT_BACKGROUND.contrast_fg(), Color::White);
        assert_eq!(Rgb::new(0xf5, 0xd0, 0x4c).contrast_fg(), Color::Black);
    }

    #[test]
    fn to_color_is_rgb() {
        assert_eq!(Rgb::new(1, 2, 3).to_color(), Color::Rgb(1, 2, 3));
    }
}
