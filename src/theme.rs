//! Terminal palette. Chrome colors can be taken from a kitty.conf-style
//! color file; risk badge colors are fixed so the four levels stay distinct.

use ratatui::style::Color;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::risk::RiskStyle;

/// Foreground/background pair for a risk badge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeColors {
    pub fg: Color,
    pub bg: Color,
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Focused borders, submit button
    pub danger: Color,      // Error block
    pub warning: Color,     // Out-of-range hints, status line
    pub text: Color,
    pub text_dim: Color,
    pub inactive: Color,    // Unfocused borders, disabled button
    pub header: Color,
    pub bg_selected: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(37, 99, 235),
            danger: Color::Rgb(220, 38, 38),
            warning: Color::Rgb(250, 179, 135),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(205, 214, 244),
            bg_selected: Color::Rgb(69, 71, 90),
        }
    }
}

impl Theme {
    /// Load the palette from `path`, falling back to defaults for anything
    /// the file does not define.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_kitty_conf(&content),
            Err(e) => {
                tracing::warn!("Could not read theme file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn from_kitty_conf(content: &str) -> Self {
        let colors = parse_kitty_conf(content);
        let fallback = Self::default();

        Self {
            accent: pick(&colors, &["color4", "color12"], fallback.accent),
            danger: pick(&colors, &["color1", "color9"], fallback.danger),
            warning: pick(&colors, &["color3", "color11"], fallback.warning),
            text: pick(&colors, &["foreground"], fallback.text),
            text_dim: pick(&colors, &["color8"], fallback.text_dim),
            inactive: pick(&colors, &["inactive_border_color", "color8"], fallback.inactive),
            header: pick(&colors, &["foreground"], fallback.header),
            bg_selected: pick(&colors, &["selection_background", "color0"], fallback.bg_selected),
        }
    }

    pub fn badge(&self, style: RiskStyle) -> BadgeColors {
        let (bg, fg) = match style {
            RiskStyle::Low => ((220, 252, 231), (22, 101, 52)),
            RiskStyle::Moderate => ((254, 249, 195), (133, 77, 14)),
            RiskStyle::High => ((255, 237, 213), (154, 52, 18)),
            RiskStyle::Critical => ((254, 226, 226), (153, 27, 27)),
            RiskStyle::Neutral => ((243, 244, 246), (31, 41, 55)),
        };
        BadgeColors {
            fg: Color::Rgb(fg.0, fg.1, fg.2),
            bg: Color::Rgb(bg.0, bg.1, bg.2),
        }
    }
}

/// First key present in the file wins
fn pick(colors: &HashMap<String, Color>, keys: &[&str], default: Color) -> Color {
    keys.iter()
        .find_map(|k| colors.get(*k))
        .copied()
        .unwrap_or(default)
}

/// Parse kitty.conf format: `key value` or `key #hexcolor`
fn parse_kitty_conf(content: &str) -> HashMap<String, Color> {
    let mut colors = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once(char::is_whitespace) {
            if let Some(color) = parse_hex_color(value) {
                colors.insert(key.trim().to_string(), color);
            }
        }
    }

    colors
}

/// Parse a hex color string (#RRGGBB or #RGB)
fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim().trim_start_matches('#');
    if !s.is_ascii() {
        return None;
    }

    match s.len() {
        6 => {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}
