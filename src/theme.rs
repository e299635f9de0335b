//! Theme colors, with optional overrides from the `[theme]` config section

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,      // Active borders, count, key hints
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Descriptions, hints
    pub inactive: Color,    // Inactive borders
    pub bg_selected: Color, // Selection background
    pub header: Color,      // Product titles
    pub tag: Color,         // The `tag` class
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired
        Self {
            accent: Color::Rgb(250, 179, 135),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
            bg_selected: Color::Rgb(69, 71, 90),
            header: Color::Rgb(243, 139, 168),
            tag: Color::Rgb(166, 218, 149),
        }
    }
}

impl Theme {
    /// Defaults with every valid override from the config applied
    pub fn from_config(config: &ThemeConfig) -> Self {
        let defaults = Self::default();
        let pick = |name: &str, value: &Option<String>, fallback: Color| match value {
            None => fallback,
            Some(raw) => Self::parse_hex_color(raw).unwrap_or_else(|| {
                tracing::warn!("Ignoring invalid theme color {} = {:?}", name, raw);
                fallback
            }),
        };

        Self {
            accent: pick("accent", &config.accent, defaults.accent),
            text: pick("text", &config.text, defaults.text),
            text_dim: pick("text_dim", &config.text_dim, defaults.text_dim),
            inactive: pick("inactive", &config.inactive, defaults.inactive),
            bg_selected: pick("bg_selected", &config.bg_selected, defaults.bg_selected),
            header: pick("header", &config.header, defaults.header),
            tag: pick("tag", &config.tag, defaults.tag),
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
