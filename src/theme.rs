//! Theme colors loaded from the Omarchy/Hyprland system theme
//! Reads colors from ~/.config/omarchy/current/theme/kitty.conf

use ratatui::style::Color;
use std::collections::HashMap;
use std::fs;

use crate::ledger::AccountCategory;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Active borders, highlights, asset rows
    pub danger: Color,      // Closed accounts, destructive popups (color1/red)
    pub success: Color,     // Zero-balance / closeable indicators
    pub warning: Color,     // Warning banners (color4 - often orange in Omarchy)
    pub text: Color,        // Primary text (foreground)
    pub text_dim: Color,    // Dimmed text, closed rows (color8/bright black)
    pub bg_selected: Color, // Selection background
    pub inactive: Color,    // Inactive borders
    pub header: Color,      // Table headers
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired fallback when no system theme is present
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(250, 179, 135),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(243, 139, 168),
        }
    }
}

impl Theme {
    pub fn load() -> Self {
        Self::load_omarchy_theme().unwrap_or_default()
    }

    /// A stable tint per account category, used in tables and summaries
    pub fn category_color(&self, category: AccountCategory) -> Color {
        match category {
            AccountCategory::Asset => self.accent,
            AccountCategory::Liability => self.warning,
            AccountCategory::Equity => self.header,
            AccountCategory::Revenue => self.success,
            AccountCategory::Expense => self.danger,
        }
    }

    /// Load colors from the Omarchy kitty.conf theme file
    fn load_omarchy_theme() -> Option<Self> {
        let theme_path = dirs::home_dir()?.join(".config/omarchy/current/theme/kitty.conf");
        let content = fs::read_to_string(&theme_path).ok()?;
        let colors = Self::parse_kitty_conf(&content);

        if colors.is_empty() {
            return None;
        }

        let pick = |keys: &[&str], fallback: Color| {
            keys.iter()
                .find_map(|k| colors.get(*k).copied())
                .unwrap_or(fallback)
        };

        // Omarchy Matte Black maps color2 to gold and color4 to orange, so
        // "accent" comes from the green slot and "warning" from the blue one.
        Some(Self {
            accent: pick(&["color2", "color10"], Color::Rgb(255, 193, 7)),
            danger: pick(&["color1"], Color::Rgb(211, 95, 95)),
            success: pick(&["color2", "color10"], Color::Rgb(255, 193, 7)),
            warning: pick(&["color4", "color12"], Color::Rgb(230, 142, 13)),
            text: pick(&["foreground"], Color::Rgb(190, 190, 190)),
            text_dim: pick(&["color8"], Color::Rgb(138, 138, 141)),
            bg_selected: pick(&["selection_background", "color0"], Color::Rgb(51, 51, 51)),
            inactive: pick(&["inactive_border_color", "color8"], Color::Rgb(89, 89, 89)),
            header: pick(&["color1"], Color::Rgb(211, 95, 95)),
        })
    }

    /// Parse kitty.conf lines of the form `key #hexcolor`
    fn parse_kitty_conf(content: &str) -> HashMap<String, Color> {
        content
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                let (key, value) = line.split_once(char::is_whitespace)?;
                let color = Self::parse_hex_color(value.trim())?;
                Some((key.trim().to_string(), color))
            })
            .collect()
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        match s.len() {
            6 => {
                let value = u32::from_str_radix(s, 16).ok()?;
                Some(Color::Rgb(
                    (value >> 16) as u8,
                    (value >> 8) as u8,
                    value as u8,
                ))
            }
            3 => {
                let value = u32::from_str_radix(s, 16).ok()?;
                Some(Color::Rgb(
                    ((value >> 8) & 0xf) as u8 * 17,
                    ((value >> 4) & 0xf) as u8 * 17,
                    (value & 0xf) as u8 * 17,
                ))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_hex_forms() {
        assert_eq!(Theme::parse_hex_color("#ffc107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(Theme::parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
        assert_eq!(Theme::parse_hex_color("nope"), None);
    }

    #[test]
    fn kitty_conf_lines_become_colors() {
        let conf = "# comment\nforeground #bebebe\ncolor1 #D35F5F\n\nbadline\n";
        let colors = Theme::parse_kitty_conf(conf);
        assert_eq!(colors.get("foreground"), Some(&Color::Rgb(190, 190, 190)));
        assert_eq!(colors.get("color1"), Some(&Color::Rgb(211, 95, 95)));
        assert_eq!(colors.len(), 2);
    }
}
