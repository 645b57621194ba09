// Theme selection
// Two looks: the plain "original" chart and the "colorful" classroom scene,
// which also allows a custom title color.

use crate::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Original,
    Colorful,
}

impl ThemeName {
    /// Whether a user-picked title color is honored under this theme
    pub fn allows_title_color(self) -> bool {
        matches!(self, ThemeName::Colorful)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Original => "original",
            ThemeName::Colorful => "colorful",
        }
    }

    /// Parse a theme name, falling back to Original for anything unknown
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "colorful" => ThemeName::Colorful,
            _ => ThemeName::Original,
        }
    }
}

/// Parse "#RGB" or "#RRGGBB" (leading # optional)
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().trim_start_matches('#');
    let full = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => hex.to_string(),
        _ => return None,
    };
    u32::from_str_radix(&full, 16).ok().map(Color::from_hex)
}
