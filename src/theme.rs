//! Color themes
//!
//! Read-only during a session; the spawner samples `particle_colors` for
//! normal and lucky targets.

use serde::{Deserialize, Serialize};

/// Theme colors (0xRRGGBB)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub primary_color: u32,
    pub secondary_color: u32,
    pub particle_colors: Vec<u32>,
    pub gradient_colors: Vec<u32>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "neon".to_string(),
            primary_color: 0x00E5FF,
            secondary_color: 0xFF00E5,
            particle_colors: vec![0x00E5FF, 0xFF00E5, 0x7CFF00, 0xFF9100, 0x651FFF],
            gradient_colors: vec![0x0F0C29, 0x302B63, 0x24243E],
        }
    }
}

impl Theme {
    pub fn sunset() -> Self {
        Self {
            name: "sunset".to_string(),
            primary_color: 0xFF6B35,
            secondary_color: 0xF7C59F,
            particle_colors: vec![0xFF6B35, 0xF7C59F, 0xEFEFD0, 0xFF9F1C, 0xE71D36],
            gradient_colors: vec![0x2E1F27, 0x854D27, 0xDD7230],
        }
    }

    /// Built-in theme by name; unknown names get the default
    pub fn named(name: &str) -> Self {
        match name {
            "sunset" => Self::sunset(),
            _ => Self::default(),
        }
    }

    /// Format a color as `#RRGGBB`
    pub fn hex(color: u32) -> String {
        format!("#{:06X}", color & 0xFF_FFFF)
    }
}
