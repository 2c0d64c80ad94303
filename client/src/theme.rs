// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use common::{Category, Theme};

/// The colours of one theme, as `#rrggbb` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub surface: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub border: &'static str,
    pub error: &'static str,
    pub success: &'static str,
}

pub const DARK: Palette = Palette {
    background: "#000000",
    surface: "#111111",
    primary: "#ffffff",
    secondary: "#a3a3a3",
    accent: "#3b82f6",
    border: "#333333",
    error: "#ef4444",
    success: "#22c55e",
};

pub const LIGHT: Palette = Palette {
    background: "#ffffff",
    surface: "#f5f5f5",
    primary: "#000000",
    secondary: "#666666",
    accent: "#3b82f6",
    border: "#e5e5e5",
    error: "#ef4444",
    success: "#22c55e",
};

pub fn palette(theme: Theme) -> &'static Palette {
    match theme {
        Theme::Dark => &DARK,
        Theme::Light => &LIGHT,
    }
}

impl Palette {
    /// Heading colour for a display group.
    pub fn for_category(&self, category: Category) -> &'static str {
        match category {
            Category::Pending => self.accent,
            Category::Overdue => self.error,
            Category::NoDate => self.secondary,
            Category::Completed => self.success,
        }
    }
}

/// Parses `#rrggbb` into its components.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Wraps `text` in a 24-bit ANSI foreground colour. Invalid colours leave
/// the text unstyled.
pub fn paint(text: &str, hex: &str) -> String {
    match hex_to_rgb(hex) {
        Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
        None => text.to_string(),
    }
}
