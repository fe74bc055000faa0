//! Color representation and palette resolution.
//!
//! Cells carry either a concrete RGB value or the symbolic `Default`
//! marker. Symbolic colors are resolved against a [`Palette`] supplied by
//! the embedding host; the engine never hardcodes what "default" looks like.

use serde::{Deserialize, Serialize};

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Pack into an ARGB pixel with full alpha.
    pub fn to_pixel(self) -> u32 {
        0xFF00_0000 | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }
}

/// Which slot of the palette a symbolic color resolves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Foreground,
    Background,
}

/// A cell color: concrete, or deferred to the host palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    /// Default foreground or background; the palette decides which value.
    Default,
    /// Concrete 24-bit color.
    Rgb(Rgb),
}

impl Default for Color {
    fn default() -> Self {
        Color::Default
    }
}

impl Color {
    /// Force this color concrete, resolving `Default` through the palette
    /// according to the role it is being used in.
    pub fn resolve(self, palette: &Palette, role: ColorRole) -> Rgb {
        match self {
            Color::Rgb(rgb) => rgb,
            Color::Default => match role {
                ColorRole::Foreground => palette.foreground,
                ColorRole::Background => palette.background,
            },
        }
    }
}

/// Concrete colors for the symbolic slots, supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Value of `Color::Default` used as a foreground.
    pub foreground: Rgb,
    /// Value of `Color::Default` used as a background.
    pub background: Rgb,
    /// Cursor color for fixed-background and bar-style cursors.
    pub cursor: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            foreground: Rgb::new(229, 229, 229),
            background: Rgb::new(0, 0, 0),
            cursor: Rgb::new(255, 255, 255),
        }
    }
}
