//! Character cell representation.
//!
//! A cell is one character position in the grid: a glyph, a foreground and
//! background color, and a set of style modifiers. Cells are immutable
//! values; the buffer mutates by replacing whole cells, never by editing a
//! cell in place.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Style modifier set for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    bits: u8,
}

impl Modifiers {
    pub const NONE: u8 = 0;
    pub const BOLD: u8 = 1 << 0;
    pub const UNDERLINE: u8 = 1 << 1;
    pub const BLINK: u8 = 1 << 2;
    pub const INVERSE: u8 = 1 << 3;
    pub const CROSSED_OUT: u8 = 1 << 4;

    pub const fn empty() -> Self {
        Modifiers { bits: Self::NONE }
    }

    pub const fn new(bits: u8) -> Self {
        Modifiers { bits }
    }

    pub fn contains(&self, flag: u8) -> bool {
        self.bits & flag != 0
    }

    pub fn set(&mut self, flag: u8, value: bool) {
        if value {
            self.bits |= flag;
        } else {
            self.bits &= !flag;
        }
    }

    pub fn insert(&mut self, flag: u8) {
        self.bits |= flag;
    }

    pub fn remove(&mut self, flag: u8) {
        self.bits &= !flag;
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

/// A single cell in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The character displayed in this cell.
    pub glyph: char,
    /// Foreground color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// Style modifiers.
    pub modifiers: Modifiers,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            glyph: ' ',
            fg: Color::Default,
            bg: Color::Default,
            modifiers: Modifiers::empty(),
        }
    }
}

impl Cell {
    /// Create a cell with the given glyph and default styling.
    pub fn new(glyph: char) -> Self {
        Cell {
            glyph,
            ..Default::default()
        }
    }

    /// Create a fully specified cell.
    pub fn styled(glyph: char, fg: Color, bg: Color, modifiers: Modifiers) -> Self {
        Cell {
            glyph,
            fg,
            bg,
            modifiers,
        }
    }

    /// Whether this cell is a blank with default attributes.
    pub fn is_blank(&self) -> bool {
        self.glyph == ' '
            && self.fg == Color::Default
            && self.bg == Color::Default
            && self.modifiers.is_empty()
    }

    /// Display width of the glyph in cells. Wide characters (CJK, some
    /// emoji) occupy two columns; everything else one.
    pub fn width(&self) -> usize {
        use unicode_width::UnicodeWidthChar;
        self.glyph.width().unwrap_or(1).max(1)
    }

    /// Whether this cell must repaint every frame to toggle visibility.
    pub fn is_blinking(&self) -> bool {
        self.modifiers.contains(Modifiers::BLINK)
    }
}
