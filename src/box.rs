//! Box drawing characters for table borders.
//!
//! Borders come in two line weights, [`SINGLE`] and [`DOUBLE`]. Where a
//! vertical and a horizontal border cross, the four touching segments are
//! collected into a [`Junction`] mask and mapped through [`JUNCTION_LOOKUP`]
//! to the glyph that joins exactly those segments.

use std::fmt;

use bitflags::bitflags;

/// Line style of a single border segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderStyle {
    /// No border. A column or row whose borders are all `None` takes no space.
    #[default]
    None,
    /// Light single line.
    Single,
    /// Double line.
    Double,
}

impl BorderStyle {
    /// Whether this style draws anything.
    #[must_use]
    pub const fn is_drawn(self) -> bool {
        !matches!(self, Self::None)
    }
}

bitflags! {
    /// Segments meeting at a border crossing, clockwise from the top.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Junction: u8 {
        /// Segment leading up from the crossing.
        const UP    = 1 << 0;
        /// Segment leading right.
        const RIGHT = 1 << 1;
        /// Segment leading down.
        const DOWN  = 1 << 2;
        /// Segment leading left.
        const LEFT  = 1 << 3;
    }
}

/// Position of a glyph inside a [`BoxGlyphs`] set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    TopLeft,
    TopTee,
    TopRight,
    LeftTee,
    Cross,
    RightTee,
    BottomLeft,
    BottomTee,
    BottomRight,
    Horizontal,
    Vertical,
    Blank,
}

/// Glyph for every junction mask, indexed by `Junction::bits()`.
///
/// Masks with fewer than two segments have nothing to join and stay blank.
pub const JUNCTION_LOOKUP: [Glyph; 16] = [
    Glyph::Blank,       // ····
    Glyph::Blank,       // U···
    Glyph::Blank,       // ·R··
    Glyph::BottomLeft,  // UR··
    Glyph::Blank,       // ··D·
    Glyph::Vertical,    // U·D·
    Glyph::TopLeft,     // ·RD·
    Glyph::LeftTee,     // URD·
    Glyph::Blank,       // ···L
    Glyph::BottomRight, // U··L
    Glyph::Horizontal,  // ·R·L
    Glyph::BottomTee,   // UR·L
    Glyph::TopRight,    // ··DL
    Glyph::RightTee,    // U·DL
    Glyph::TopTee,      // ·RDL
    Glyph::Cross,       // URDL
];

/// One weight of box drawing characters.
///
/// Each corner row is 3 characters: [left, tee, right].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxGlyphs {
    /// Top row: ┌┬┐
    pub top: [char; 3],
    /// Middle row: ├┼┤
    pub mid: [char; 3],
    /// Bottom row: └┴┘
    pub bottom: [char; 3],
    /// Horizontal run: ─
    pub horizontal: char,
    /// Vertical run: │
    pub vertical: char,
}

impl BoxGlyphs {
    /// Create a glyph set from its rows.
    #[must_use]
    pub const fn new(
        top: [char; 3],
        mid: [char; 3],
        bottom: [char; 3],
        horizontal: char,
        vertical: char,
    ) -> Self {
        Self {
            top,
            mid,
            bottom,
            horizontal,
            vertical,
        }
    }

    /// Get the character for a glyph position.
    #[must_use]
    pub const fn get(&self, glyph: Glyph) -> char {
        match glyph {
            Glyph::TopLeft => self.top[0],
            Glyph::TopTee => self.top[1],
            Glyph::TopRight => self.top[2],
            Glyph::LeftTee => self.mid[0],
            Glyph::Cross => self.mid[1],
            Glyph::RightTee => self.mid[2],
            Glyph::BottomLeft => self.bottom[0],
            Glyph::BottomTee => self.bottom[1],
            Glyph::BottomRight => self.bottom[2],
            Glyph::Horizontal => self.horizontal,
            Glyph::Vertical => self.vertical,
            Glyph::Blank => ' ',
        }
    }

    /// Character joining the segments of `junction`.
    #[must_use]
    pub const fn junction(&self, junction: Junction) -> char {
        self.get(JUNCTION_LOOKUP[junction.bits() as usize])
    }

    /// Glyph set for a border style, `None` for [`BorderStyle::None`].
    #[must_use]
    pub const fn for_style(style: BorderStyle) -> Option<&'static BoxGlyphs> {
        match style {
            BorderStyle::None => None,
            BorderStyle::Single => Some(&SINGLE),
            BorderStyle::Double => Some(&DOUBLE),
        }
    }
}

impl fmt::Display for BoxGlyphs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A 2x2 sample grid
        let h = self.horizontal;
        writeln!(f, "{}{h}{}{h}{}", self.top[0], self.top[1], self.top[2])?;
        writeln!(f, "{v} {v} {v}", v = self.vertical)?;
        writeln!(f, "{}{h}{}{h}{}", self.mid[0], self.mid[1], self.mid[2])?;
        writeln!(f, "{v} {v} {v}", v = self.vertical)?;
        write!(f, "{}{h}{}{h}{}", self.bottom[0], self.bottom[1], self.bottom[2])
    }
}

/// Light single-line glyphs.
pub const SINGLE: BoxGlyphs = BoxGlyphs::new(
    ['\u{250C}', '\u{252C}', '\u{2510}'], // ┌┬┐
    ['\u{251C}', '\u{253C}', '\u{2524}'], // ├┼┤
    ['\u{2514}', '\u{2534}', '\u{2518}'], // └┴┘
    '\u{2500}',                           // ─
    '\u{2502}',                           // │
);

/// Double-line glyphs.
pub const DOUBLE: BoxGlyphs = BoxGlyphs::new(
    ['\u{2554}', '\u{2566}', '\u{2557}'], // ╔╦╗
    ['\u{2560}', '\u{256C}', '\u{2563}'], // ╠╬╣
    ['\u{255A}', '\u{2569}', '\u{255D}'], // ╚╩╝
    '\u{2550}',                           // ═
    '\u{2551}',                           // ║
);
