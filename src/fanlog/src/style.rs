// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Console text styles and the per-level style table.
//!
//! A style is a composite of three regions packed into one `u32`: an
//! attribute (bright/dim), a foreground colour, and a background colour.
//! The regions hold enumerated values, not independent bits, so this is a
//! plain newtype rather than a flags type. Styles render to ANSI escape
//! sequences on consoles that use them.

use std::fmt::Write;
use std::ops::BitOr;
use std::sync::Mutex;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::buffer::FixedString;
use crate::error::{fail, ErrorKind, OpResult};
use crate::level::Level;
use crate::state::lock_section;
use crate::MAX_STYLE;

/// The escape sequence that returns the console to its default rendition.
pub(crate) const RESET_SEQUENCE: &str = "\x1b[0m";

/// A composite console text style: attribute, foreground colour, and
/// background colour. Combine the constants with `|`.
///
/// ```
/// use fanlog::TextStyle;
///
/// let loud = TextStyle::BRIGHT | TextStyle::FG_WHITE | TextStyle::BG_RED;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle(u32);

impl TextStyle {
    /// No styling; the console default rendition.
    pub const NONE: TextStyle = TextStyle(0);
    /// Intensified foreground colour.
    pub const BRIGHT: TextStyle = TextStyle(0x1);
    /// Dimmed foreground colour.
    pub const DIM: TextStyle = TextStyle(0x2);

    /// Black foreground.
    pub const FG_BLACK: TextStyle = TextStyle(0x10);
    /// Red foreground.
    pub const FG_RED: TextStyle = TextStyle(0x20);
    /// Green foreground.
    pub const FG_GREEN: TextStyle = TextStyle(0x30);
    /// Yellow foreground.
    pub const FG_YELLOW: TextStyle = TextStyle(0x40);
    /// Blue foreground.
    pub const FG_BLUE: TextStyle = TextStyle(0x50);
    /// Magenta foreground.
    pub const FG_MAGENTA: TextStyle = TextStyle(0x60);
    /// Cyan foreground.
    pub const FG_CYAN: TextStyle = TextStyle(0x70);
    /// White foreground.
    pub const FG_WHITE: TextStyle = TextStyle(0x80);
    /// Light gray foreground.
    pub const FG_LGRAY: TextStyle = TextStyle(0x90);
    /// Dark gray foreground.
    pub const FG_DGRAY: TextStyle = TextStyle(0xa0);
    /// Light red foreground.
    pub const FG_LRED: TextStyle = TextStyle(0xb0);
    /// Light green foreground.
    pub const FG_LGREEN: TextStyle = TextStyle(0xc0);
    /// Light yellow foreground.
    pub const FG_LYELLOW: TextStyle = TextStyle(0xd0);
    /// Light blue foreground.
    pub const FG_LBLUE: TextStyle = TextStyle(0xe0);
    /// Light magenta foreground.
    pub const FG_LMAGENTA: TextStyle = TextStyle(0xf0);
    /// Light cyan foreground.
    pub const FG_LCYAN: TextStyle = TextStyle(0xf10);
    /// The console's default foreground colour.
    pub const FG_DEFAULT: TextStyle = TextStyle(0xf20);

    /// Black background.
    pub const BG_BLACK: TextStyle = TextStyle(0x1000);
    /// Red background.
    pub const BG_RED: TextStyle = TextStyle(0x2000);
    /// Green background.
    pub const BG_GREEN: TextStyle = TextStyle(0x3000);
    /// Yellow background.
    pub const BG_YELLOW: TextStyle = TextStyle(0x4000);
    /// Blue background.
    pub const BG_BLUE: TextStyle = TextStyle(0x5000);
    /// Magenta background.
    pub const BG_MAGENTA: TextStyle = TextStyle(0x6000);
    /// Cyan background.
    pub const BG_CYAN: TextStyle = TextStyle(0x7000);
    /// White background.
    pub const BG_WHITE: TextStyle = TextStyle(0x8000);
    /// Light gray background.
    pub const BG_LGRAY: TextStyle = TextStyle(0x9000);
    /// Dark gray background.
    pub const BG_DGRAY: TextStyle = TextStyle(0xa000);
    /// Light red background.
    pub const BG_LRED: TextStyle = TextStyle(0xb000);
    /// Light green background.
    pub const BG_LGREEN: TextStyle = TextStyle(0xc000);
    /// Light yellow background.
    pub const BG_LYELLOW: TextStyle = TextStyle(0xd000);
    /// Light blue background.
    pub const BG_LBLUE: TextStyle = TextStyle(0xe000);
    /// Light magenta background.
    pub const BG_LMAGENTA: TextStyle = TextStyle(0xf000);
    /// Light cyan background.
    pub const BG_LCYAN: TextStyle = TextStyle(0xf1000);
    /// The console's default background colour.
    pub const BG_DEFAULT: TextStyle = TextStyle(0xf2000);

    /// The invalid style; as a table entry it means "use the default for
    /// that level".
    pub const INVALID: TextStyle = TextStyle(0xf3000);

    const ATTR_MASK: u32 = 0xf;
    const FG_MASK: u32 = 0xff0;
    const BG_MASK: u32 = 0xff000;

    /// Builds a style from raw bits without validation.
    pub const fn from_bits(bits: u32) -> TextStyle {
        TextStyle(bits)
    }

    /// The raw bit representation.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Splits the style into its (attribute, foreground, background)
    /// regions, failing if any region falls outside its defined range.
    pub(crate) fn parts(self) -> OpResult<(u32, u32, u32)> {
        let attr = self.0 & Self::ATTR_MASK;
        let fg = self.0 & Self::FG_MASK;
        let bg = self.0 & Self::BG_MASK;
        if attr > Self::DIM.0 || fg > Self::FG_DEFAULT.0 || bg > Self::BG_DEFAULT.0 {
            fail!(ErrorKind::InvalidTextStyle);
        }
        Ok((attr, fg, bg))
    }

    /// Renders the style into `out` as an ANSI escape sequence,
    /// `ESC[attr(;fg)(;bg)m`, omitting colour components that resolve to
    /// nothing.
    pub(crate) fn render(self, out: &mut FixedString<MAX_STYLE>) -> OpResult {
        let (attr, fg, bg) = self.parts()?;
        out.clear();
        let _ = write!(out, "\x1b[{}", ansi_attribute(attr));
        let fg = ansi_foreground(fg);
        if fg != 0 {
            let _ = write!(out, ";{fg:03}");
        }
        let bg = ansi_background(bg);
        if bg != 0 {
            let _ = write!(out, ";{bg:03}");
        }
        out.push_str("m");
        Ok(())
    }
}

impl BitOr for TextStyle {
    type Output = TextStyle;

    fn bitor(self, rhs: TextStyle) -> TextStyle {
        TextStyle(self.0 | rhs.0)
    }
}

fn ansi_attribute(attr: u32) -> u32 {
    match TextStyle(attr) {
        TextStyle::BRIGHT => 1,
        TextStyle::DIM => 2,
        _ => 0,
    }
}

fn ansi_foreground(fg: u32) -> u32 {
    match TextStyle(fg) {
        TextStyle::FG_BLACK => 30,
        TextStyle::FG_RED => 31,
        TextStyle::FG_GREEN => 32,
        TextStyle::FG_YELLOW => 33,
        TextStyle::FG_BLUE => 34,
        TextStyle::FG_MAGENTA => 35,
        TextStyle::FG_CYAN => 36,
        TextStyle::FG_LGRAY => 37,
        TextStyle::FG_DGRAY => 90,
        TextStyle::FG_LRED => 91,
        TextStyle::FG_LGREEN => 92,
        TextStyle::FG_LYELLOW => 93,
        TextStyle::FG_LBLUE => 94,
        TextStyle::FG_LMAGENTA => 95,
        TextStyle::FG_LCYAN => 96,
        TextStyle::FG_WHITE => 97,
        TextStyle::FG_DEFAULT => 39,
        _ => 0,
    }
}

fn ansi_background(bg: u32) -> u32 {
    match TextStyle(bg) {
        TextStyle::BG_BLACK => 40,
        TextStyle::BG_RED => 41,
        TextStyle::BG_GREEN => 42,
        TextStyle::BG_YELLOW => 43,
        TextStyle::BG_BLUE => 44,
        TextStyle::BG_MAGENTA => 45,
        TextStyle::BG_CYAN => 46,
        TextStyle::BG_LGRAY => 47,
        TextStyle::BG_DGRAY => 100,
        TextStyle::BG_LRED => 101,
        TextStyle::BG_LGREEN => 102,
        TextStyle::BG_LYELLOW => 103,
        TextStyle::BG_LBLUE => 104,
        TextStyle::BG_LMAGENTA => 105,
        TextStyle::BG_LCYAN => 106,
        TextStyle::BG_WHITE => 107,
        TextStyle::BG_DEFAULT => 49,
        _ => 0,
    }
}

/// The hard-coded default style for a level.
pub(crate) const fn default_style(level: Level) -> TextStyle {
    match level {
        Level::Debug => TextStyle::FG_DGRAY,
        Level::Info => TextStyle::FG_WHITE,
        Level::Notice => TextStyle::FG_CYAN,
        Level::Warn => TextStyle::FG_YELLOW,
        Level::Error => TextStyle::FG_RED,
        Level::Crit => TextStyle(TextStyle::BRIGHT.0 | TextStyle::FG_RED.0),
        Level::Alert => {
            TextStyle(TextStyle::BRIGHT.0 | TextStyle::FG_BLACK.0 | TextStyle::BG_LYELLOW.0)
        }
        Level::Emerg => {
            TextStyle(TextStyle::BRIGHT.0 | TextStyle::FG_LYELLOW.0 | TextStyle::BG_RED.0)
        }
    }
}

#[derive(Debug)]
struct StyleTable {
    overrides: [TextStyle; 8],
}

lazy_static! {
    static ref STYLE_TABLE: Mutex<StyleTable> = Mutex::new(StyleTable {
        overrides: [TextStyle::INVALID; 8],
    });
}

/// The effective style for `level`: the override when one is set, the
/// hard-coded default otherwise.
pub(crate) fn resolved_style(level: Level) -> TextStyle {
    let table = lock_section(&STYLE_TABLE);
    let entry = table.overrides[level.slot()];
    if entry == TextStyle::INVALID {
        default_style(level)
    } else {
        entry
    }
}

/// Validates `style` and installs it as the override for `level`.
pub(crate) fn set_override(level: Level, style: TextStyle) -> OpResult {
    style.parts()?;
    let mut table = lock_section(&STYLE_TABLE);
    table.overrides[level.slot()] = style;
    Ok(())
}

/// Discards every override, returning all levels to their defaults.
pub(crate) fn reset_overrides() {
    let mut table = lock_section(&STYLE_TABLE);
    table.overrides = [TextStyle::INVALID; 8];
}
