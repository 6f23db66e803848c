// Chunk: docs/chunks/attribute_resolution - Typed display attributes

//! Display attribute types.
//!
//! - [`Color`]: the renderer default or a 24-bit RGB value
//! - [`AttributeSet`]: the complete attributes for a run of text
//! - [`AttributePatch`]: a partial override, applied by resolver rules
//! - [`AttributeRun`]: a range of text with uniform attributes

use markup_kit_buffer::TextRange;

// =============================================================================
// Color Types
// =============================================================================

/// Text color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Whatever the renderer uses by default.
    #[default]
    Default,
    /// 24-bit RGB color.
    Rgb { r: u8, g: u8, b: u8 },
}

// =============================================================================
// Font and Underline
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    /// The proportional body font.
    #[default]
    Body,
    Monospace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnderlineStyle {
    #[default]
    None,
    Single,
    Double,
    Dotted,
}

// =============================================================================
// AttributeSet
// =============================================================================

/// Body text size in points.
pub const BODY_SIZE: u8 = 17;

/// The full set of display attributes for a run of text.
///
/// # Example
///
/// ```
/// use markup_kit_syntax::{AttributeSet, AttributePatch, FontFamily};
///
/// let mut attributes = AttributeSet::default();
/// attributes.apply(&AttributePatch::new().family(FontFamily::Monospace).bold(true));
/// assert_eq!(attributes.family, FontFamily::Monospace);
/// assert!(attributes.bold);
/// assert!(!attributes.italic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeSet {
    pub family: FontFamily,
    /// Point size.
    pub size: u8,
    pub bold: bool,
    pub italic: bool,
    pub fg: Color,
    pub bg: Color,
    pub underline: UnderlineStyle,
    pub strikethrough: bool,
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self {
            family: FontFamily::Body,
            size: BODY_SIZE,
            bold: false,
            italic: false,
            fg: Color::Default,
            bg: Color::Default,
            underline: UnderlineStyle::None,
            strikethrough: false,
        }
    }
}

impl AttributeSet {
    /// Overwrites every attribute the patch sets.
    pub fn apply(&mut self, patch: &AttributePatch) {
        if let Some(family) = patch.family {
            self.family = family;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(bold) = patch.bold {
            self.bold = bold;
        }
        if let Some(italic) = patch.italic {
            self.italic = italic;
        }
        if let Some(fg) = patch.fg {
            self.fg = fg;
        }
        if let Some(bg) = patch.bg {
            self.bg = bg;
        }
        if let Some(underline) = patch.underline {
            self.underline = underline;
        }
        if let Some(strikethrough) = patch.strikethrough {
            self.strikethrough = strikethrough;
        }
    }
}

// =============================================================================
// AttributePatch
// =============================================================================

/// A partial set of attributes. `None` leaves the attribute as it was.
///
/// The builder methods are `const` so rule tables can be written as statics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributePatch {
    pub family: Option<FontFamily>,
    pub size: Option<u8>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub underline: Option<UnderlineStyle>,
    pub strikethrough: Option<bool>,
}

impl AttributePatch {
    pub const fn new() -> Self {
        Self {
            family: None,
            size: None,
            bold: None,
            italic: None,
            fg: None,
            bg: None,
            underline: None,
            strikethrough: None,
        }
    }

    pub const fn family(mut self, family: FontFamily) -> Self {
        self.family = Some(family);
        self
    }

    pub const fn size(mut self, size: u8) -> Self {
        self.size = Some(size);
        self
    }

    pub const fn bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub const fn italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub const fn fg(mut self, fg: Color) -> Self {
        self.fg = Some(fg);
        self
    }

    pub const fn bg(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }

    pub const fn underline(mut self, underline: UnderlineStyle) -> Self {
        self.underline = Some(underline);
        self
    }

    pub const fn strikethrough(mut self, strikethrough: bool) -> Self {
        self.strikethrough = Some(strikethrough);
        self
    }
}

// =============================================================================
// AttributeRun
// =============================================================================

/// A range of text sharing one attribute set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRun {
    pub range: TextRange,
    pub attributes: AttributeSet,
}

impl AttributeRun {
    pub fn new(range: TextRange, attributes: AttributeSet) -> Self {
        Self { range, attributes }
    }
}

/// Merges adjacent runs that have the same attributes.
pub(crate) fn merge_runs(runs: Vec<AttributeRun>) -> Vec<AttributeRun> {
    let mut result: Vec<AttributeRun> = Vec::with_capacity(runs.len());

    for run in runs {
        if let Some(last) = result.last_mut() {
            if last.attributes == run.attributes && last.range.end() == run.range.location {
                last.range.length += run.range.length;
                continue;
            }
        }
        result.push(run);
    }

    result
}
