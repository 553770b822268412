//! Fold level encoding shared by the folders
//!
//! Levels are persisted per line as one packed integer in the layout
//! editors built on Scintilla expect: the low 12 bits hold the level
//! (starting at [`FoldLevel::BASE`]), bit 12 marks a whitespace-only
//! line, bit 13 marks a fold header and bits 16 and up optionally hold
//! the level of the following line.

use super::document::Document;

/// Fold level of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldLevel {
    /// Nesting level, [`FoldLevel::BASE`] at the outermost level
    pub level: i32,
    /// Level the next line starts at (0 when not recorded)
    pub next: i32,
    /// The line holds only whitespace
    pub white: bool,
    /// The line opens a foldable block
    pub header: bool,
}

impl FoldLevel {
    /// Level of unindented top-level code
    pub const BASE: i32 = 0x400;
    /// Flag for whitespace-only lines
    pub const WHITE_FLAG: i32 = 0x1000;
    /// Flag for lines that open a fold
    pub const HEADER_FLAG: i32 = 0x2000;
    /// Mask selecting the level number
    pub const NUMBER_MASK: i32 = 0x0FFF;

    /// A plain level with no flags
    pub fn new(level: i32) -> Self {
        Self {
            level,
            next: 0,
            white: false,
            header: false,
        }
    }

    /// Unpack a persisted level
    pub fn from_raw(raw: i32) -> Self {
        Self {
            level: raw & Self::NUMBER_MASK,
            next: raw >> 16,
            white: raw & Self::WHITE_FLAG != 0,
            header: raw & Self::HEADER_FLAG != 0,
        }
    }

    /// Pack for persistence
    pub fn to_raw(self) -> i32 {
        let mut raw = (self.level & Self::NUMBER_MASK) | (self.next << 16);
        if self.white {
            raw |= Self::WHITE_FLAG;
        }
        if self.header {
            raw |= Self::HEADER_FLAG;
        }
        raw
    }

    /// Depth below the base level
    pub fn depth(self) -> i32 {
        self.level - Self::BASE
    }
}

/// Indentation level of `line` for indentation based folding
///
/// Spaces count one column and tabs advance to the next multiple of 8.
/// Blank lines, lines holding only whitespace and the empty line at the
/// end of the document are flagged white.
pub fn indent_amount<D: Document + ?Sized>(doc: &D, line: usize) -> FoldLevel {
    let line_start = doc.line_start(line);
    let eol = doc.line_start(line + 1).saturating_sub(1);
    let mut pos = line_start;
    let mut ch = doc.byte_at(pos);
    let mut indent = 0;

    while (ch == b' ' || ch == b'\t') && pos < eol {
        if ch == b' ' {
            indent += 1;
        } else {
            indent = (indent / 8 + 1) * 8;
        }
        pos += 1;
        ch = doc.byte_at(pos);
    }

    let mut level = FoldLevel::new(FoldLevel::BASE + indent);
    level.white = line_start == doc.length() || matches!(ch, b' ' | b'\t' | b'\n' | b'\r');
    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::document::TextBuffer;

    #[test]
    fn test_pack_roundtrip() {
        let level = FoldLevel {
            level: FoldLevel::BASE + 3,
            next: FoldLevel::BASE + 4,
            white: true,
            header: true,
        };
        let raw = level.to_raw();
        assert_eq!(raw & FoldLevel::NUMBER_MASK, 0x403);
        assert_eq!(raw >> 16, 0x404);
        assert_eq!(FoldLevel::from_raw(raw), level);
        assert_eq!(level.depth(), 3);
    }

    #[test]
    fn test_indent_amount() {
        let doc = TextBuffer::new("a\n  b\n\tc\n  \n \td\n");
        assert_eq!(indent_amount(&doc, 0), FoldLevel::new(0x400));
        assert_eq!(indent_amount(&doc, 1).level, 0x402);
        assert_eq!(indent_amount(&doc, 2).level, 0x408);
        assert!(indent_amount(&doc, 3).white);
        assert_eq!(indent_amount(&doc, 4).level, 0x408);
        // Empty last line
        assert!(indent_amount(&doc, 5).white);
    }
}
