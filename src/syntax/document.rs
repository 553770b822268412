//! Host document access
//!
//! The lexers never own text. They read characters, line boundaries and
//! per-line state through the [`Document`] trait and write styles, line
//! states and fold levels back through it. [`TextBuffer`] is the
//! in-memory implementation used by the highlighter and the tests.

use super::fold::FoldLevel;
use super::style::Span;
use super::tokens::TokenType;

/// Character encoding of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Every byte is one character
    EightBit,
    /// Variable width UTF-8
    #[default]
    Utf8,
}

/// Access to the host's text and annotation arrays
pub trait Document {
    /// Document length in bytes
    fn length(&self) -> usize;

    /// Byte at `pos`, or 0 when out of range
    fn byte_at(&self, pos: usize) -> u8;

    /// Encoding used to decode characters
    fn encoding(&self) -> Encoding;

    /// Line containing `pos`; positions past the end map to the last line
    fn line_from_position(&self, pos: usize) -> usize;

    /// First byte of `line`; lines past the end start at `length()`
    fn line_start(&self, line: usize) -> usize;

    /// Number of lines (at least one)
    fn line_count(&self) -> usize;

    /// Persisted lexer state of `line`
    fn line_state(&self, line: usize) -> i32;

    /// Store the lexer state of `line`
    fn set_line_state(&mut self, line: usize, state: i32);

    /// Packed fold level of `line`
    fn level(&self, line: usize) -> i32;

    /// Store the packed fold level of `line`
    fn set_level(&mut self, line: usize, level: i32);

    /// Style id stored at `pos`, or 0 when out of range
    fn style_at(&self, pos: usize) -> u8;

    /// Commit a styled span `[start, end)`
    fn set_style_range(&mut self, start: usize, end: usize, token: TokenType);

    /// Decode the character starting at `pos` as `(code point, width)`
    ///
    /// Out of range positions decode as `(0, 1)`. Invalid UTF-8 decodes
    /// one byte at a time.
    fn char_at(&self, pos: usize) -> (u32, usize) {
        if pos >= self.length() {
            return (0, 1);
        }
        let lead = self.byte_at(pos);
        if self.encoding() == Encoding::EightBit || lead < 0x80 {
            return (u32::from(lead), 1);
        }
        decode_utf8(lead, |i| self.byte_at(pos + i)).unwrap_or((u32::from(lead), 1))
    }

    /// Move `chars` characters from `pos`, returning the new position
    ///
    /// Stops at the document boundaries.
    fn move_position_by_chars(&self, pos: usize, chars: isize) -> usize {
        let mut pos = pos;
        if self.encoding() == Encoding::EightBit {
            let target = pos as isize + chars;
            return target.clamp(0, self.length() as isize) as usize;
        }
        if chars >= 0 {
            for _ in 0..chars {
                if pos >= self.length() {
                    break;
                }
                pos += self.char_at(pos).1;
            }
        } else {
            for _ in 0..chars.unsigned_abs() {
                if pos == 0 {
                    break;
                }
                pos -= 1;
                // Walk back over continuation bytes to the lead byte
                let mut steps = 0;
                while pos > 0 && steps < 3 && (self.byte_at(pos) & 0xC0) == 0x80 {
                    pos -= 1;
                    steps += 1;
                }
            }
        }
        pos
    }
}

/// Decode a multi-byte UTF-8 sequence whose lead byte is `lead`
fn decode_utf8(lead: u8, byte: impl Fn(usize) -> u8) -> Option<(u32, usize)> {
    let (width, initial) = match lead {
        0xC2..=0xDF => (2, u32::from(lead & 0x1F)),
        0xE0..=0xEF => (3, u32::from(lead & 0x0F)),
        0xF0..=0xF4 => (4, u32::from(lead & 0x07)),
        _ => return None,
    };
    let mut code = initial;
    for i in 1..width {
        let b = byte(i);
        if (b & 0xC0) != 0x80 {
            return None;
        }
        code = (code << 6) | u32::from(b & 0x3F);
    }
    // Reject overlong forms and surrogates
    let valid = match width {
        3 => code >= 0x800 && !(0xD800..=0xDFFF).contains(&code),
        4 => (0x10000..=0x10FFFF).contains(&code),
        _ => true,
    };
    valid.then_some((code, width))
}

/// In-memory document with style, line state and fold level arrays
#[derive(Debug, Clone)]
pub struct TextBuffer {
    /// Raw document bytes
    text: Vec<u8>,
    /// Byte offset of the start of each line
    line_starts: Vec<usize>,
    /// One style id per byte
    styles: Vec<u8>,
    /// One lexer state per line
    line_states: Vec<i32>,
    /// One packed fold level per line
    levels: Vec<i32>,
    /// Character encoding
    encoding: Encoding,
    /// Spans committed since the log was last taken
    spans: Vec<Span>,
}

impl TextBuffer {
    /// Create a UTF-8 buffer from text
    pub fn new(text: &str) -> Self {
        Self::from_bytes(text.as_bytes().to_vec(), Encoding::Utf8)
    }

    /// Create a buffer from raw bytes in the given encoding
    pub fn from_bytes(text: Vec<u8>, encoding: Encoding) -> Self {
        let line_starts = compute_line_starts(&text);
        let lines = line_starts.len();
        Self {
            styles: vec![0; text.len()],
            text,
            line_starts,
            line_states: vec![0; lines],
            levels: vec![FoldLevel::BASE; lines],
            encoding,
            spans: Vec::new(),
        }
    }

    /// Document bytes
    pub fn bytes(&self) -> &[u8] {
        &self.text
    }

    /// Text of `[start, end)`, lossily decoded
    pub fn text_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.text.len());
        let start = start.min(end);
        String::from_utf8_lossy(&self.text[start..end]).into_owned()
    }

    /// Text of a line including its terminator
    pub fn line_text(&self, line: usize) -> String {
        self.text_range(self.line_start(line), self.line_start(line + 1))
    }

    /// Style ids, one per byte
    pub fn styles(&self) -> &[u8] {
        &self.styles
    }

    /// Style of `pos` as a token type
    pub fn token_at(&self, pos: usize) -> TokenType {
        TokenType::from_id(self.style_at(pos))
    }

    /// Maximal runs of equally styled bytes, covering the whole buffer
    pub fn style_runs(&self) -> Vec<Span> {
        let mut runs = Vec::new();
        let mut start = 0;
        for pos in 1..=self.styles.len() {
            if pos == self.styles.len() || self.styles[pos] != self.styles[start] {
                runs.push(Span::new(start, pos, self.token_at(start)));
                start = pos;
            }
        }
        runs
    }

    /// Spans committed since the last call, oldest first
    pub fn take_spans(&mut self) -> Vec<Span> {
        std::mem::take(&mut self.spans)
    }

    /// Spans committed since the log was last taken
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Insert text at byte position `pos`
    pub fn insert(&mut self, pos: usize, text: &str) {
        let pos = pos.min(self.text.len());
        let line = self.line_from_position(pos);
        let before = self.line_starts.len();

        self.text.splice(pos..pos, text.bytes());
        self.styles.splice(pos..pos, std::iter::repeat(0).take(text.len()));
        self.line_starts = compute_line_starts(&self.text);

        let added = self.line_starts.len().saturating_sub(before);
        let at = (line + 1).min(self.line_states.len());
        self.line_states.splice(at..at, std::iter::repeat(0).take(added));
        self.levels
            .splice(at..at, std::iter::repeat(FoldLevel::BASE).take(added));
    }

    /// Delete the bytes `[start, end)`
    pub fn delete(&mut self, start: usize, end: usize) {
        let end = end.min(self.text.len());
        let start = start.min(end);
        if start == end {
            return;
        }
        let line = self.line_from_position(start);
        let before = self.line_starts.len();

        self.text.drain(start..end);
        self.styles.drain(start..end);
        self.line_starts = compute_line_starts(&self.text);

        let removed = before.saturating_sub(self.line_starts.len());
        let from = (line + 1).min(self.line_states.len());
        let to = (from + removed).min(self.line_states.len());
        self.line_states.drain(from..to);
        self.levels.drain(from..to);
    }
}

/// Line start offsets for `text`; CR, LF and CRLF end a line
fn compute_line_starts(text: &[u8]) -> Vec<usize> {
    let mut starts = vec![0];
    let mut i = 0;
    while i < text.len() {
        match text[i] {
            b'\r' if text.get(i + 1) == Some(&b'\n') => {
                starts.push(i + 2);
                i += 2;
                continue;
            }
            b'\r' | b'\n' => starts.push(i + 1),
            _ => {}
        }
        i += 1;
    }
    starts
}

impl Document for TextBuffer {
    fn length(&self) -> usize {
        self.text.len()
    }

    fn byte_at(&self, pos: usize) -> u8 {
        self.text.get(pos).copied().unwrap_or(0)
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn line_from_position(&self, pos: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= pos)
            .saturating_sub(1)
    }

    fn line_start(&self, line: usize) -> usize {
        self.line_starts
            .get(line)
            .copied()
            .unwrap_or(self.text.len())
    }

    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line_state(&self, line: usize) -> i32 {
        self.line_states.get(line).copied().unwrap_or(0)
    }

    fn set_line_state(&mut self, line: usize, state: i32) {
        if let Some(slot) = self.line_states.get_mut(line) {
            *slot = state;
        }
    }

    fn level(&self, line: usize) -> i32 {
        self.levels.get(line).copied().unwrap_or(FoldLevel::BASE)
    }

    fn set_level(&mut self, line: usize, level: i32) {
        if let Some(slot) = self.levels.get_mut(line) {
            *slot = level;
        }
    }

    fn style_at(&self, pos: usize) -> u8 {
        self.styles.get(pos).copied().unwrap_or(0)
    }

    fn set_style_range(&mut self, start: usize, end: usize, token: TokenType) {
        let end = end.min(self.styles.len());
        if start >= end {
            return;
        }
        self.styles[start..end].fill(token.id());
        self.spans.push(Span::new(start, end, token));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_table() {
        let doc = TextBuffer::new("ab\ncd\r\nef\rgh");
        assert_eq!(doc.line_count(), 4);
        assert_eq!(doc.line_start(1), 3);
        assert_eq!(doc.line_start(2), 7);
        assert_eq!(doc.line_start(3), 10);
        assert_eq!(doc.line_start(9), doc.length());
        assert_eq!(doc.line_from_position(0), 0);
        assert_eq!(doc.line_from_position(2), 0);
        assert_eq!(doc.line_from_position(6), 1);
        assert_eq!(doc.line_from_position(100), 3);
    }

    #[test]
    fn test_safe_reads() {
        let doc = TextBuffer::new("x");
        assert_eq!(doc.byte_at(0), b'x');
        assert_eq!(doc.byte_at(1), 0);
        assert_eq!(doc.style_at(5), 0);
        assert_eq!(doc.char_at(7), (0, 1));
    }

    #[test]
    fn test_utf8_decoding() {
        let doc = TextBuffer::new("aé你😀");
        assert_eq!(doc.char_at(0), ('a' as u32, 1));
        assert_eq!(doc.char_at(1), ('é' as u32, 2));
        assert_eq!(doc.char_at(3), ('你' as u32, 3));
        assert_eq!(doc.char_at(6), ('😀' as u32, 4));
        assert_eq!(doc.move_position_by_chars(0, 3), 6);
        assert_eq!(doc.move_position_by_chars(6, -2), 1);
    }

    #[test]
    fn test_invalid_utf8_is_bytewise() {
        let doc = TextBuffer::from_bytes(vec![0xE4, b'a', 0xFF], Encoding::Utf8);
        assert_eq!(doc.char_at(0), (0xE4, 1));
        assert_eq!(doc.char_at(2), (0xFF, 1));
    }

    #[test]
    fn test_eight_bit_encoding() {
        let doc = TextBuffer::from_bytes("é".as_bytes().to_vec(), Encoding::EightBit);
        assert_eq!(doc.char_at(0), (0xC3, 1));
        assert_eq!(doc.move_position_by_chars(0, 5), 2);
    }

    #[test]
    fn test_style_log() {
        let mut doc = TextBuffer::new("abcdef");
        doc.set_style_range(0, 3, TokenType::Keyword);
        doc.set_style_range(3, 3, TokenType::Number);
        doc.set_style_range(3, 10, TokenType::String);
        assert_eq!(doc.token_at(1), TokenType::Keyword);
        assert_eq!(doc.token_at(5), TokenType::String);
        let spans = doc.take_spans();
        assert_eq!(
            spans,
            vec![
                Span::new(0, 3, TokenType::Keyword),
                Span::new(3, 6, TokenType::String)
            ]
        );
        assert!(doc.spans().is_empty());
    }

    #[test]
    fn test_insert_and_delete_keep_tables_aligned() {
        let mut doc = TextBuffer::new("one\ntwo\n");
        doc.set_line_state(1, 7);
        doc.insert(0, "zero\n");
        assert_eq!(doc.line_count(), 4);
        assert_eq!(doc.line_text(1), "one\n");
        assert_eq!(doc.line_state(2), 7);

        doc.delete(0, 5);
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_text(0), "one\n");
        assert_eq!(doc.line_state(1), 7);
        assert_eq!(doc.styles().len(), doc.length());
    }
}
