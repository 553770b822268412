//! Character cursor used by the lexers
//!
//! [`StyleContext`] walks a byte range of a [`Document`] one character
//! at a time, decoding UTF-8, tracking line boundaries and accumulating
//! the pending span. Changing state commits the pending span to the
//! document with the old token type.
//!
//! The range is extended by one sentinel position when it reaches the
//! end of the document so the final span can be closed. Past the end of
//! the range the cursor reports spaces and `at_line_end`.

use super::document::Document;
use super::tokens::TokenType;

/// Identifier text is truncated to this many bytes
pub const MAX_WORD_LEN: usize = 99;

const SPACE: u32 = b' ' as u32;

/// Cursor over a document range with span bookkeeping
pub struct StyleContext<'a, D: Document + ?Sized> {
    doc: &'a mut D,
    end_pos: usize,
    length_document: usize,
    line_doc_end: usize,
    line_start_next: usize,
    line_end: usize,
    segment_start: usize,
    state: TokenType,
    /// Byte offset of `ch`
    pub current_pos: usize,
    /// Line containing `current_pos`
    pub current_line: usize,
    /// `ch` is the first character of a line
    pub at_line_start: bool,
    /// `ch` is the last character of a line (the LF of a CRLF)
    pub at_line_end: bool,
    /// Previous character
    pub ch_prev: u32,
    /// Current character
    pub ch: u32,
    /// Width of `ch` in bytes
    pub width: usize,
    /// Next character
    pub ch_next: u32,
    /// Width of `ch_next` in bytes
    pub width_next: usize,
}

impl<'a, D: Document + ?Sized> StyleContext<'a, D> {
    /// Start a walk over `[start, start + length)` in `init_state`
    pub fn new(doc: &'a mut D, start: usize, length: usize, init_state: TokenType) -> Self {
        let length_document = doc.length();
        let mut end_pos = start + length;
        if end_pos == length_document {
            end_pos += 1;
        }
        let current_line = doc.line_from_position(start);
        let line_start_next = doc.line_start(current_line + 1);
        let line_doc_end = doc.line_from_position(length_document);
        let at_line_start = doc.line_start(current_line) == start;

        let mut sc = Self {
            doc,
            end_pos,
            length_document,
            line_doc_end,
            line_start_next,
            line_end: 0,
            segment_start: start,
            state: init_state,
            current_pos: start,
            current_line,
            at_line_start,
            at_line_end: false,
            ch_prev: 0,
            ch: 0,
            width: 0,
            ch_next: 0,
            width_next: 1,
        };
        sc.line_end = sc.compute_line_end();
        sc.get_next_char();
        sc.ch = sc.ch_next;
        sc.width = sc.width_next;
        sc.get_next_char();
        sc
    }

    fn compute_line_end(&self) -> usize {
        let next = self.line_start_next;
        if self.current_line >= self.line_doc_end || next == 0 {
            return next;
        }
        let last = self.doc.byte_at(next - 1);
        if last == b'\n' && next >= 2 && self.doc.byte_at(next - 2) == b'\r' {
            next - 2
        } else if last == b'\n' || last == b'\r' {
            next - 1
        } else {
            next
        }
    }

    fn get_next_char(&mut self) {
        let (ch, width) = self.doc.char_at(self.current_pos + self.width);
        self.ch_next = ch;
        self.width_next = width;
        self.at_line_end = if self.current_line < self.line_doc_end {
            self.current_pos >= self.line_start_next.saturating_sub(1)
        } else {
            self.current_pos >= self.line_start_next
        };
    }

    /// Current token type of the pending span
    pub fn state(&self) -> TokenType {
        self.state
    }

    /// The document being styled
    pub fn document(&self) -> &D {
        &*self.doc
    }

    /// Mutable access to the document, for line state writes
    pub fn document_mut(&mut self) -> &mut D {
        &mut *self.doc
    }

    /// Whether the walk has not reached the end of the range
    pub fn more(&self) -> bool {
        self.current_pos < self.end_pos
    }

    /// Advance one character
    pub fn forward(&mut self) {
        if self.current_pos < self.end_pos {
            self.at_line_start = self.at_line_end;
            if self.at_line_start {
                self.current_line += 1;
                self.line_start_next = self.doc.line_start(self.current_line + 1);
                self.line_end = self.compute_line_end();
            }
            self.ch_prev = self.ch;
            self.current_pos += self.width;
            self.ch = self.ch_next;
            self.width = self.width_next;
            self.get_next_char();
        } else {
            self.at_line_start = false;
            self.ch_prev = SPACE;
            self.ch = SPACE;
            self.ch_next = SPACE;
            self.at_line_end = true;
        }
    }

    /// Advance `n` characters
    pub fn forward_by(&mut self, n: usize) {
        for _ in 0..n {
            self.forward();
        }
    }

    /// Advance until at least `n` bytes have been consumed
    pub fn forward_bytes(&mut self, n: usize) {
        let target = self.current_pos + n;
        while self.current_pos < target && self.more() {
            self.forward();
        }
    }

    /// End of the pending span, clamped to the document
    fn span_end(&self) -> usize {
        self.current_pos.min(self.length_document)
    }

    /// Commit the pending span up to `end` (exclusive) as `token`
    pub fn colour_to(&mut self, end: usize, token: TokenType) {
        let end = end.min(self.length_document);
        if end > self.segment_start {
            self.doc.set_style_range(self.segment_start, end, token);
            self.segment_start = end;
        }
    }

    /// Commit the pending span with the current state, then switch
    pub fn set_state(&mut self, state: TokenType) {
        let end = self.span_end();
        self.colour_to(end, self.state);
        self.state = state;
    }

    /// Advance one character, then [`set_state`](Self::set_state)
    pub fn forward_set_state(&mut self, state: TokenType) {
        self.forward();
        self.set_state(state);
    }

    /// Relabel the pending span without committing it
    pub fn change_state(&mut self, state: TokenType) {
        self.state = state;
    }

    /// Commit the trailing span
    pub fn complete(&mut self) {
        let end = self.span_end();
        self.colour_to(end, self.state);
    }

    /// Bytes in the pending span
    pub fn length_current(&self) -> usize {
        self.current_pos.saturating_sub(self.segment_start)
    }

    /// Byte at a relative offset, 0 outside the document
    pub fn get_relative(&self, n: isize) -> u32 {
        self.current_pos
            .checked_add_signed(n)
            .map_or(0, |pos| u32::from(self.doc.byte_at(pos)))
    }

    /// Character at a relative character offset, 0 outside the document
    pub fn get_relative_character(&self, n: isize) -> u32 {
        if n == 0 {
            return self.ch;
        }
        let mut pos = self.current_pos;
        if n > 0 {
            for _ in 0..n {
                if pos >= self.length_document {
                    return 0;
                }
                pos += self.doc.char_at(pos).1;
            }
        } else {
            for _ in 0..n.unsigned_abs() {
                if pos == 0 {
                    return 0;
                }
                pos = self.doc.move_position_by_chars(pos, -1);
            }
        }
        self.doc.char_at(pos).0
    }

    /// `ch` equals the ASCII byte `c`
    pub fn is(&self, c: u8) -> bool {
        self.ch == u32::from(c)
    }

    /// `ch_next` equals the ASCII byte `c`
    pub fn next_is(&self, c: u8) -> bool {
        self.ch_next == u32::from(c)
    }

    /// `ch` and `ch_next` equal `a` and `b`
    pub fn matches_pair(&self, a: u8, b: u8) -> bool {
        self.is(a) && self.next_is(b)
    }

    /// The text at the cursor starts with `s` (ASCII)
    pub fn matches_str(&self, s: &str) -> bool {
        let bytes = s.as_bytes();
        match bytes {
            [] => true,
            [first, rest @ ..] => {
                if !self.is(*first) {
                    return false;
                }
                match rest {
                    [] => true,
                    [second, tail @ ..] => {
                        self.next_is(*second)
                            && tail.iter().enumerate().all(|(i, &b)| {
                                self.doc.byte_at(self.current_pos + i + 2) == b
                            })
                    }
                }
            }
        }
    }

    /// Like [`matches_str`](Self::matches_str) ignoring ASCII case; `s`
    /// must be lower case
    pub fn matches_ignore_case(&self, s: &str) -> bool {
        s.bytes().enumerate().all(|(i, b)| {
            let actual = match i {
                0 => self.ch,
                1 => self.ch_next,
                _ => u32::from(self.doc.byte_at(self.current_pos + i)),
            };
            u8::try_from(actual).is_ok_and(|a| a.to_ascii_lowercase() == b)
        })
    }

    /// The cursor sits on the line terminator (or end of the last line)
    pub fn match_line_end(&self) -> bool {
        self.current_pos == self.line_end
    }

    /// Text of the pending span, truncated to [`MAX_WORD_LEN`] bytes
    pub fn current_text(&self) -> String {
        let end = self.current_pos.min(self.segment_start + MAX_WORD_LEN);
        let mut end = end.min(self.length_document);
        // Never cut a multi-byte character in half
        while end > self.segment_start
            && end < self.current_pos
            && (self.doc.byte_at(end) & 0xC0) == 0x80
        {
            end -= 1;
        }
        let bytes: Vec<u8> = (self.segment_start..end)
            .map(|pos| self.doc.byte_at(pos))
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// [`current_text`](Self::current_text) in ASCII lower case
    pub fn current_text_lowered(&self) -> String {
        self.current_text().to_ascii_lowercase()
    }
}
