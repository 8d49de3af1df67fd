//! SIMD-accelerated byte scanning using memchr
//!
//! Uses memchr crate for fast byte searching with SIMD acceleration:
//! - SSE2 (default x86_64)
//! - AVX2 (runtime detection)
//! - NEON (aarch64)
//!
//! Also tracks (line, column) positions for entity boundaries.

use memchr::{memchr, memmem};

use super::entity::Position;

/// Cursor over an input buffer
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Peek at byte at offset from current position
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Check if input at `pos + offset` starts with `needle`
    #[inline]
    pub fn starts_with_at(&self, offset: usize, needle: &[u8]) -> bool {
        self.input
            .get(self.pos + offset..)
            .is_some_and(|rest| rest.starts_with(needle))
    }

    /// Find next occurrence of a specific byte at or after the cursor
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr(byte, &self.input[self.pos..]).map(|i| self.pos + i)
    }

    /// Find a multi-byte terminator (`-->`, `?>`, `]]>`) starting at `from`
    #[inline]
    pub fn find_terminator(&self, from: usize, terminator: &[u8]) -> Option<usize> {
        let haystack = self.input.get(from..)?;
        memmem::find(haystack, terminator).map(|i| from + i)
    }
}

/// XML whitespace: space, tab, CR, LF
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// True if every byte is XML whitespace
#[inline]
pub fn is_all_whitespace(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| is_whitespace(b))
}

/// Incremental byte offset to (line, column) conversion
///
/// Entity boundaries arrive in non-decreasing order, so the tracker only
/// ever walks forward; a request behind the cursor restarts from zero.
pub struct LineTracker {
    offset: usize,
    position: Position,
}

impl LineTracker {
    pub fn new() -> Self {
        LineTracker {
            offset: 0,
            position: Position::START,
        }
    }

    /// Position of `offset` in `input`
    pub fn at(&mut self, input: &[u8], offset: usize) -> Position {
        let offset = offset.min(input.len());
        if offset < self.offset {
            self.offset = 0;
            self.position = Position::START;
        }
        for &b in &input[self.offset..offset] {
            if b == b'\n' {
                self.position.line += 1;
                self.position.column = 1;
            } else if b & 0xC0 != 0x80 {
                self.position.column += 1;
            }
        }
        self.offset = offset;
        self.position
    }
}

impl Default for LineTracker {
    fn default() -> Self {
        Self::new()
    }
}
