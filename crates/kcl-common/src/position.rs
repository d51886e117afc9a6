//! Byte-offset spans and line/character positions.
//!
//! [`Range`] tracks byte offsets into source text, the representation every
//! token and AST node carries. [`LineIndex`] converts those offsets to and
//! from [`Position`] (0-based line/character, the shape LSP and the CLI
//! report use) on demand, rather than tracking line/column during lexing.

use serde::Serialize;

/// Byte-offset span into source text. Half-open: `start` is inclusive,
/// `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: u32,
    pub end: u32,
}

impl Range {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "range start ({start}) must be <= end ({end})");
        Self { start, end }
    }

    pub fn point(offset: u32) -> Self {
        Self { start: offset, end: offset }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn merge(self, other: Range) -> Range {
        Range { start: self.start.min(other.start), end: self.end.max(other.end) }
    }

    /// Inclusive at both ends, so a cursor sitting at the end of an
    /// identifier still counts as "on" it.
    pub fn contains_offset(&self, offset: u32) -> bool {
        offset >= self.start && offset <= self.end
    }
}

/// 0-based (line, character) position. `character` counts UTF-16 code
/// units within the line, matching the LSP wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A (start, end) pair of [`Position`]s, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionRange {
    pub start: Position,
    pub end: Position,
}

impl PositionRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Precomputed line-start offsets, built once per source text, used to
/// convert byte offsets to/from [`Position`]s via binary search.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    source_len: u32,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts, source_len: source.len() as u32 }
    }

    /// Byte offset -> 0-based (line, character) Position. `character` is a
    /// byte-count-within-line approximation upgraded to UTF-16 units by the
    /// caller when the source is known to contain multi-byte characters.
    pub fn offset_to_position(&self, offset: u32) -> Position {
        let offset = offset.min(self.source_len);
        let line_idx = self.line_starts.partition_point(|&start| start <= offset);
        let line_idx = line_idx.saturating_sub(1);
        let character = offset - self.line_starts[line_idx];
        Position::new(line_idx as u32, character)
    }

    pub fn position_to_offset(&self, pos: Position) -> u32 {
        let line_idx = pos.line as usize;
        if line_idx >= self.line_starts.len() {
            return self.source_len;
        }
        let line_start = self.line_starts[line_idx];
        let line_end = self
            .line_starts
            .get(line_idx + 1)
            .map(|&s| s.saturating_sub(1))
            .unwrap_or(self.source_len);
        (line_start + pos.character).min(line_end)
    }

    pub fn range_to_position_range(&self, range: Range) -> PositionRange {
        PositionRange::new(
            self.offset_to_position(range.start),
            self.offset_to_position(range.end),
        )
    }

    /// 1-based (line, column) pair, for CLI diagnostic reports.
    pub fn line_col_1based(&self, offset: u32) -> (u32, u32) {
        let pos = self.offset_to_position(offset);
        (pos.line + 1, pos.character + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_len_and_empty() {
        let r = Range::new(5, 10);
        assert_eq!(r.len(), 5);
        assert!(!r.is_empty());
        assert!(Range::point(3).is_empty());
    }

    #[test]
    fn range_merge() {
        let a = Range::new(5, 10);
        let b = Range::new(8, 15);
        assert_eq!(a.merge(b), Range::new(5, 15));
    }

    #[test]
    fn range_contains_offset_is_inclusive_both_ends() {
        let r = Range::new(4, 8);
        assert!(r.contains_offset(4));
        assert!(r.contains_offset(8));
        assert!(!r.contains_offset(9));
    }

    #[test]
    fn line_index_offset_roundtrip() {
        let src = "let x = 1\nlet y = 2\n";
        let idx = LineIndex::new(src);
        let pos = idx.offset_to_position(14); // 'y' inside second line
        assert_eq!(pos, Position::new(1, 4));
        assert_eq!(idx.position_to_offset(pos), 14);
    }

    #[test]
    fn line_index_single_line_is_line_zero() {
        let idx = LineIndex::new("let x = 10");
        assert_eq!(idx.offset_to_position(0), Position::new(0, 0));
        assert_eq!(idx.offset_to_position(3), Position::new(0, 3));
    }

    #[test]
    fn line_col_1based_matches_spec_cli_convention() {
        let idx = LineIndex::new("a\nbc");
        assert_eq!(idx.line_col_1based(0), (1, 1));
        assert_eq!(idx.line_col_1based(2), (2, 1));
    }
}
