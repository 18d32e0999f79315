/// Byte row/column coordinates in a text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePosition {
    pub row: usize,
    pub column: usize,
}

/// Maps between byte offsets and (row, column) positions by caching line
/// start offsets. A utility over any buffer: rebuild after the text
/// changes.
#[derive(Debug, Default, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    text_size: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut index = Self::default();
        index.rebuild(text);
        index
    }

    /// Rebuild from text. Line 0 always starts at offset 0.
    pub fn rebuild(&mut self, text: &str) {
        self.line_starts.clear();
        self.line_starts.push(0);
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                self.line_starts.push(offset + 1);
            }
        }
        self.text_size = text.len();
    }

    /// Number of lines, always at least 1.
    pub fn line_count(&self) -> usize {
        self.line_starts.len().max(1)
    }

    pub fn line_start(&self, row: usize) -> usize {
        self.line_starts
            .get(row)
            .copied()
            .unwrap_or(self.text_size)
    }

    /// Byte offset of the line end, before the newline (or at text end).
    pub fn line_end(&self, row: usize) -> usize {
        if row + 1 < self.line_starts.len() {
            self.line_starts[row + 1] - 1
        } else {
            self.text_size
        }
    }

    /// Line length in bytes, excluding the newline.
    pub fn line_length(&self, row: usize) -> usize {
        self.line_end(row) - self.line_start(row)
    }

    pub fn offset_to_position(&self, offset: usize) -> LinePosition {
        let row = match self.line_starts.binary_search(&offset) {
            Ok(row) => row,
            Err(insertion) => insertion.saturating_sub(1),
        };
        LinePosition {
            row,
            column: offset - self.line_starts[row],
        }
    }

    pub fn position_to_offset(&self, row: usize, column: usize) -> usize {
        if row >= self.line_starts.len() {
            return self.text_size;
        }
        self.line_starts[row] + column.min(self.line_length(row))
    }

    pub fn clamp_column(&self, row: usize, column: usize) -> usize {
        column.min(self.line_length(row))
    }

    pub fn text_size(&self) -> usize {
        self.text_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_one_line() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.offset_to_position(0), LinePosition { row: 0, column: 0 });
    }

    #[test]
    fn offsets_round_trip_through_positions() {
        let text = "hello\nworld\n\nlast";
        let index = LineIndex::new(text);
        for offset in 0..=text.len() {
            let pos = index.offset_to_position(offset);
            assert_eq!(
                index.position_to_offset(pos.row, pos.column),
                offset,
                "offset {offset} did not round trip (pos {pos:?})"
            );
        }
    }

    #[test]
    fn line_geometry() {
        let index = LineIndex::new("ab\ncdef\n");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_start(1), 3);
        assert_eq!(index.line_end(1), 7);
        assert_eq!(index.line_length(1), 4);
        // Trailing newline opens an empty last line.
        assert_eq!(index.line_length(2), 0);
    }

    #[test]
    fn column_clamps_to_line_length() {
        let index = LineIndex::new("ab\ncdef");
        assert_eq!(index.position_to_offset(0, 99), 2);
        assert_eq!(index.clamp_column(0, 99), 2);
    }
}
