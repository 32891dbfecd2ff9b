//! Byte offset to line/column conversion
//!
//! Positions are never tracked while tokenizing or parsing. When an error is built, the
//! offending byte offset is converted by scanning the input from the start, which keeps
//! the hot paths free of bookkeeping.
//!
//! Lines and columns are 1-based; columns count characters, not bytes, so multi-byte
//! UTF-8 text reports the column a reader would count.

use std::fmt;

/// A line:column position in source text (both 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Compute the position of `offset` in `source`.
    ///
    /// Offsets past the end clamp to the end of input; offsets inside a multi-byte
    /// character resolve to that character.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut line = 1;
        let mut column = 1;

        for (byte_pos, ch) in source.char_indices() {
            if byte_pos >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        Self::new(line, column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Return the text of the 1-based `line` in `source`, without its line terminator.
pub fn line_text(source: &str, line: usize) -> Option<&str> {
    source
        .split('\n')
        .nth(line.checked_sub(1)?)
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_character() {
        assert_eq!(Position::from_offset("abc", 0), Position::new(1, 1));
    }

    #[test]
    fn test_second_line() {
        let source = "line1\ninvalid";
        assert_eq!(Position::from_offset(source, 6), Position::new(2, 1));
        assert_eq!(Position::from_offset(source, 9), Position::new(2, 4));
    }

    #[test]
    fn test_offset_on_newline_belongs_to_previous_line() {
        assert_eq!(Position::from_offset("ab\ncd", 2), Position::new(1, 3));
    }

    #[test]
    fn test_end_of_input_clamps() {
        assert_eq!(Position::from_offset("ab\n", 99), Position::new(2, 1));
    }

    #[test]
    fn test_columns_count_characters() {
        // 'é' is two bytes
        let source = "é x";
        assert_eq!(Position::from_offset(source, 3), Position::new(1, 3));
    }

    #[test]
    fn test_line_text() {
        let source = "one\r\ntwo\nthree";
        assert_eq!(line_text(source, 1), Some("one"));
        assert_eq!(line_text(source, 3), Some("three"));
        assert_eq!(line_text(source, 4), None);
        assert_eq!(line_text(source, 0), None);
    }
}
