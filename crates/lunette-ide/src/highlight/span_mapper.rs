use lunette_inputs::{LineCol, LineIndex};
use lunette_syntax::{TextRange, TextSize};

/// Unit in which columns and lengths are measured.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionEncoding {
    Utf8,
    #[default]
    Utf16,
}

impl PositionEncoding {
    fn width(self, text: &str) -> u32 {
        match self {
            Self::Utf8 => TextSize::of(text).into(),
            Self::Utf16 => text.chars().map(char::len_utf16).sum::<usize>() as u32,
        }
    }

    fn char_width(self, c: char) -> u32 {
        match self {
            Self::Utf8 => c.len_utf8() as u32,
            Self::Utf16 => c.len_utf16() as u32,
        }
    }
}

/// One single-line piece of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub line: u32,
    pub column: u32,
    pub length: u32,
}

/// Turns byte ranges of a text into line-local fragments.
#[derive(Clone, Copy)]
pub struct SpanMapper<'a> {
    text: &'a str,
    line_index: &'a LineIndex,
    encoding: PositionEncoding,
}

impl<'a> SpanMapper<'a> {
    pub fn new(text: &'a str, line_index: &'a LineIndex, encoding: PositionEncoding) -> Self {
        Self { text, line_index, encoding }
    }

    pub fn encoding(self) -> PositionEncoding {
        self.encoding
    }

    /// Line and column of `offset`.
    pub fn position(self, offset: TextSize) -> (u32, u32) {
        let LineCol { line, col } = self.line_index.line_col(offset);
        let line_start = offset - TextSize::from(col);
        (line, self.encoding.width(&self.text[TextRange::new(line_start, offset)]))
    }

    /// Offset of a line and column. Columns past the end of the line, or
    /// inside a character, stop before it.
    pub fn offset(self, line: u32, column: u32) -> Option<TextSize> {
        let line_start = self.line_index.offset(LineCol { line, col: 0 })?;
        let mut offset = line_start;
        let mut remaining = column;
        for c in self.text[usize::from(line_start)..].chars() {
            let width = self.encoding.char_width(c);
            if c == '\n' || remaining < width {
                break;
            }
            remaining -= width;
            offset += TextSize::of(c);
        }
        Some(offset)
    }

    /// Splits `range` at line breaks.
    ///
    /// The first fragment starts at the column of `range.start()`, every
    /// following one at column 0. Line terminators belong to no fragment, and
    /// empty fragments are dropped, so a range that ends right after a newline
    /// yields nothing on the next line.
    pub fn map(self, range: TextRange) -> impl Iterator<Item = Fragment> + 'a {
        let (line, column) = self.position(range.start());
        let encoding = self.encoding;

        self.text[range].split_inclusive('\n').enumerate().filter_map(move |(i, piece)| {
            let piece = match piece.strip_suffix('\n') {
                Some(piece) => piece.strip_suffix('\r').unwrap_or(piece),
                None => piece,
            };
            let length = encoding.width(piece);
            (length > 0).then_some(Fragment {
                line: line + i as u32,
                column: if i == 0 { column } else { 0 },
                length,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments(text: &str, range: TextRange, encoding: PositionEncoding) -> Vec<(u32, u32, u32)> {
        let line_index = LineIndex::new(text);
        SpanMapper::new(text, &line_index, encoding)
            .map(range)
            .map(|Fragment { line, column, length }| (line, column, length))
            .collect()
    }

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn single_line_span_is_one_fragment() {
        let text = "local x = 1\nprint(x)\n";
        assert_eq!(fragments(text, range(18, 19), PositionEncoding::Utf16), [(1, 6, 1)]);
    }

    #[test]
    fn multi_line_span_covers_every_line() {
        let text = "x = --[[ one\ntwo\n\nthree ]] 1";
        let comment = range(4, 26);
        assert_eq!(
            fragments(text, comment, PositionEncoding::Utf16),
            [(0, 4, 8), (1, 0, 3), (3, 0, 8)],
        );
    }

    #[test]
    fn crlf_is_not_part_of_a_fragment() {
        let text = "s = [[a\r\nbc]]";
        assert_eq!(fragments(text, range(4, 13), PositionEncoding::Utf8), [(0, 4, 3), (1, 0, 4)]);
    }

    #[test]
    fn span_ending_at_line_start_has_no_empty_tail() {
        let text = "[[ab\n]]";
        assert_eq!(fragments(text, range(0, 5), PositionEncoding::Utf8), [(0, 0, 4)]);
    }

    #[test]
    fn offsets_and_positions() {
        let text = "a = 'ü'\nb\n";
        let line_index = LineIndex::new(text);
        let utf16 = SpanMapper::new(text, &line_index, PositionEncoding::Utf16);
        let utf8 = SpanMapper::new(text, &line_index, PositionEncoding::Utf8);

        assert_eq!(utf16.position(8.into()), (0, 7));
        assert_eq!(utf8.position(8.into()), (0, 8));
        assert_eq!(utf16.offset(0, 6), Some(7.into()));
        assert_eq!(utf8.offset(0, 6), Some(5.into()), "inside `ü`");
        assert_eq!(utf16.offset(0, 40), Some(8.into()));
        assert_eq!(utf16.offset(1, 1), Some(10.into()));
        assert_eq!(utf16.offset(2, 0), Some(11.into()));
    }

    #[test]
    fn columns_follow_the_encoding() {
        // `é` is two bytes and one UTF-16 unit, `𝄞` is four bytes and two units.
        let text = "s = 'é𝄞' x";
        let x = range(13, 14);
        assert_eq!(fragments(text, x, PositionEncoding::Utf8), [(0, 13, 1)]);
        assert_eq!(fragments(text, x, PositionEncoding::Utf16), [(0, 9, 1)]);

        let string = range(4, 12);
        assert_eq!(fragments(text, string, PositionEncoding::Utf8), [(0, 4, 8)]);
        assert_eq!(fragments(text, string, PositionEncoding::Utf16), [(0, 4, 5)]);
    }
}
