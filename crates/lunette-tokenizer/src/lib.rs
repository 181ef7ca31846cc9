//! Lua 5.4 lexer.
//!
//! Every token carries the trivia around it: trailing trivia runs up to and
//! including the first newline after the token, everything else belongs to
//! the next token as leading trivia. Trivia at the end of the input is
//! leading trivia of `EOF`.

mod cursor;

use cursor::Cursor;
pub use lunette_syntax::SyntaxKind;
use lunette_syntax::SyntaxKind::*;
use lunette_syntax::{TriviaPiece, TriviaPieceKind};
use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub leading: Vec<TriviaPiece>,
    pub kind: SyntaxKind,
    pub range: TextRange,
    pub trailing: Vec<TriviaPiece>,
}

impl Token {
    const EOF: Self = Self {
        leading: Vec::new(),
        kind: EOF,
        range: TextRange::empty(TextSize::new(0)),
        trailing: Vec::new(),
    };
}

/// Streaming tokenizer with two tokens of lookahead.
pub struct Tokenizer<'a> {
    text: &'a str,
    cursor: Cursor<'a>,
    current: Token,
    lookahead: Token,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut tokenizer =
            Self { text, cursor: Cursor::new(text), current: Token::EOF, lookahead: Token::EOF };
        tokenizer.current = tokenizer.lex();
        tokenizer.lookahead = tokenizer.lex();
        tokenizer
    }

    pub fn peek(&self) -> &Token {
        &self.current
    }

    /// The token after [`Tokenizer::peek`].
    pub fn peek_second(&self) -> &Token {
        &self.lookahead
    }

    pub fn next_token(&mut self) -> Token {
        let next = self.lex();
        let lookahead = std::mem::replace(&mut self.lookahead, next);
        std::mem::replace(&mut self.current, lookahead)
    }

    fn offset(&self) -> TextSize {
        TextSize::of(self.text) - self.cursor.len()
    }

    fn range(&self) -> TextRange {
        let end = self.offset();
        let len = self.cursor.pos_within_token();
        TextRange::at(end - len, len)
    }

    fn text(&self) -> &'a str {
        &self.text[self.range()]
    }

    fn lex(&mut self) -> Token {
        let mut leading = Vec::new();
        self.trivia(&mut leading, false);
        let (kind, range) = self.syntax_kind();
        let mut trailing = Vec::new();
        if kind != EOF {
            self.trivia(&mut trailing, true);
        }
        Token { leading, kind, range, trailing }
    }

    fn trivia(&mut self, pieces: &mut Vec<TriviaPiece>, trailing: bool) {
        while !self.cursor.is_eof() {
            let kind = match self.cursor.peek() {
                '\n' | '\r' => {
                    if self.cursor.advance() == '\r' {
                        self.cursor.eat('\n');
                    }
                    TriviaPieceKind::Newline
                }
                ' ' | '\t' | '\x0b' | '\x0c' => {
                    self.cursor.advance_while(|c| matches!(c, ' ' | '\t' | '\x0b' | '\x0c'));
                    TriviaPieceKind::Whitespace
                }
                '-' if self.cursor.second() == '-' => {
                    self.cursor.advance_bytes(2);
                    match self.cursor.eat('[').then(|| self.long_bracket_level()).flatten() {
                        Some(level) => {
                            self.long_bracket(level);
                            TriviaPieceKind::BlockComment
                        }
                        None => {
                            self.cursor.advance_while(|c| !matches!(c, '\n' | '\r'));
                            TriviaPieceKind::SingleLineComment
                        }
                    }
                }
                '#' if self.offset() == TextSize::new(0) && self.cursor.second() == '!' => {
                    self.cursor.advance_while(|c| !matches!(c, '\n' | '\r'));
                    TriviaPieceKind::Shebang
                }
                _ => break,
            };

            pieces.push(TriviaPiece::new(kind, self.cursor.pos_within_token()));
            self.cursor.reset_pos_within_token();

            if trailing && kind == TriviaPieceKind::Newline {
                break;
            }
        }
    }

    fn syntax_kind(&mut self) -> (SyntaxKind, TextRange) {
        if self.cursor.is_eof() {
            return (EOF, self.range());
        }

        let kind = match self.cursor.advance() {
            '(' => LEFT_PAREN,
            ')' => RIGHT_PAREN,
            '[' => match self.long_bracket_level() {
                Some(level) => {
                    self.long_bracket(level);
                    LONG_STRING
                }
                None => LEFT_BRACKET,
            },
            ']' => RIGHT_BRACKET,
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            ',' => COMMA,
            ';' => SEMICOLON,
            ':' => {
                if self.cursor.eat(':') {
                    DOUBLE_COLON
                } else {
                    COLON
                }
            }
            '.' => {
                if self.cursor.eat('.') {
                    if self.cursor.eat('.') { DOT3 } else { DOT2 }
                } else if self.cursor.peek().is_ascii_digit() {
                    self.number('.')
                } else {
                    DOT
                }
            }
            '=' => {
                if self.cursor.eat('=') {
                    EQ2
                } else {
                    EQ
                }
            }
            '+' => PLUS,
            '-' => MINUS,
            '*' => STAR,
            '/' => {
                if self.cursor.eat('/') {
                    DOUBLE_SLASH
                } else {
                    SLASH
                }
            }
            '%' => PERCENT,
            '^' => CARET,
            '#' => HASH,
            '&' => AMP,
            '|' => PIPE,
            '~' => {
                if self.cursor.eat('=') {
                    NEQ
                } else {
                    TILDE
                }
            }
            '<' => {
                if self.cursor.eat('<') {
                    SHL
                } else if self.cursor.eat('=') {
                    LTEQ
                } else {
                    LT
                }
            }
            '>' => {
                if self.cursor.eat('>') {
                    SHR
                } else if self.cursor.eat('=') {
                    GTEQ
                } else {
                    GT
                }
            }
            quote @ ('"' | '\'') => {
                self.short_string(quote);
                STRING
            }
            first_char @ '0'..='9' => self.number(first_char),
            'A'..='Z' | 'a'..='z' | '_' => {
                self.cursor.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
                SyntaxKind::from_keyword(self.text()).unwrap_or(IDENT)
            }
            _ => UNKNOWN,
        };

        let range = self.range();
        self.cursor.reset_pos_within_token();

        (kind, range)
    }

    fn number(&mut self, first_char: char) -> SyntaxKind {
        let hex = first_char == '0' && matches!(self.cursor.peek(), 'x' | 'X');
        if hex {
            self.cursor.advance();
        }
        let exponent: [char; 2] = if hex { ['p', 'P'] } else { ['e', 'E'] };

        while !self.cursor.is_eof() {
            match self.cursor.peek() {
                c if exponent.contains(&c) => {
                    self.cursor.advance();
                    if matches!(self.cursor.peek(), '+' | '-') {
                        self.cursor.advance();
                    }
                }
                '.' if self.cursor.second() != '.' => {
                    self.cursor.advance();
                }
                c if c.is_ascii_digit() || (hex && c.is_ascii_hexdigit()) => {
                    self.cursor.advance();
                }
                _ => break,
            }
        }

        NUMBER
    }

    fn short_string(&mut self, quote: char) {
        while !self.cursor.is_eof() {
            match self.cursor.peek() {
                '\\' => {
                    self.cursor.advance();
                    match self.cursor.peek() {
                        '\r' => {
                            self.cursor.advance();
                            self.cursor.eat('\n');
                        }
                        'z' => {
                            self.cursor.advance();
                            self.cursor.advance_while(char::is_whitespace);
                        }
                        _ if self.cursor.is_eof() => {}
                        _ => {
                            self.cursor.advance();
                        }
                    }
                }
                // Unterminated; the newline is not part of the string.
                '\n' | '\r' => return,
                c => {
                    self.cursor.advance();
                    if c == quote {
                        return;
                    }
                }
            }
        }
    }

    /// Level of a long bracket whose first `[` was just consumed.
    fn long_bracket_level(&self) -> Option<usize> {
        let rest = self.cursor.rest();
        let level = rest.bytes().take_while(|&b| b == b'=').count();
        (rest.as_bytes().get(level) == Some(&b'[')).then_some(level)
    }

    /// Consumes the remainder of a long bracket `[==[ ... ]==]`.
    ///
    /// An unterminated bracket runs to the end of the input.
    fn long_bracket(&mut self, level: usize) {
        self.cursor.advance_bytes(level + 1);

        let close = format!("]{}]", "=".repeat(level));
        let rest = self.cursor.rest();
        let consumed = rest.find(&close).map_or(rest.len(), |end| end + close.len());
        self.cursor.advance_bytes(consumed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_text<'a>(token: &Token, text: &'a str) -> &'a str {
        &text[token.range]
    }

    fn kinds(text: &str) -> Vec<(SyntaxKind, &str)> {
        let mut tokenizer = Tokenizer::new(text);
        let mut kinds = Vec::new();
        loop {
            let token = tokenizer.next_token();
            if token.kind == EOF {
                break kinds;
            }
            kinds.push((token.kind, token_text(&token, text)));
        }
    }

    fn trivia(pieces: &[TriviaPiece]) -> Vec<(TriviaPieceKind, u32)> {
        pieces.iter().map(|piece| (piece.kind, piece.len.into())).collect()
    }

    #[test]
    fn test_number_literals() {
        let inputs = [
            "3", "345", "0xff", "0xBEBADA", "3.0", "3.1416", "314.16e-2", "0.31416E1", "34e1",
            "0x0.1E", "0xA23p-4", "0X1.921FB54442D18P+1", ".5",
        ];

        for input in inputs {
            let mut tokenizer = Tokenizer::new(input);
            let token = tokenizer.next_token();
            assert_eq!(token.kind, NUMBER, "Input: '{input}'");
            assert_eq!(token_text(&token, input), input, "Input: '{input}'");
            assert!(tokenizer.cursor.is_eof(), "Tokenizer did not consume all of '{input}'");
        }
    }

    #[test]
    fn test_number_followed_by_concat() {
        assert_eq!(kinds("1..2"), [(NUMBER, "1"), (DOT2, ".."), (NUMBER, "2")]);
    }

    #[test]
    fn test_strings() {
        assert_eq!(kinds(r#""a\"b" 'c'"#), [(STRING, r#""a\"b""#), (STRING, "'c'")]);
        assert_eq!(kinds("[[a\nb]] [==[x]]y]==]"), [
            (LONG_STRING, "[[a\nb]]"),
            (LONG_STRING, "[==[x]]y]==]")
        ]);
        assert_eq!(kinds("t[ [=[s]=] ]"), [
            (IDENT, "t"),
            (LEFT_BRACKET, "["),
            (LONG_STRING, "[=[s]=]"),
            (RIGHT_BRACKET, "]")
        ]);
    }

    #[test]
    fn test_unterminated_string_stops_at_newline() {
        assert_eq!(kinds("'abc\nx"), [(STRING, "'abc"), (IDENT, "x")]);
    }

    #[test]
    fn test_operators() {
        let text = "+ - * / // % ^ # & ~ | << >> == ~= <= >= < > = :: : . .. ...";
        let expected = [
            PLUS,
            MINUS,
            STAR,
            SLASH,
            DOUBLE_SLASH,
            PERCENT,
            CARET,
            HASH,
            AMP,
            TILDE,
            PIPE,
            SHL,
            SHR,
            EQ2,
            NEQ,
            LTEQ,
            GTEQ,
            LT,
            GT,
            EQ,
            DOUBLE_COLON,
            COLON,
            DOT,
            DOT2,
            DOT3,
        ];
        let actual: Vec<_> = kinds(text).into_iter().map(|(kind, _)| kind).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_keywords_and_names() {
        assert_eq!(kinds("local function _G end2"), [
            (LOCAL_KW, "local"),
            (FUNCTION_KW, "function"),
            (IDENT, "_G"),
            (IDENT, "end2")
        ]);
    }

    #[test]
    fn test_trailing_trivia_ends_at_first_newline() {
        let text = "x -- note\n\n  y";
        let mut tokenizer = Tokenizer::new(text);

        let x = tokenizer.next_token();
        assert_eq!(trivia(&x.trailing), [
            (TriviaPieceKind::Whitespace, 1),
            (TriviaPieceKind::SingleLineComment, 7),
            (TriviaPieceKind::Newline, 1),
        ]);

        let y = tokenizer.next_token();
        assert_eq!(trivia(&y.leading), [
            (TriviaPieceKind::Newline, 1),
            (TriviaPieceKind::Whitespace, 2)
        ]);
        assert!(y.trailing.is_empty());
    }

    #[test]
    fn test_block_comment_and_shebang() {
        let text = "#!/usr/bin/lua\n--[==[ a\n]] ]==] x --[[b]]";
        let mut tokenizer = Tokenizer::new(text);

        let x = tokenizer.next_token();
        assert_eq!(x.kind, IDENT);
        assert_eq!(trivia(&x.leading), [
            (TriviaPieceKind::Shebang, 14),
            (TriviaPieceKind::Newline, 1),
            (TriviaPieceKind::BlockComment, 16),
            (TriviaPieceKind::Whitespace, 1),
        ]);
        assert_eq!(trivia(&x.trailing), [
            (TriviaPieceKind::Whitespace, 1),
            (TriviaPieceKind::BlockComment, 7)
        ]);
        assert_eq!(tokenizer.next_token().kind, EOF);
    }

    #[test]
    fn test_hash_is_an_operator_after_start() {
        assert_eq!(kinds("x = #t"), [(IDENT, "x"), (EQ, "="), (HASH, "#"), (IDENT, "t")]);
    }

    #[test]
    fn test_crlf_is_one_newline() {
        let mut tokenizer = Tokenizer::new("a\r\nb");
        let a = tokenizer.next_token();
        assert_eq!(trivia(&a.trailing), [(TriviaPieceKind::Newline, 2)]);
        assert_eq!(tokenizer.peek_second().kind, EOF);
    }

    #[test]
    fn test_trailing_trivia_goes_to_eof() {
        let text = "a\n\n-- end\n";
        let mut tokenizer = Tokenizer::new(text);
        tokenizer.next_token();
        let eof = tokenizer.next_token();
        assert_eq!(eof.kind, EOF);
        assert_eq!(eof.range, TextRange::empty(TextSize::of(text)));
        assert_eq!(trivia(&eof.leading), [
            (TriviaPieceKind::Newline, 1),
            (TriviaPieceKind::SingleLineComment, 6),
            (TriviaPieceKind::Newline, 1),
        ]);
    }

    #[test]
    fn test_unknown_character() {
        assert_eq!(kinds("a $ b"), [(IDENT, "a"), (UNKNOWN, "$"), (IDENT, "b")]);
    }
}
