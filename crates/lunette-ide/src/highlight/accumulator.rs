use std::fmt;

use lunette_syntax::{TextRange, TextRangeExt as _};

use super::{Fragment, SemanticTokenModifier, SemanticTokenType, SpanMapper};

/// A classified single-line token with an absolute position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticToken {
    pub line: u32,
    pub column: u32,
    pub length: u32,
    pub token_type: SemanticTokenType,
    pub modifiers: SemanticTokenModifier,
}

impl fmt::Display for SemanticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {} {}", self.line, self.column, self.length, self.token_type)?;
        if !self.modifiers.is_empty() {
            write!(f, " [{}]", self.modifiers)?;
        }
        Ok(())
    }
}

/// Append-only sink for classified spans.
///
/// Spans must arrive in source order. Each is split into one token per line
/// it covers. With a range filter, spans that do not overlap it are dropped.
pub struct TokenAccumulator<'a> {
    mapper: SpanMapper<'a>,
    range: Option<TextRange>,
    tokens: Vec<SemanticToken>,
}

impl<'a> TokenAccumulator<'a> {
    pub fn new(mapper: SpanMapper<'a>, range: Option<TextRange>) -> Self {
        Self { mapper, range, tokens: Vec::new() }
    }

    /// Whether anything inside `span` can still be reported.
    pub fn wants(&self, span: TextRange) -> bool {
        self.range.is_none_or(|range| range.overlaps(span))
    }

    pub fn push(
        &mut self,
        span: TextRange,
        token_type: SemanticTokenType,
        modifiers: SemanticTokenModifier,
    ) {
        if span.is_empty() || !self.wants(span) {
            return;
        }

        for Fragment { line, column, length } in self.mapper.map(span) {
            debug_assert!(
                self.tokens
                    .last()
                    .is_none_or(|last| (last.line, last.column + last.length) <= (line, column)),
                "semantic tokens must be pushed in source order"
            );
            self.tokens.push(SemanticToken { line, column, length, token_type, modifiers });
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn finish(self) -> Vec<SemanticToken> {
        self.tokens
    }
}
