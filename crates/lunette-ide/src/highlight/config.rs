use lunette_syntax::SyntaxKind::{self, *};
use lunette_syntax::SyntaxSet;
use rustc_hash::FxHashSet;

use super::SemanticTokenType;

/// Tables that drive classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    /// Standard functions highlighted when nothing in the file defines them.
    pub library_functions: FxHashSet<Box<str>>,
    /// Standard library tables, highlighted as types.
    pub libraries: FxHashSet<Box<str>>,
    /// Operator tokens. They are only highlighted as operands of a unary or
    /// binary expression.
    pub operators: SyntaxSet,
    pub keywords: SyntaxSet,
}

const LUA54_FUNCTIONS: &[&str] = &[
    "assert",
    "collectgarbage",
    "dofile",
    "error",
    "getmetatable",
    "ipairs",
    "load",
    "loadfile",
    "next",
    "pairs",
    "pcall",
    "print",
    "rawequal",
    "rawget",
    "rawlen",
    "rawset",
    "require",
    "select",
    "setmetatable",
    "tonumber",
    "tostring",
    "type",
    "warn",
    "xpcall",
];

const LUA54_LIBRARIES: &[&str] =
    &["_G", "coroutine", "debug", "io", "math", "os", "package", "string", "table", "utf8"];

const OPERATORS: SyntaxSet = SyntaxSet::new([
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
    DOT2,
    EQ2,
    NEQ,
    LT,
    LTEQ,
    GT,
    GTEQ,
    AND_KW,
    OR_KW,
    NOT_KW,
]);

const KEYWORDS: SyntaxSet = SyntaxSet::new([
    BREAK_KW,
    DO_KW,
    ELSE_KW,
    ELSEIF_KW,
    END_KW,
    FOR_KW,
    FUNCTION_KW,
    GOTO_KW,
    IF_KW,
    IN_KW,
    LOCAL_KW,
    REPEAT_KW,
    RETURN_KW,
    THEN_KW,
    UNTIL_KW,
    WHILE_KW,
]);

impl Default for HighlightConfig {
    fn default() -> Self {
        Self::lua54()
    }
}

impl HighlightConfig {
    pub fn lua54() -> Self {
        Self {
            library_functions: LUA54_FUNCTIONS.iter().map(|&name| name.into()).collect(),
            libraries: LUA54_LIBRARIES.iter().map(|&name| name.into()).collect(),
            operators: OPERATORS,
            keywords: KEYWORDS,
        }
    }

    /// How an unresolved standard name is highlighted.
    pub fn library_type(&self, name: &str) -> Option<SemanticTokenType> {
        if self.library_functions.contains(name) {
            Some(SemanticTokenType::Function)
        } else if self.libraries.contains(name) {
            Some(SemanticTokenType::Type)
        } else {
            None
        }
    }

    /// Classifies a token that no syntactic shape claimed.
    pub fn token_type(&self, kind: SyntaxKind, parent: SyntaxKind) -> Option<SemanticTokenType> {
        if self.operators.contains(kind) {
            return matches!(parent, PREFIX_EXPR | BINARY_EXPR)
                .then_some(SemanticTokenType::Operator);
        }
        if self.keywords.contains(kind) {
            return Some(SemanticTokenType::Keyword);
        }

        match kind {
            NUMBER => Some(SemanticTokenType::Number),
            _ if kind.is_string() => Some(SemanticTokenType::String),
            _ if kind.is_keyword() => Some(SemanticTokenType::Keyword),
            _ if kind.is_operator() => Some(SemanticTokenType::Operator),
            _ => None,
        }
    }

    /// Highlighting of trivia.
    pub fn trivia_type(kind: SyntaxKind) -> Option<SemanticTokenType> {
        matches!(kind, SHEBANG | LINE_COMMENT | BLOCK_COMMENT).then_some(SemanticTokenType::Comment)
    }
}
