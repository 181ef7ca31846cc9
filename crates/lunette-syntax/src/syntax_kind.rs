#[allow(non_camel_case_types)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum SyntaxKind {
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    LEFT_BRACE,
    RIGHT_BRACE,
    COMMA,
    SEMICOLON,
    COLON,
    DOUBLE_COLON,
    DOT,
    DOT3,
    EQ,

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
    BREAK_KW,
    DO_KW,
    ELSE_KW,
    ELSEIF_KW,
    END_KW,
    FALSE_KW,
    FOR_KW,
    FUNCTION_KW,
    GOTO_KW,
    IF_KW,
    IN_KW,
    LOCAL_KW,
    NIL_KW,
    NOT_KW,
    OR_KW,
    REPEAT_KW,
    RETURN_KW,
    THEN_KW,
    TRUE_KW,
    UNTIL_KW,
    WHILE_KW,

    IDENT,
    NUMBER,
    STRING,
    LONG_STRING,

    WHITESPACE,
    NEWLINE,
    LINE_COMMENT,
    BLOCK_COMMENT,
    SHEBANG,

    UNKNOWN,
    EOF,

    CHUNK,
    BLOCK,
    EMPTY_STMT,
    LOCAL_STMT,
    LOCAL_FUNCTION_STMT,
    FUNCTION_STMT,
    ASSIGN_STMT,
    EXPR_STMT,
    DO_STMT,
    WHILE_STMT,
    REPEAT_STMT,
    IF_STMT,
    ELSEIF_CLAUSE,
    ELSE_CLAUSE,
    NUMERIC_FOR_STMT,
    GENERIC_FOR_STMT,
    RETURN_STMT,
    BREAK_STMT,
    GOTO_STMT,
    LABEL_STMT,

    NAME,
    NAME_REF,
    ATTRIB,
    EXPR_LIST,
    PARAM_LIST,
    ARG_LIST,
    FUNCTION_NAME,

    LITERAL,
    VARARG_EXPR,
    PAREN_EXPR,
    PREFIX_EXPR,
    BINARY_EXPR,
    CALL_EXPR,
    METHOD_CALL_EXPR,
    FIELD_EXPR,
    INDEX_EXPR,
    FUNCTION_EXPR,
    TABLE_EXPR,
    TABLE_FIELD,

    ERROR,
    TOMBSTONE,
}

use SyntaxKind::*;

impl SyntaxKind {
    /// Whitespace, newlines, comments and the shebang line.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, WHITESPACE | NEWLINE | LINE_COMMENT | BLOCK_COMMENT | SHEBANG)
    }

    #[inline]
    pub fn is_keyword(self) -> bool {
        (AND_KW as u8..=WHILE_KW as u8).contains(&(self as u8))
    }

    /// Tokens that can act as a unary or binary operator, plus assignment.
    #[inline]
    pub fn is_operator(self) -> bool {
        (PLUS as u8..=GTEQ as u8).contains(&(self as u8)) || self == EQ
    }

    #[inline]
    pub fn is_literal(self) -> bool {
        matches!(self, NUMBER | STRING | LONG_STRING | NIL_KW | TRUE_KW | FALSE_KW)
    }

    #[inline]
    pub fn is_string(self) -> bool {
        matches!(self, STRING | LONG_STRING)
    }

    pub fn from_keyword(ident: &str) -> Option<Self> {
        let kind = match ident {
            "and" => AND_KW,
            "break" => BREAK_KW,
            "do" => DO_KW,
            "else" => ELSE_KW,
            "elseif" => ELSEIF_KW,
            "end" => END_KW,
            "false" => FALSE_KW,
            "for" => FOR_KW,
            "function" => FUNCTION_KW,
            "goto" => GOTO_KW,
            "if" => IF_KW,
            "in" => IN_KW,
            "local" => LOCAL_KW,
            "nil" => NIL_KW,
            "not" => NOT_KW,
            "or" => OR_KW,
            "repeat" => REPEAT_KW,
            "return" => RETURN_KW,
            "then" => THEN_KW,
            "true" => TRUE_KW,
            "until" => UNTIL_KW,
            "while" => WHILE_KW,
            _ => return None,
        };
        Some(kind)
    }
}
