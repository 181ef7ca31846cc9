use lunette_syntax::SyntaxKind::{self, *};

use super::{EXPR_RECOVERY, block, name};
use crate::parser::{CompletedMarker, Parser};

/// Binding power of unary operators.
const UNARY_PRIORITY: u8 = 12;

/// Left and right binding powers of a binary operator.
fn binary_priority(kind: SyntaxKind) -> Option<(u8, u8)> {
    let priority = match kind {
        OR_KW => (1, 1),
        AND_KW => (2, 2),
        LT | GT | LTEQ | GTEQ | NEQ | EQ2 => (3, 3),
        PIPE => (4, 4),
        TILDE => (5, 5),
        AMP => (6, 6),
        SHL | SHR => (7, 7),
        DOT2 => (9, 8),
        PLUS | MINUS => (10, 10),
        STAR | SLASH | DOUBLE_SLASH | PERCENT => (11, 11),
        CARET => (14, 13),
        _ => return None,
    };
    Some(priority)
}

pub(crate) fn expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    expr_bp(p, 0)
}

/// `EXPR_LIST`: one or more comma separated expressions.
pub(crate) fn expr_list(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    expr(p);
    while p.eat(COMMA) {
        expr(p);
    }
    m.complete(p, EXPR_LIST)
}

fn expr_bp(p: &mut Parser<'_>, limit: u8) -> Option<CompletedMarker> {
    let mut lhs = match p.peek_kind() {
        NOT_KW | MINUS | HASH | TILDE => {
            let m = p.start();
            p.advance();
            expr_bp(p, UNARY_PRIORITY);
            m.complete(p, PREFIX_EXPR)
        }
        _ => simple_expr(p)?,
    };

    while let Some((left, right)) = binary_priority(p.peek_kind()) {
        if left <= limit {
            break;
        }
        let m = lhs.precede(p);
        p.advance();
        expr_bp(p, right);
        lhs = m.complete(p, BINARY_EXPR);
    }

    Some(lhs)
}

fn simple_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    match p.peek_kind() {
        NUMBER | STRING | LONG_STRING | NIL_KW | TRUE_KW | FALSE_KW => {
            let m = p.start();
            p.advance();
            Some(m.complete(p, LITERAL))
        }
        DOT3 => {
            let m = p.start();
            p.advance();
            Some(m.complete(p, VARARG_EXPR))
        }
        LEFT_BRACE => Some(table(p)),
        FUNCTION_KW => {
            let m = p.start();
            p.advance();
            function_body(p);
            Some(m.complete(p, FUNCTION_EXPR))
        }
        _ => suffixed_expr(p),
    }
}

fn primary_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    match p.peek_kind() {
        IDENT => {
            let m = p.start();
            p.advance();
            Some(m.complete(p, NAME_REF))
        }
        LEFT_PAREN => {
            let m = p.start();
            p.advance();
            expr(p);
            p.expect(RIGHT_PAREN);
            Some(m.complete(p, PAREN_EXPR))
        }
        _ => {
            p.error_recover("expected an expression", &EXPR_RECOVERY);
            None
        }
    }
}

/// A primary expression followed by field accesses, indexing and calls.
pub(crate) fn suffixed_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let mut lhs = primary_expr(p)?;

    loop {
        lhs = match p.peek_kind() {
            DOT => {
                let m = lhs.precede(p);
                p.advance();
                p.expect(IDENT);
                m.complete(p, FIELD_EXPR)
            }
            LEFT_BRACKET => {
                let m = lhs.precede(p);
                p.advance();
                expr(p);
                p.expect(RIGHT_BRACKET);
                m.complete(p, INDEX_EXPR)
            }
            COLON => {
                let m = lhs.precede(p);
                p.advance();
                p.expect(IDENT);
                arg_list(p);
                m.complete(p, METHOD_CALL_EXPR)
            }
            LEFT_PAREN | STRING | LONG_STRING | LEFT_BRACE => {
                let m = lhs.precede(p);
                arg_list(p);
                m.complete(p, CALL_EXPR)
            }
            _ => return Some(lhs),
        };
    }
}

/// `ARG_LIST`: `(a, b)`, a table constructor or a string literal.
fn arg_list(p: &mut Parser<'_>) {
    let m = p.start();
    match p.peek_kind() {
        LEFT_PAREN => {
            p.advance();
            if !p.at(RIGHT_PAREN) {
                expr(p);
                while p.eat(COMMA) {
                    expr(p);
                }
            }
            p.expect(RIGHT_PAREN);
        }
        LEFT_BRACE => {
            table(p);
        }
        STRING | LONG_STRING => {
            let literal = p.start();
            p.advance();
            literal.complete(p, LITERAL);
        }
        _ => p.error("expected arguments"),
    }
    m.complete(p, ARG_LIST);
}

/// `TABLE_EXPR`: `{ [k] = v, name = v, v }`
fn table(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.expect(LEFT_BRACE);

    while !p.at(RIGHT_BRACE) && !p.at(EOF) {
        let field = p.start();
        match p.peek_kind() {
            LEFT_BRACKET => {
                p.advance();
                expr(p);
                p.expect(RIGHT_BRACKET);
                p.expect(EQ);
                expr(p);
            }
            IDENT if p.nth_kind(1) == EQ => {
                p.advance();
                p.advance();
                expr(p);
            }
            _ => {
                if expr(p).is_none() {
                    field.abandon(p);
                    break;
                }
            }
        }
        field.complete(p, TABLE_FIELD);

        if !p.eat(COMMA) && !p.eat(SEMICOLON) {
            break;
        }
    }

    p.expect(RIGHT_BRACE);
    m.complete(p, TABLE_EXPR)
}

/// `PARAM_LIST BLOCK end` shared by every function form.
pub(crate) fn function_body(p: &mut Parser<'_>) {
    let params = p.start();
    if p.expect(LEFT_PAREN) {
        while !p.at(RIGHT_PAREN) && !p.at(EOF) {
            if p.eat(DOT3) {
                break;
            }
            if !name(p) || !p.eat(COMMA) {
                break;
            }
        }
        p.expect(RIGHT_PAREN);
    }
    params.complete(p, PARAM_LIST);

    block(p);
    p.expect(END_KW);
}
