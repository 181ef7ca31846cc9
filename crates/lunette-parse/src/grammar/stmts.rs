use lunette_syntax::SyntaxKind::{self, *};

use super::exprs::{self, expr, expr_list};
use super::{BLOCK_FOLLOW, block, name};
use crate::parser::Parser;

pub(crate) fn stmt_list(p: &mut Parser<'_>) {
    while !p.at_set(&BLOCK_FOLLOW) {
        stmt(p);
    }
}

fn stmt(p: &mut Parser<'_>) {
    match p.peek_kind() {
        SEMICOLON => {
            let m = p.start();
            p.advance();
            m.complete(p, EMPTY_STMT);
        }
        LOCAL_KW => local(p),
        FUNCTION_KW => function(p),
        DO_KW => {
            let m = p.start();
            p.advance();
            block(p);
            p.expect(END_KW);
            m.complete(p, DO_STMT);
        }
        WHILE_KW => {
            let m = p.start();
            p.advance();
            expr(p);
            p.expect(DO_KW);
            block(p);
            p.expect(END_KW);
            m.complete(p, WHILE_STMT);
        }
        REPEAT_KW => {
            let m = p.start();
            p.advance();
            block(p);
            if p.expect(UNTIL_KW) {
                expr(p);
            }
            m.complete(p, REPEAT_STMT);
        }
        IF_KW => if_(p),
        FOR_KW => for_(p),
        RETURN_KW => {
            let m = p.start();
            p.advance();
            if !p.at_set(&BLOCK_FOLLOW) && !p.at(SEMICOLON) {
                expr_list(p);
            }
            p.eat(SEMICOLON);
            m.complete(p, RETURN_STMT);
        }
        BREAK_KW => {
            let m = p.start();
            p.advance();
            m.complete(p, BREAK_STMT);
        }
        GOTO_KW => {
            let m = p.start();
            p.advance();
            p.expect(IDENT);
            m.complete(p, GOTO_STMT);
        }
        DOUBLE_COLON => {
            let m = p.start();
            p.advance();
            p.expect(IDENT);
            p.expect(DOUBLE_COLON);
            m.complete(p, LABEL_STMT);
        }
        IDENT | LEFT_PAREN => expr_stmt(p),
        _ => p.error_and_bump("expected a statement"),
    }
}

/// `local function f() end` or `local a <const>, b = ...`
fn local(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    if p.eat(FUNCTION_KW) {
        name(p);
        exprs::function_body(p);
        m.complete(p, LOCAL_FUNCTION_STMT);
        return;
    }

    loop {
        name(p);
        if p.at(LT) {
            let attrib = p.start();
            p.advance();
            p.expect(IDENT);
            p.expect(GT);
            attrib.complete(p, ATTRIB);
        }
        if !p.eat(COMMA) {
            break;
        }
    }

    if p.eat(EQ) {
        expr_list(p);
    }
    m.complete(p, LOCAL_STMT);
}

/// `function a.b:c() end`
fn function(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    let name = p.start();
    if p.at(IDENT) {
        let base = p.start();
        p.advance();
        base.complete(p, NAME_REF);

        while p.eat(DOT) {
            p.expect(IDENT);
        }
        if p.eat(COLON) {
            p.expect(IDENT);
        }
    } else {
        p.error("expected a function name");
    }
    name.complete(p, FUNCTION_NAME);

    exprs::function_body(p);
    m.complete(p, FUNCTION_STMT);
}

fn if_(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    expr(p);
    p.expect(THEN_KW);
    block(p);

    while p.at(ELSEIF_KW) {
        let clause = p.start();
        p.advance();
        expr(p);
        p.expect(THEN_KW);
        block(p);
        clause.complete(p, ELSEIF_CLAUSE);
    }

    if p.at(ELSE_KW) {
        let clause = p.start();
        p.advance();
        block(p);
        clause.complete(p, ELSE_CLAUSE);
    }

    p.expect(END_KW);
    m.complete(p, IF_STMT);
}

/// Numeric `for i = a, b, c do` or generic `for k, v in e do`.
fn for_(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    name(p);

    let kind = if p.eat(EQ) {
        expr(p);
        p.expect(COMMA);
        expr(p);
        if p.eat(COMMA) {
            expr(p);
        }
        NUMERIC_FOR_STMT
    } else {
        while p.eat(COMMA) {
            name(p);
        }
        p.expect(IN_KW);
        expr_list(p);
        GENERIC_FOR_STMT
    };

    p.expect(DO_KW);
    block(p);
    p.expect(END_KW);
    m.complete(p, kind);
}

/// A call statement or an assignment.
fn expr_stmt(p: &mut Parser<'_>) {
    let Some(first) = exprs::suffixed_expr(p) else {
        return;
    };

    if !p.at(EQ) && !p.at(COMMA) {
        if !matches!(first.kind(), CALL_EXPR | METHOD_CALL_EXPR) {
            p.error("expected `=` or a call");
        }
        first.precede(p).complete(p, EXPR_STMT);
        return;
    }

    let targets = first.precede(p);
    check_target(p, first.kind());
    while p.eat(COMMA) {
        if let Some(target) = exprs::suffixed_expr(p) {
            check_target(p, target.kind());
        }
    }
    let targets = targets.complete(p, EXPR_LIST);

    let m = targets.precede(p);
    p.expect(EQ);
    expr_list(p);
    m.complete(p, ASSIGN_STMT);
}

fn check_target(p: &mut Parser<'_>, kind: SyntaxKind) {
    if !matches!(kind, NAME_REF | FIELD_EXPR | INDEX_EXPR) {
        p.error("cannot assign to this expression");
    }
}
