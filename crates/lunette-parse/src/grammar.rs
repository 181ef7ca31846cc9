use lunette_syntax::SyntaxKind::*;
use lunette_syntax::SyntaxSet;

use crate::parser::Parser;

pub(crate) mod exprs;
pub(crate) mod stmts;

/// Tokens that end a block.
pub(crate) const BLOCK_FOLLOW: SyntaxSet =
    SyntaxSet::new([END_KW, ELSE_KW, ELSEIF_KW, UNTIL_KW, EOF]);

/// Tokens an expression error never swallows.
pub(crate) const EXPR_RECOVERY: SyntaxSet = SyntaxSet::new([
    LOCAL_KW,
    IF_KW,
    WHILE_KW,
    FOR_KW,
    REPEAT_KW,
    RETURN_KW,
    DO_KW,
    BREAK_KW,
    GOTO_KW,
    THEN_KW,
    DOUBLE_COLON,
    SEMICOLON,
    COMMA,
    RIGHT_PAREN,
    RIGHT_BRACKET,
    RIGHT_BRACE,
])
.union(&BLOCK_FOLLOW);

pub(crate) fn chunk(p: &mut Parser<'_>) {
    let m = p.start();

    let block = p.start();
    loop {
        stmts::stmt_list(p);
        if p.at(EOF) {
            break;
        }
        let message = format!("unexpected `{}`", p.current_text());
        p.error_and_bump(&message);
    }
    block.complete(p, BLOCK);

    p.eof();
    m.complete(p, CHUNK);
}

/// `NAME`: a name introduced by a declaration.
pub(crate) fn name(p: &mut Parser<'_>) -> bool {
    if !p.at(IDENT) {
        p.error_recover("expected a name", &EXPR_RECOVERY);
        return false;
    }
    let m = p.start();
    p.advance();
    m.complete(p, NAME);
    true
}

/// `BLOCK`: statements up to the next block terminator.
pub(crate) fn block(p: &mut Parser<'_>) {
    let m = p.start();
    stmts::stmt_list(p);
    m.complete(p, BLOCK);
}
