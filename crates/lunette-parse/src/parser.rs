use drop_bomb::DropBomb;
use lunette_errors::Diagnostic;
use lunette_syntax::{Builder, SyntaxKind, SyntaxSet, SyntaxTree};
use lunette_tokenizer::{Token, Tokenizer};
use text_size::TextRange;

pub(crate) struct Parser<'a> {
    text: &'a str,
    tokenizer: Tokenizer<'a>,
    events: Vec<Event>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, tokenizer: Tokenizer::new(text), events: Vec::new(), diagnostics: Vec::new() }
    }

    pub(crate) fn peek_kind(&self) -> SyntaxKind {
        self.tokenizer.peek().kind
    }

    pub(crate) fn nth_kind(&self, n: usize) -> SyntaxKind {
        match n {
            0 => self.tokenizer.peek().kind,
            1 => self.tokenizer.peek_second().kind,
            _ => unreachable!("the parser looks at most one token ahead"),
        }
    }

    /// Source text of the current token.
    pub(crate) fn current_text(&self) -> &'a str {
        &self.text[self.tokenizer.peek().range]
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn at_set(&self, set: &SyntaxSet) -> bool {
        set.contains(self.peek_kind())
    }

    /// Moves the current token into the tree. `EOF` is only consumed by
    /// [`Parser::eof`].
    pub(crate) fn advance(&mut self) {
        if self.at(SyntaxKind::EOF) {
            return;
        }

        let token = self.tokenizer.next_token();
        self.events.push(Event::Token(token));
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if !self.at(kind) {
            return false;
        }
        self.advance();
        true
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(&format!("expected {}", describe(kind)));
        false
    }

    pub(crate) fn eof(&mut self) {
        debug_assert!(self.at(SyntaxKind::EOF));
        let token = self.tokenizer.next_token();
        self.events.push(Event::Token(token));
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(pos)
    }

    pub(crate) fn error(&mut self, message: &str) {
        let range = self.tokenizer.peek().range;
        self.push_diagnostic(message, range);
    }

    pub(crate) fn error_and_bump(&mut self, message: &str) {
        if self.at(SyntaxKind::EOF) {
            self.error(message);
            return;
        }
        let m = self.start();
        self.error(message);
        self.advance();
        m.complete(self, SyntaxKind::ERROR);
    }

    /// Reports an error and skips the current token unless it is in `recovery`.
    pub(crate) fn error_recover(&mut self, message: &str, recovery: &SyntaxSet) {
        if self.at_set(recovery) {
            self.error(message);
        } else {
            self.error_and_bump(message);
        }
    }

    fn push_diagnostic(&mut self, message: &str, range: TextRange) {
        // Several failed expectations at one token only report the first.
        if self.diagnostics.last().is_some_and(|last| last.range() == range) {
            return;
        }
        self.diagnostics.push(Diagnostic::error(message, range));
    }

    pub(crate) fn build_tree(self) -> (SyntaxTree, Vec<Diagnostic>) {
        let Parser { text, tokenizer: _, mut events, diagnostics } = self;
        let mut builder = Builder::new(text);
        let mut forward_parents = Vec::new();

        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::TOMBSTONE) {
                Event::Start { kind, forward_parent } => {
                    if kind == SyntaxKind::TOMBSTONE {
                        continue;
                    }

                    forward_parents.push(kind);
                    let mut idx = i;
                    let mut fp = forward_parent;
                    while let Some(fwd) = fp {
                        idx += fwd as usize;

                        fp = match std::mem::replace(&mut events[idx], Event::TOMBSTONE) {
                            Event::Start { kind, forward_parent } => {
                                if kind != SyntaxKind::TOMBSTONE {
                                    forward_parents.push(kind);
                                }
                                forward_parent
                            }
                            _ => unreachable!(),
                        };
                    }

                    for kind in forward_parents.drain(..).rev() {
                        builder.start_node(kind);
                    }
                }
                Event::Finish => {
                    builder.finish_node();
                }
                Event::Token(Token { leading, kind, range, trailing }) => {
                    builder.token(leading.into_iter(), kind, range.len(), trailing.into_iter());
                }
            }
        }

        (builder.finish(), diagnostics)
    }
}

/// How a token kind is named in diagnostics.
fn describe(kind: SyntaxKind) -> &'static str {
    use SyntaxKind::*;

    match kind {
        LEFT_PAREN => "`(`",
        RIGHT_PAREN => "`)`",
        LEFT_BRACKET => "`[`",
        RIGHT_BRACKET => "`]`",
        LEFT_BRACE => "`{`",
        RIGHT_BRACE => "`}`",
        COMMA => "`,`",
        COLON => "`:`",
        DOUBLE_COLON => "`::`",
        EQ => "`=`",
        GT => "`>`",
        DO_KW => "`do`",
        END_KW => "`end`",
        THEN_KW => "`then`",
        UNTIL_KW => "`until`",
        IN_KW => "`in`",
        IDENT => "a name",
        EOF => "end of file",
        _ => "a token",
    }
}

enum Event {
    Start { kind: SyntaxKind, forward_parent: Option<u32> },
    Token(Token),
    Finish,
}

impl Event {
    const TOMBSTONE: Self = Event::Start { kind: SyntaxKind::TOMBSTONE, forward_parent: None };
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: u32) -> Self {
        Self { position: pos, bomb: DropBomb::new("Marker must be either completed or abandoned") }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot, .. } => {
                *slot = kind;
            }
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
        CompletedMarker::new(self.position, kind)
    }

    /// Drops the marker without creating a node; children stay with the parent.
    pub(crate) fn abandon(mut self, p: &mut Parser<'_>) {
        self.bomb.defuse();

        let idx = self.position as usize;
        if idx == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Start { kind: SyntaxKind::TOMBSTONE, forward_parent: None }) => (),
                _ => unreachable!(),
            }
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct CompletedMarker {
    pos: u32,
    kind: SyntaxKind,
}

impl CompletedMarker {
    fn new(pos: u32, kind: SyntaxKind) -> Self {
        Self { pos, kind }
    }

    pub(crate) fn kind(self) -> SyntaxKind {
        self.kind
    }

    pub(crate) fn precede(self, p: &mut Parser<'_>) -> Marker {
        let new_pos = p.start();

        match &mut p.events[self.pos as usize] {
            Event::Start { forward_parent, .. } => {
                *forward_parent = Some(new_pos.position - self.pos);
            }
            _ => unreachable!(),
        }

        new_pos
    }
}
