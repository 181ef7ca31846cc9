//! Flat storage behind [`SyntaxTree`](crate::SyntaxTree).
//!
//! Nodes, tokens and trivia live in three arrays in source order and refer to
//! each other by index, so handles are a `&SyntaxTree` plus a `u32`.

use text_size::{TextRange, TextSize};

use crate::{SyntaxKind, TriviaPieceKind};

pub(crate) struct TreeInner {
    pub(crate) text: Box<str>,
    /// The root is always at index 0.
    pub(crate) nodes: Box<[NodeData]>,
    pub(crate) node_children: Box<[Child]>,
    pub(crate) tokens: Box<[TokenData]>,
    pub(crate) trivia: Box<[TriviaData]>,
}

#[derive(Clone, Copy)]
pub(crate) struct NodeData {
    pub(crate) kind: SyntaxKind,
    pub(crate) parent: Option<u32>,
    pub(crate) children_start: u32,
    pub(crate) children_len: u32,
    /// First and last token spanned, `None` for nodes without tokens.
    pub(crate) tokens: Option<(u32, u32)>,
    /// Where an empty node sits in the text.
    pub(crate) offset: TextSize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Child {
    Node(u32),
    Token(u32),
}

#[derive(Clone, Copy)]
pub(crate) struct TokenData {
    pub(crate) kind: SyntaxKind,
    /// Range of the token itself, without trivia.
    pub(crate) range: TextRange,
    pub(crate) parent: u32,
    pub(crate) leading: (u32, u32),
    pub(crate) trailing: (u32, u32),
}

#[derive(Clone, Copy)]
pub(crate) struct TriviaData {
    pub(crate) kind: TriviaPieceKind,
    pub(crate) range: TextRange,
    pub(crate) token: u32,
}

impl TreeInner {
    pub(crate) fn node(&self, index: u32) -> &NodeData {
        &self.nodes[index as usize]
    }

    pub(crate) fn token(&self, index: u32) -> &TokenData {
        &self.tokens[index as usize]
    }

    pub(crate) fn trivia(&self, index: u32) -> &TriviaData {
        &self.trivia[index as usize]
    }

    pub(crate) fn children(&self, node: u32) -> &[Child] {
        let node = self.node(node);
        let start = node.children_start as usize;
        &self.node_children[start..start + node.children_len as usize]
    }

    /// Token range including leading and trailing trivia.
    pub(crate) fn token_full_range(&self, index: u32) -> TextRange {
        let token = self.token(index);
        let (leading_start, leading_len) = token.leading;
        let (trailing_start, trailing_len) = token.trailing;

        let start = if leading_len == 0 {
            token.range.start()
        } else {
            self.trivia(leading_start).range.start()
        };
        let end = if trailing_len == 0 {
            token.range.end()
        } else {
            self.trivia(trailing_start + trailing_len - 1).range.end()
        };

        TextRange::new(start, end)
    }

    pub(crate) fn node_full_range(&self, index: u32) -> TextRange {
        let node = self.node(index);
        match node.tokens {
            Some((first, last)) => TextRange::new(
                self.token_full_range(first).start(),
                self.token_full_range(last).end(),
            ),
            None => TextRange::empty(node.offset),
        }
    }

    pub(crate) fn node_trimmed_range(&self, index: u32) -> TextRange {
        let node = self.node(index);
        match node.tokens {
            Some((first, last)) => {
                TextRange::new(self.token(first).range.start(), self.token(last).range.end())
            }
            None => TextRange::empty(node.offset),
        }
    }
}
