//! Incremental builder for the immutable syntax tree.

use text_size::{TextRange, TextSize};

use crate::tree::{Child, NodeData, TokenData, TreeInner, TriviaData};
use crate::{SyntaxKind, SyntaxTree, TriviaPiece};

struct OpenNode {
    index: usize,
    children: Vec<Child>,
}

/// Builds a `SyntaxTree` from parser events.
pub struct Builder {
    text: Box<str>,
    nodes: Vec<NodeData>,
    node_children: Vec<Child>,
    tokens: Vec<TokenData>,
    trivia: Vec<TriviaData>,

    children_pool: Vec<Vec<Child>>,
    opened: Vec<OpenNode>,
    text_len: TextSize,
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

const DEFAULT_TREE_DEPTH: usize = 128;
const DEFAULT_TREE_SIZE: usize = 1024;
const DEFAULT_CHILDREN_LEN: usize = 10;

impl Builder {
    /// Creates a new builder for `text`.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.into(),
            nodes: Vec::with_capacity(DEFAULT_TREE_SIZE),
            node_children: Vec::with_capacity(DEFAULT_TREE_SIZE),
            tokens: Vec::with_capacity(DEFAULT_TREE_SIZE),
            trivia: Vec::with_capacity(DEFAULT_TREE_SIZE),

            children_pool: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            opened: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            text_len: TextSize::new(0),
        }
    }

    /// Starts a new node of the given kind.
    pub fn start_node(&mut self, kind: SyntaxKind) {
        let index = self.nodes.len();
        let parent = self.opened.last_mut().map(|parent| {
            parent.children.push(Child::Node(index as u32));
            parent.index as u32
        });
        assert!(parent.is_some() || index == 0, "a syntax tree has exactly one root");

        self.nodes.push(NodeData {
            kind,
            parent,
            children_start: 0,
            children_len: 0,
            tokens: None,
            offset: self.text_len,
        });

        let children =
            self.children_pool.pop().unwrap_or_else(|| Vec::with_capacity(DEFAULT_CHILDREN_LEN));
        self.opened.push(OpenNode { index, children });
    }

    /// Finishes the most recently started node.
    pub fn finish_node(&mut self) {
        let OpenNode { index, mut children } = self.opened.pop().expect("no opened nodes?");
        let node = &mut self.nodes[index];
        node.children_start = self.node_children.len() as u32;
        node.children_len = children.len() as u32;
        self.node_children.append(&mut children);
        self.children_pool.push(children);
    }

    /// Adds a token with its leading and trailing trivia.
    pub fn token(
        &mut self,
        leading_trivia: impl ExactSizeIterator<Item = TriviaPiece>,
        kind: SyntaxKind,
        text_len: TextSize,
        trailing_trivia: impl ExactSizeIterator<Item = TriviaPiece>,
    ) {
        let token_index = self.tokens.len() as u32;
        let parent = self.opened.last_mut().expect("a token must live inside a node");
        parent.children.push(Child::Token(token_index));
        let parent = parent.index as u32;

        let leading = self.push_trivia(leading_trivia, token_index);
        let range = TextRange::at(self.text_len, text_len);
        self.advance(text_len);
        let trailing = self.push_trivia(trailing_trivia, token_index);

        self.tokens.push(TokenData { kind, range, parent, leading, trailing });

        for open in &self.opened {
            let node = &mut self.nodes[open.index];
            match &mut node.tokens {
                // First token inside this node, so also first and last token.
                None => node.tokens = Some((token_index, token_index)),
                Some((_first, last)) => *last = token_index,
            }
        }
    }

    fn push_trivia(
        &mut self,
        pieces: impl ExactSizeIterator<Item = TriviaPiece>,
        token: u32,
    ) -> (u32, u32) {
        let start = self.trivia.len() as u32;
        let len = pieces.len() as u32;
        for piece in pieces {
            let range = TextRange::at(self.text_len, piece.len);
            self.advance(piece.len);
            self.trivia.push(TriviaData { kind: piece.kind, range, token });
        }
        debug_assert_eq!(self.trivia.len() as u32, start + len);
        (start, len)
    }

    fn advance(&mut self, len: TextSize) {
        self.text_len += len;
        assert!(
            self.text.is_char_boundary(usize::from(self.text_len)),
            "token boundary inside a character at {:?}",
            self.text_len
        );
    }

    /// Finishes building and returns the immutable `SyntaxTree`.
    pub fn finish(mut self) -> SyntaxTree {
        assert!(self.opened.is_empty(), "unfinished nodes");
        assert!(!self.nodes.is_empty(), "a syntax tree needs a root node");
        assert_eq!(
            usize::from(self.text_len),
            self.text.len(),
            "tokens and trivia must cover the whole text"
        );

        let tree = TreeInner {
            text: std::mem::take(&mut self.text),
            nodes: std::mem::take(&mut self.nodes).into_boxed_slice(),
            node_children: std::mem::take(&mut self.node_children).into_boxed_slice(),
            tokens: std::mem::take(&mut self.tokens).into_boxed_slice(),
            trivia: std::mem::take(&mut self.trivia).into_boxed_slice(),
        };
        SyntaxTree { tree }
    }
}
