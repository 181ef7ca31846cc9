//! Public syntax tree API built on immutable, parent-linked nodes.

use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};

use text_size::{TextRange, TextSize};

use crate::SyntaxKind;
use crate::tree::{Child, TreeInner};

/// Owned syntax tree for a single source text.
pub struct SyntaxTree {
    pub(crate) tree: TreeInner,
}

impl SyntaxTree {
    /// Returns the root syntax node.
    #[inline]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode { tree: &self.tree, index: 0 }
    }

    /// Returns the full source text for this tree.
    #[inline]
    pub fn text(&self) -> &str {
        &self.tree.text
    }

    /// Iterates over every non-trivia token in source order, `EOF` included.
    pub fn tokens(&self) -> impl DoubleEndedIterator<Item = SyntaxToken<'_>> + '_ {
        (0..self.tree.tokens.len() as u32).map(|index| SyntaxToken { tree: &self.tree, index })
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree").field("text_len", &self.text().len()).finish_non_exhaustive()
    }
}

impl PartialEq for SyntaxTree {
    fn eq(&self, other: &Self) -> bool {
        self.root().debug_tree() == other.root().debug_tree()
    }
}

impl Eq for SyntaxTree {}

/// Node handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    tree: &'a TreeInner,
    index: u32,
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for SyntaxNode<'_> {}

impl Hash for SyntaxNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.tree, state);
        self.index.hash(state);
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl<'a> SyntaxNode<'a> {
    /// Returns this node's kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.tree.node(self.index).kind
    }

    /// Returns the range covered by this node, trivia included.
    #[inline]
    pub fn text_range(self) -> TextRange {
        self.tree.node_full_range(self.index)
    }

    /// Returns the range with leading/trailing trivia trimmed away.
    #[inline]
    pub fn trimmed_range(self) -> TextRange {
        self.tree.node_trimmed_range(self.index)
    }

    /// Returns the text slice covered by this node.
    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    /// Returns the text slice excluding leading/trailing trivia.
    #[inline]
    pub fn text_trimmed(self) -> &'a str {
        &self.tree.text[self.trimmed_range()]
    }

    /// Returns the parent node if any.
    #[inline]
    pub fn parent(self) -> Option<Self> {
        let parent = self.tree.node(self.index).parent?;
        Some(Self { tree: self.tree, index: parent })
    }

    /// Returns an iterator of ancestors starting from this node.
    #[inline]
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        std::iter::successors(Some(self), |it| it.parent())
    }

    /// Returns the first token spanned by this node.
    #[inline]
    pub fn first_token(self) -> Option<SyntaxToken<'a>> {
        let (first, _) = self.tree.node(self.index).tokens?;
        Some(SyntaxToken { tree: self.tree, index: first })
    }

    /// Returns the last token spanned by this node.
    #[inline]
    pub fn last_token(self) -> Option<SyntaxToken<'a>> {
        let (_, last) = self.tree.node(self.index).tokens?;
        Some(SyntaxToken { tree: self.tree, index: last })
    }

    /// Iterates direct children, nodes and tokens, in source order.
    #[inline]
    pub fn children_with_tokens(self) -> ChildrenWithTokens<'a> {
        ChildrenWithTokens { tree: self.tree, children: self.tree.children(self.index).iter() }
    }

    /// Iterates child nodes, skipping tokens.
    #[inline]
    pub fn children(self) -> impl DoubleEndedIterator<Item = SyntaxNode<'a>> + Clone + 'a {
        self.children_with_tokens().filter_map(SyntaxElement::into_node)
    }

    /// Iterates child tokens, skipping nodes.
    #[inline]
    pub fn child_tokens(self) -> impl DoubleEndedIterator<Item = SyntaxToken<'a>> + Clone + 'a {
        self.children_with_tokens().filter_map(SyntaxElement::into_token)
    }

    /// Returns the first direct child token of the given kind.
    pub fn child_token(self, kind: SyntaxKind) -> Option<SyntaxToken<'a>> {
        self.child_tokens().find(|token| token.kind() == kind)
    }

    /// Returns the token whose range, trivia included, contains `offset`.
    ///
    /// On a boundary between two tokens the right one wins.
    pub fn token_at_offset(self, offset: TextSize) -> Option<SyntaxToken<'a>> {
        let (first, last) = self.tree.node(self.index).tokens?;
        let (mut lo, mut hi) = (first, last + 1);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.tree.token_full_range(mid).end() <= offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        let index = lo.min(last);
        self.tree
            .token_full_range(index)
            .contains_inclusive(offset)
            .then_some(SyntaxToken { tree: self.tree, index })
    }

    /// Returns the smallest element whose trimmed range covers `range`.
    pub fn covering_element(self, range: TextRange) -> SyntaxElement<'a> {
        let mut node = self;
        'descend: loop {
            for child in node.children_with_tokens() {
                let child_range = match child {
                    NodeOrToken::Node(it) => it.trimmed_range(),
                    NodeOrToken::Token(it) => it.trimmed_range(),
                };
                if !child_range.contains_range(range) {
                    continue;
                }
                match child {
                    NodeOrToken::Node(it) => {
                        node = it;
                        continue 'descend;
                    }
                    NodeOrToken::Token(it) => return NodeOrToken::Token(it),
                }
            }
            return NodeOrToken::Node(node);
        }
    }

    /// Returns a preorder iterator over nodes and tokens.
    #[inline]
    pub fn preorder_with_tokens(self) -> PreorderWithTokens<'a> {
        PreorderWithTokens::new(self)
    }

    /// Renders the subtree, trivia included, one element per line.
    pub fn debug_tree(self) -> String {
        let mut buf = String::new();
        let mut indent = 0;
        for event in self.preorder_with_tokens() {
            match event {
                WalkEvent::Enter(node) => {
                    _ = writeln!(buf, "{:indent$}{:?}@{:?}", "", node.kind(), node.text_range());
                    indent += 2;
                }
                WalkEvent::Leave(_) => indent -= 2,
                WalkEvent::Token(token) => {
                    for trivia in token.leading_trivia() {
                        _ = writeln!(buf, "{:indent$}{trivia:?}", "");
                    }
                    _ = writeln!(buf, "{:indent$}{token:?}", "");
                    for trivia in token.trailing_trivia() {
                        _ = writeln!(buf, "{:indent$}{trivia:?}", "");
                    }
                }
            }
        }
        buf
    }
}

/// Token handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxToken<'a> {
    tree: &'a TreeInner,
    index: u32,
}

impl PartialEq for SyntaxToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for SyntaxToken<'_> {}

impl fmt::Debug for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.trimmed_range(), self.text_trimmed())
    }
}

impl<'a> SyntaxToken<'a> {
    /// Returns this token's kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.tree.token(self.index).kind
    }

    /// Returns the token text range including attached trivia.
    #[inline]
    pub fn text_range(self) -> TextRange {
        self.tree.token_full_range(self.index)
    }

    /// Returns the token text range excluding trivia.
    #[inline]
    pub fn trimmed_range(self) -> TextRange {
        self.tree.token(self.index).range
    }

    /// Returns the token text including trivia.
    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    /// Returns the token text excluding trivia.
    #[inline]
    pub fn text_trimmed(self) -> &'a str {
        &self.tree.text[self.trimmed_range()]
    }

    /// Returns the parent node.
    #[inline]
    pub fn parent(self) -> SyntaxNode<'a> {
        SyntaxNode { tree: self.tree, index: self.tree.token(self.index).parent }
    }

    /// Returns the previous token if any.
    #[inline]
    pub fn prev_token(self) -> Option<Self> {
        Some(Self { tree: self.tree, index: self.index.checked_sub(1)? })
    }

    /// Returns the next token if any.
    #[inline]
    pub fn next_token(self) -> Option<Self> {
        let index = self.index + 1;
        ((index as usize) < self.tree.tokens.len()).then_some(Self { tree: self.tree, index })
    }

    /// Iterates over leading trivia.
    #[inline]
    pub fn leading_trivia(self) -> TriviaIter<'a> {
        TriviaIter::new(self.tree, self.tree.token(self.index).leading)
    }

    /// Iterates over trailing trivia.
    #[inline]
    pub fn trailing_trivia(self) -> TriviaIter<'a> {
        TriviaIter::new(self.tree, self.tree.token(self.index).trailing)
    }
}

/// A piece of trivia attached to a token.
#[derive(Clone, Copy)]
pub struct SyntaxTrivia<'a> {
    tree: &'a TreeInner,
    index: u32,
}

impl fmt::Debug for SyntaxTrivia<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.text_range(), self.text())
    }
}

impl<'a> SyntaxTrivia<'a> {
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.tree.trivia(self.index).kind.syntax_kind()
    }

    #[inline]
    pub fn text_range(self) -> TextRange {
        self.tree.trivia(self.index).range
    }

    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    /// Returns the token this trivia is attached to.
    #[inline]
    pub fn token(self) -> SyntaxToken<'a> {
        SyntaxToken { tree: self.tree, index: self.tree.trivia(self.index).token }
    }
}

/// Iterator over the trivia attached to one side of a token.
#[derive(Clone)]
pub struct TriviaIter<'a> {
    tree: &'a TreeInner,
    indices: std::ops::Range<u32>,
}

impl<'a> TriviaIter<'a> {
    fn new(tree: &'a TreeInner, (start, len): (u32, u32)) -> Self {
        Self { tree, indices: start..start + len }
    }
}

impl<'a> Iterator for TriviaIter<'a> {
    type Item = SyntaxTrivia<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        Some(SyntaxTrivia { tree: self.tree, index: self.indices.next()? })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl DoubleEndedIterator for TriviaIter<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        Some(SyntaxTrivia { tree: self.tree, index: self.indices.next_back()? })
    }
}

impl ExactSizeIterator for TriviaIter<'_> {}

/// Node or token element inside the tree.
pub type SyntaxElement<'a> = NodeOrToken<SyntaxNode<'a>, SyntaxToken<'a>>;

impl SyntaxElement<'_> {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }
}

/// Iterator over the direct children of a node, tokens included.
#[derive(Clone)]
pub struct ChildrenWithTokens<'a> {
    tree: &'a TreeInner,
    children: std::slice::Iter<'a, Child>,
}

impl<'a> ChildrenWithTokens<'a> {
    #[inline]
    fn map_child(&self, child: &Child) -> SyntaxElement<'a> {
        match *child {
            Child::Node(index) => NodeOrToken::Node(SyntaxNode { tree: self.tree, index }),
            Child::Token(index) => NodeOrToken::Token(SyntaxToken { tree: self.tree, index }),
        }
    }
}

impl<'a> Iterator for ChildrenWithTokens<'a> {
    type Item = SyntaxElement<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let child = self.children.next()?;
        Some(self.map_child(child))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.children.size_hint()
    }
}

impl DoubleEndedIterator for ChildrenWithTokens<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let child = self.children.next_back()?;
        Some(self.map_child(child))
    }
}

impl ExactSizeIterator for ChildrenWithTokens<'_> {}

/// Preorder walk event including tokens.
#[derive(Clone, Copy, Debug)]
pub enum WalkEvent<'a> {
    Enter(SyntaxNode<'a>),
    Leave(SyntaxNode<'a>),
    Token(SyntaxToken<'a>),
}

/// Preorder traversal over nodes and tokens.
#[derive(Clone)]
pub struct PreorderWithTokens<'a> {
    stack: Vec<(SyntaxNode<'a>, ChildrenWithTokens<'a>)>,
    root: Option<SyntaxNode<'a>>,
}

impl<'a> PreorderWithTokens<'a> {
    #[inline]
    fn new(start: SyntaxNode<'a>) -> Self {
        Self { stack: Vec::with_capacity(128), root: Some(start) }
    }

    /// Skips the current subtree during traversal.
    #[inline]
    pub fn skip_subtree(&mut self) {
        assert!(self.stack.pop().is_some(), "must have a subtree to skip");
    }
}

impl<'a> Iterator for PreorderWithTokens<'a> {
    type Item = WalkEvent<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let Some((_, active_node)) = self.stack.last_mut() else {
            let root = self.root.take()?;
            self.stack.push((root, root.children_with_tokens()));
            return Some(WalkEvent::Enter(root));
        };
        match active_node.next() {
            Some(NodeOrToken::Node(child)) => {
                self.stack.push((child, child.children_with_tokens()));
                Some(WalkEvent::Enter(child))
            }
            Some(NodeOrToken::Token(child)) => Some(WalkEvent::Token(child)),
            None => {
                let (exited_node, _) = self.stack.pop().expect("should have an exited-from node");
                Some(WalkEvent::Leave(exited_node))
            }
        }
    }
}

/// Stable identifier for a node by kind and non-trivia text range.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxNodePtr {
    /// Node kind used for lookup.
    pub kind: SyntaxKind,
    /// Non-trivia text range used for lookup.
    pub range: TextRange,
}

impl SyntaxNodePtr {
    /// Builds a pointer from a concrete node.
    pub fn new(node: SyntaxNode<'_>) -> Self {
        Self { kind: node.kind(), range: node.trimmed_range() }
    }

    /// Attempts to resolve this pointer within `root`.
    pub fn try_to_node<'a>(&self, root: SyntaxNode<'a>) -> Option<SyntaxNode<'a>> {
        if root.parent().is_some() {
            return None;
        }

        let start_node = match root.covering_element(self.range) {
            NodeOrToken::Node(node) => node,
            NodeOrToken::Token(token) => token.parent(),
        };

        start_node
            .ancestors()
            .find(|node| node.kind() == self.kind && node.trimmed_range() == self.range)
    }

    #[track_caller]
    pub fn to_node<'a>(&self, root: SyntaxNode<'a>) -> SyntaxNode<'a> {
        self.try_to_node(root).unwrap()
    }
}

/// Node-or-token wrapper used throughout the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    /// Converts into the node variant, if any.
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Converts into the token variant, if any.
    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }

    /// Returns a shared reference to the node, if any.
    pub fn as_node(&self) -> Option<&N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Returns a shared reference to the token, if any.
    pub fn as_token(&self) -> Option<&T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

/// Offset helpers shared by consumers that only hold a range.
pub trait TextRangeExt {
    /// Returns `true` when the two ranges share at least one character.
    /// Ranges that only meet at an endpoint do not overlap.
    fn overlaps(&self, other: TextRange) -> bool;
}

impl TextRangeExt for TextRange {
    fn overlaps(&self, other: TextRange) -> bool {
        self.intersect(other).is_some_and(|common| !common.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;
    use crate::{Builder, TriviaPiece, TriviaPieceKind};

    fn piece(kind: TriviaPieceKind, len: u32) -> TriviaPiece {
        TriviaPiece::new(kind, len.into())
    }

    /// `-- c\nx = 1`
    fn assignment() -> SyntaxTree {
        let mut builder = Builder::new("-- c\nx = 1");
        builder.start_node(CHUNK);
        builder.start_node(ASSIGN_STMT);
        builder.start_node(NAME_REF);
        builder.token(
            [
                piece(TriviaPieceKind::SingleLineComment, 4),
                piece(TriviaPieceKind::Newline, 1),
            ]
            .into_iter(),
            IDENT,
            1.into(),
            [piece(TriviaPieceKind::Whitespace, 1)].into_iter(),
        );
        builder.finish_node();
        builder.token(
            std::iter::empty(),
            EQ,
            1.into(),
            [piece(TriviaPieceKind::Whitespace, 1)].into_iter(),
        );
        builder.start_node(LITERAL);
        builder.token(std::iter::empty(), NUMBER, 1.into(), std::iter::empty());
        builder.finish_node();
        builder.finish_node();
        builder.token(std::iter::empty(), EOF, 0.into(), std::iter::empty());
        builder.finish_node();
        builder.finish()
    }

    #[test]
    fn preorder_visits_trivia_owners_in_order() {
        let tree = assignment();
        let kinds: Vec<_> = tree
            .root()
            .preorder_with_tokens()
            .filter_map(|event| match event {
                WalkEvent::Token(token) => Some(token.kind()),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, [IDENT, EQ, NUMBER, EOF]);

        let ident = tree.tokens().next().unwrap();
        let leading: Vec<_> = ident.leading_trivia().map(|it| (it.kind(), it.text())).collect();
        assert_eq!(leading, [(LINE_COMMENT, "-- c"), (NEWLINE, "\n")]);
        assert_eq!(ident.parent().kind(), NAME_REF);
    }

    #[test]
    fn debug_tree() {
        let tree = assignment();
        expect_test::expect![[r#"
            CHUNK@0..10
              ASSIGN_STMT@0..10
                NAME_REF@0..7
                  LINE_COMMENT@0..4 "-- c"
                  NEWLINE@4..5 "\n"
                  IDENT@5..6 "x"
                  WHITESPACE@6..7 " "
                EQ@7..8 "="
                WHITESPACE@8..9 " "
                LITERAL@9..10
                  NUMBER@9..10 "1"
              EOF@10..10 ""
        "#]]
        .assert_eq(&tree.root().debug_tree());
    }

    #[test]
    fn node_ptr_finds_node_again() {
        let tree = assignment();
        let literal = tree
            .root()
            .preorder_with_tokens()
            .find_map(|event| match event {
                WalkEvent::Enter(node) if node.kind() == LITERAL => Some(node),
                _ => None,
            })
            .unwrap();
        let ptr = SyntaxNodePtr::new(literal);
        assert_eq!(ptr.to_node(tree.root()), literal);
    }

    #[test]
    fn token_at_offset_prefers_right_neighbour() {
        let tree = assignment();
        let root = tree.root();
        assert_eq!(root.token_at_offset(2.into()).unwrap().kind(), IDENT);
        assert_eq!(root.token_at_offset(7.into()).unwrap().kind(), EQ);
        assert_eq!(root.token_at_offset(10.into()).unwrap().kind(), EOF);
    }

    #[test]
    fn ranges_meeting_at_an_endpoint_do_not_overlap() {
        let range = |start: u32, end: u32| TextRange::new(start.into(), end.into());

        assert!(range(2, 6).overlaps(range(5, 9)));
        assert!(range(2, 6).overlaps(range(3, 4)));
        assert!(!range(2, 6).overlaps(range(6, 9)));
        assert!(!range(2, 6).overlaps(range(0, 2)));
        assert!(!range(2, 6).overlaps(range(4, 4)));
    }
}
