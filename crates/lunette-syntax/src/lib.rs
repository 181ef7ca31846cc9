//! Lossless, immutable syntax tree for Lua with parent links and attached trivia.
//!
//! The tree is built once from parser events and then navigated through
//! lifetime-bound handles that are plain indices into flat arrays.

/// Typed AST wrappers around the raw syntax tree.
pub mod ast;
mod builder;
mod syntax;
mod syntax_kind;
mod syntax_set;
mod tree;
mod trivia;

/// Incremental builder for constructing a `SyntaxTree`.
pub use builder::Builder;
/// Primary syntax tree API types.
pub use syntax::{
    ChildrenWithTokens, NodeOrToken, PreorderWithTokens, SyntaxElement, SyntaxNode,
    SyntaxNodePtr, SyntaxToken, SyntaxTree, SyntaxTrivia, TextRangeExt, TriviaIter, WalkEvent,
};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
pub use text_size::{TextRange, TextSize};
/// Trivia pieces attached to tokens.
pub use trivia::{TriviaPiece, TriviaPieceKind};
