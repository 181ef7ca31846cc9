//! Semantic token classification.
//!
//! One run walks the whole syntax tree, trivia included, in source order and
//! classifies tokens from their syntactic shape and from the binding facts of
//! the identifiers it meets. The result is an ordered list of absolute
//! tokens; delta encoding is left to the protocol layer.

mod accumulator;
mod config;
mod modifiers;
mod span_mapper;
mod tags;
#[cfg(test)]
mod tests;
mod walker;

use lunette_analysis::{Bindings, VariableInfo};
use lunette_syntax::{SyntaxNode, TextRange};

pub use self::accumulator::{SemanticToken, TokenAccumulator};
pub use self::config::HighlightConfig;
pub use self::modifiers::{VariableModifiers, resolve_modifiers};
pub use self::span_mapper::{Fragment, PositionEncoding, SpanMapper};
pub use self::tags::{SemanticTokenModifier, SemanticTokenType};
use crate::{Cancellation, Cancelled};

/// Binding facts for identifier nodes.
pub trait ResolveVariable {
    /// Resolves a `NAME` or `NAME_REF` node. `None` means the identifier
    /// refers to nothing the analysis knows about.
    fn resolve(&self, node: SyntaxNode<'_>) -> Option<&VariableInfo>;
}

impl ResolveVariable for Bindings {
    fn resolve(&self, node: SyntaxNode<'_>) -> Option<&VariableInfo> {
        Bindings::resolve(self, node)
    }
}

/// Classifies every token under `root`.
///
/// With a `range`, only tokens overlapping it are reported.
pub fn highlight<R: ResolveVariable + ?Sized>(
    root: SyntaxNode<'_>,
    resolver: &R,
    mapper: SpanMapper<'_>,
    config: &HighlightConfig,
    range: Option<TextRange>,
    cancel: &Cancellation,
) -> Result<Vec<SemanticToken>, Cancelled> {
    let tokens = TokenAccumulator::new(mapper, range);
    let tokens = walker::Walker::new(resolver, config, cancel, tokens).run(root)?;
    log::trace!("classified {} semantic tokens", tokens.len());
    Ok(tokens)
}
