//! Editor-facing queries over the Lua database, chiefly semantic highlighting.

mod analysis;
mod cancellation;
pub mod highlight;

pub use analysis::{Analysis, AnalysisSnapshot};
pub use cancellation::{Cancellation, Cancelled};
pub use highlight::{
    HighlightConfig, PositionEncoding, ResolveVariable, SemanticToken, SemanticTokenModifier,
    SemanticTokenType,
};
pub use lunette_db::Diagnostic;
pub use lunette_inputs::{File, LineIndex};
