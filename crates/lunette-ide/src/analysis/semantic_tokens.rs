use lunette_analysis::HasBindings as _;
use lunette_inputs::File;
use lunette_parse::FileParse as _;
use lunette_syntax::TextRange;
use salsa::Database;

use crate::highlight::{self, HighlightConfig, PositionEncoding, SemanticToken, SpanMapper};
use crate::{Cancellation, Cancelled};

fn semantic_tokens(
    db: &dyn Database,
    config: &HighlightConfig,
    file: File,
    range: Option<TextRange>,
    encoding: PositionEncoding,
    cancel: &Cancellation,
) -> Result<Vec<SemanticToken>, Cancelled> {
    cancel.check()?;
    let parse = file.parse(db);
    let bindings = file.bindings(db);
    let mapper = SpanMapper::new(file.text(db), file.line_index(db), encoding);
    highlight::highlight(parse.syntax_node(), bindings, mapper, config, range, cancel)
}

impl super::Analysis {
    pub fn semantic_tokens(
        &self,
        file: File,
        range: Option<TextRange>,
        encoding: PositionEncoding,
        cancel: &Cancellation,
    ) -> Result<Vec<SemanticToken>, Cancelled> {
        semantic_tokens(&self.db, &self.config, file, range, encoding, cancel)
    }
}

impl super::AnalysisSnapshot {
    pub fn semantic_tokens(
        &self,
        file: File,
        range: Option<TextRange>,
        encoding: PositionEncoding,
        cancel: &Cancellation,
    ) -> Result<Vec<SemanticToken>, Cancelled> {
        semantic_tokens(&self.db, &self.config, file, range, encoding, cancel)
    }
}
