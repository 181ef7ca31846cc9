mod semantic_tokens;

use std::sync::Arc;

use lunette_db::{Diagnostic, RootDatabase, check_file};
use lunette_inputs::File;

use crate::HighlightConfig;

/// Owner of the database. Edits go through [`Analysis::db_mut`], queries
/// for background threads through an [`AnalysisSnapshot`].
#[derive(Default)]
pub struct Analysis {
    db: RootDatabase,
    config: Arc<HighlightConfig>,
}

impl Analysis {
    pub fn db(&self) -> &RootDatabase {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut RootDatabase {
        &mut self.db
    }

    pub fn set_highlight_config(&mut self, config: HighlightConfig) {
        self.config = Arc::new(config);
    }

    pub fn snapshot(&self) -> AnalysisSnapshot {
        AnalysisSnapshot { db: self.db.clone(), config: Arc::clone(&self.config) }
    }

    pub fn diagnostics(&self, file: File) -> &[Diagnostic] {
        check_file(&self.db, file)
    }
}

/// Read-only handle for queries on another thread.
///
/// Mutating the [`Analysis`] it came from waits until every snapshot is
/// dropped; queries running on a snapshot meanwhile unwind with
/// [`salsa::Cancelled`].
pub struct AnalysisSnapshot {
    db: RootDatabase,
    config: Arc<HighlightConfig>,
}

impl AnalysisSnapshot {
    pub fn db(&self) -> &RootDatabase {
        &self.db
    }

    pub fn diagnostics(&self, file: File) -> Vec<Diagnostic> {
        check_file(&self.db, file).clone()
    }
}
