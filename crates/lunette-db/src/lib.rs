pub use lunette_errors::Diagnostic;
use lunette_analysis::HasBindings as _;
use lunette_inputs::File;
use lunette_parse::FileParse as _;
use salsa::Database;

#[salsa::db]
#[derive(Default, Clone)]
pub struct RootDatabase {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl Database for RootDatabase {}

/// Every diagnostic for `file`, ordered by position.
#[salsa::tracked(returns(ref), no_eq)]
pub fn check_file(db: &dyn Database, file: File) -> Vec<Diagnostic> {
    let mut diagnostics = file.parse(db).diagnostics().to_vec();
    diagnostics.extend_from_slice(file.bindings(db).diagnostics());
    diagnostics.sort_by_key(|diagnostic| (diagnostic.range().start(), diagnostic.range().end()));
    diagnostics
}
