//! Name resolution for Lua: which variable every identifier refers to, and
//! where each variable is written.

mod binder;
mod bindings;

pub use bindings::{Attribute, Bindings, Variable, VariableInfo, VariableKind};
use lunette_inputs::File;
use lunette_parse::FileParse as _;
use lunette_syntax::SyntaxNode;
use salsa::Database;

impl Bindings {
    pub fn build(root: SyntaxNode<'_>) -> Self {
        binder::BindingsBuilder::default().build(root)
    }
}

pub trait HasBindings {
    fn bindings(self, db: &dyn Database) -> &Bindings;
}

#[salsa::tracked]
impl HasBindings for File {
    #[salsa::tracked(returns(ref), no_eq)]
    fn bindings(self, db: &dyn Database) -> Bindings {
        Bindings::build(self.parse(db).syntax_node())
    }
}
