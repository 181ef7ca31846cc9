//! Error-tolerant Lua 5.4 parser producing a lossless [`SyntaxTree`].

mod grammar;
mod parser;

use lunette_errors::Diagnostic;
use lunette_inputs::File;
use lunette_syntax::{SyntaxNode, SyntaxTree};
use salsa::Database;

/// Result of parsing one file. Parsing never fails; problems are reported
/// as diagnostics next to a tree that still covers the whole text.
#[derive(Debug)]
pub struct Parse {
    tree: SyntaxTree,
    diagnostics: Vec<Diagnostic>,
}

unsafe impl salsa::Update for Parse {
    unsafe fn maybe_update(old_pointer: *mut Self, new_value: Self) -> bool {
        let old_value = unsafe { &mut *old_pointer };
        if old_value.tree.text() == new_value.tree.text() {
            false
        } else {
            *old_value = new_value;
            true
        }
    }
}

impl Parse {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn syntax_node(&self) -> SyntaxNode<'_> {
        self.tree.root()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

pub fn parse(text: &str) -> Parse {
    let mut parser = parser::Parser::new(text);
    grammar::chunk(&mut parser);
    let (tree, diagnostics) = parser.build_tree();
    Parse { tree, diagnostics }
}

pub trait FileParse {
    fn parse(self, db: &dyn Database) -> &Parse;
}

#[salsa::tracked]
impl FileParse for File {
    #[salsa::tracked(returns(ref), no_eq)]
    fn parse(self, db: &dyn Database) -> Parse {
        crate::parse(self.text(db))
    }
}
