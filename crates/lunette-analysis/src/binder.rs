//! Single pass over a chunk that builds [`Bindings`].
//!
//! Locals follow Lua's lexical rules. Unqualified names that no local covers
//! are globals, which are file-wide: a read resolves to a global only when
//! the name is assigned somewhere in the file, so reads are settled after
//! the whole chunk has been seen.

use indexmap::map::Entry;
use lunette_errors::Diagnostic;
use lunette_syntax::SyntaxKind::*;
use lunette_syntax::ast::{self, Node as _};
use lunette_syntax::{SyntaxNode, SyntaxNodePtr};

use crate::bindings::{Attribute, Bindings, Variable, VariableInfo, VariableKind};

type FxIndexMap<K, V> =
    indexmap::IndexMap<K, V, std::hash::BuildHasherDefault<rustc_hash::FxHasher>>;

#[derive(Default)]
pub(crate) struct BindingsBuilder {
    bindings: Bindings,
    scopes: Vec<Vec<(Box<str>, Variable)>>,
    globals: FxIndexMap<Box<str>, Variable>,
    unresolved_reads: Vec<(Box<str>, SyntaxNodePtr)>,
}

impl BindingsBuilder {
    pub(crate) fn build(mut self, root: SyntaxNode<'_>) -> Bindings {
        self.scoped(|this| this.children(root));

        for (name, ptr) in std::mem::take(&mut self.unresolved_reads) {
            if let Some(&global) = self.globals.get(&name) {
                self.bindings.resolutions.insert(ptr, global);
            }
        }

        log::trace!(
            "bound {} variables, {} globals",
            self.bindings.variables.len(),
            self.globals.len()
        );
        self.bindings
    }

    fn scoped(&mut self, f: impl FnOnce(&mut Self)) {
        self.scopes.push(Vec::new());
        f(self);
        self.scopes.pop();
    }

    fn children(&mut self, node: SyntaxNode<'_>) {
        for child in node.children() {
            self.node(child);
        }
    }

    fn node(&mut self, node: SyntaxNode<'_>) {
        match node.kind() {
            BLOCK => self.scoped(|this| this.children(node)),
            NAME_REF => self.read(node),
            LOCAL_STMT => self.local_stmt(node),
            LOCAL_FUNCTION_STMT => {
                // Visible inside its own body.
                if let Some(name) = node.children().find_map(ast::Name::cast) {
                    self.declare(name, VariableKind::Local, true);
                }
                self.function(node, false);
            }
            FUNCTION_STMT => {
                let stmt = ast::FunctionStmt::cast(node);
                let name = stmt.and_then(ast::FunctionStmt::name);
                let mut is_method = false;
                if let Some(name) = name {
                    is_method = name.method().is_some();
                    if let Some(base) = name.base() {
                        if name.is_plain() {
                            self.write(base.syntax());
                        } else {
                            self.read(base.syntax());
                        }
                    }
                }
                self.function(node, is_method);
            }
            FUNCTION_EXPR => self.function(node, false),
            ASSIGN_STMT => {
                let stmt = ast::AssignStmt::cast(node);
                if let Some(values) = stmt.and_then(ast::AssignStmt::values) {
                    self.children(values.syntax());
                }
                let targets = stmt.and_then(ast::AssignStmt::targets);
                for target in targets.into_iter().flat_map(ast::ExprList::exprs) {
                    match target.kind() {
                        NAME_REF => self.write(target),
                        _ => self.node(target),
                    }
                }
            }
            NUMERIC_FOR_STMT => {
                let Some(stmt) = ast::NumericForStmt::cast(node) else { return };
                for bound in stmt.bounds() {
                    self.node(bound);
                }
                self.scoped(|this| {
                    if let Some(name) = stmt.name() {
                        this.declare(name, VariableKind::Local, true);
                    }
                    if let Some(body) = stmt.body() {
                        this.node(body.syntax());
                    }
                });
            }
            GENERIC_FOR_STMT => {
                let Some(stmt) = ast::GenericForStmt::cast(node) else { return };
                if let Some(iterators) = stmt.iterators() {
                    self.children(iterators.syntax());
                }
                self.scoped(|this| {
                    for name in stmt.names() {
                        this.declare(name, VariableKind::Local, true);
                    }
                    if let Some(body) = stmt.body() {
                        this.node(body.syntax());
                    }
                });
            }
            REPEAT_STMT => {
                let Some(stmt) = ast::RepeatStmt::cast(node) else { return };
                // The condition sees the body's locals.
                self.scoped(|this| {
                    if let Some(body) = stmt.body() {
                        this.children(body.syntax());
                    }
                    if let Some(condition) = stmt.condition() {
                        this.node(condition);
                    }
                });
            }
            _ => self.children(node),
        }
    }

    fn local_stmt(&mut self, node: SyntaxNode<'_>) {
        let Some(stmt) = ast::LocalStmt::cast(node) else { return };
        let values = stmt.values();
        if let Some(values) = values {
            self.children(values.syntax());
        }

        let mut last = None;
        for child in node.children() {
            if let Some(name) = ast::Name::cast(child) {
                last = Some(self.declare(name, VariableKind::Local, values.is_some()));
            } else if let Some(attrib) = ast::Attrib::cast(child) {
                let attribute = match attrib.name() {
                    "const" => Attribute::Const,
                    "close" => Attribute::Close,
                    unknown => {
                        self.bindings.diagnostics.push(Diagnostic::error(
                            format!("unknown attribute '{unknown}'"),
                            attrib.syntax().trimmed_range(),
                        ));
                        continue;
                    }
                };
                if let Some(variable) = last {
                    self.bindings.variables[variable].attribute = Some(attribute);
                }
            }
        }
    }

    /// Parameters and body of any function form.
    fn function(&mut self, node: SyntaxNode<'_>, is_method: bool) {
        self.scoped(|this| {
            if is_method {
                let variable = this.bindings.variables.alloc(VariableInfo {
                    name: "self".into(),
                    kind: VariableKind::Parameter,
                    attribute: None,
                    declaration: None,
                    write_sites: Vec::new(),
                });
                this.push_to_scope("self".into(), variable);
            }

            for child in node.children() {
                match child.kind() {
                    PARAM_LIST => {
                        let params = ast::ParamList::cast(child).into_iter();
                        for param in params.flat_map(ast::ParamList::params) {
                            this.declare(param, VariableKind::Parameter, true);
                        }
                    }
                    BLOCK => this.node(child),
                    _ => {}
                }
            }
        });
    }

    fn declare(&mut self, name: ast::Name<'_>, kind: VariableKind, initialised: bool) -> Variable {
        let ptr = SyntaxNodePtr::new(name.syntax());
        let variable = self.bindings.variables.alloc(VariableInfo {
            name: name.text().into(),
            kind,
            attribute: None,
            declaration: Some(ptr),
            write_sites: if initialised { vec![ptr] } else { Vec::new() },
        });
        self.bindings.resolutions.insert(ptr, variable);
        self.push_to_scope(name.text().into(), variable);
        variable
    }

    fn push_to_scope(&mut self, name: Box<str>, variable: Variable) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.push((name, variable));
        }
    }

    fn lookup(&self, name: &str) -> Option<Variable> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find_map(|(local, variable)| (&**local == name).then_some(*variable))
    }

    fn read(&mut self, node: SyntaxNode<'_>) {
        let Some(name_ref) = ast::NameRef::cast(node) else { return };
        let ptr = SyntaxNodePtr::new(node);
        match self.lookup(name_ref.text()) {
            Some(variable) => {
                self.bindings.resolutions.insert(ptr, variable);
            }
            None => self.unresolved_reads.push((name_ref.text().into(), ptr)),
        }
    }

    fn write(&mut self, node: SyntaxNode<'_>) {
        let Some(name_ref) = ast::NameRef::cast(node) else { return };
        let ptr = SyntaxNodePtr::new(node);
        let name = name_ref.text();

        let variable = match self.lookup(name) {
            Some(variable) => variable,
            None => match self.globals.entry(name.into()) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    let variable = self.bindings.variables.alloc(VariableInfo {
                        name: name.into(),
                        kind: VariableKind::Global,
                        attribute: None,
                        declaration: None,
                        write_sites: Vec::new(),
                    });
                    *entry.insert(variable)
                }
            },
        };

        let info = &mut self.bindings.variables[variable];
        if info.attribute.is_some() {
            self.bindings.diagnostics.push(Diagnostic::error(
                format!("attempt to assign to const variable '{name}'"),
                node.trimmed_range(),
            ));
        }
        info.write_sites.push(ptr);
        self.bindings.resolutions.insert(ptr, variable);
    }
}
