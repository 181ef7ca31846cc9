use la_arena::{Arena, Idx};
use lunette_errors::Diagnostic;
use lunette_syntax::{SyntaxNode, SyntaxNodePtr};
use rustc_hash::FxHashMap;

pub type Variable = Idx<VariableInfo>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Local,
    Global,
    Parameter,
}

/// Lua 5.4 local variable attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Const,
    Close,
}

/// Facts about one variable, shared by every occurrence that resolves to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableInfo {
    pub(crate) name: Box<str>,
    pub(crate) kind: VariableKind,
    pub(crate) attribute: Option<Attribute>,
    pub(crate) declaration: Option<SyntaxNodePtr>,
    pub(crate) write_sites: Vec<SyntaxNodePtr>,
}

impl VariableInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn attribute(&self) -> Option<Attribute> {
        self.attribute
    }

    /// The `NAME` that introduces the variable. Globals and the implicit
    /// `self` of a method have none.
    pub fn declaration(&self) -> Option<SyntaxNodePtr> {
        self.declaration
    }

    /// Every place that stores a value into the variable.
    pub fn write_sites(&self) -> &[SyntaxNodePtr] {
        &self.write_sites
    }
}

/// Name resolution for one file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    pub(crate) variables: Arena<VariableInfo>,
    pub(crate) resolutions: FxHashMap<SyntaxNodePtr, Variable>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

unsafe impl salsa::Update for Bindings {
    unsafe fn maybe_update(old_pointer: *mut Self, new_value: Self) -> bool {
        let old_value = unsafe { &mut *old_pointer };
        if *old_value == new_value {
            false
        } else {
            *old_value = new_value;
            true
        }
    }
}

impl Bindings {
    /// Resolves a `NAME` or `NAME_REF` node.
    pub fn resolve(&self, node: SyntaxNode<'_>) -> Option<&VariableInfo> {
        self.variable_of(node).map(|variable| &self.variables[variable])
    }

    pub fn variable_of(&self, node: SyntaxNode<'_>) -> Option<Variable> {
        self.resolutions.get(&SyntaxNodePtr::new(node)).copied()
    }

    pub fn variable(&self, variable: Variable) -> &VariableInfo {
        &self.variables[variable]
    }

    pub fn variables(&self) -> impl Iterator<Item = (Variable, &VariableInfo)> + '_ {
        self.variables.iter()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
