use lunette_analysis::{VariableInfo, VariableKind};

use super::{HighlightConfig, SemanticTokenModifier, SemanticTokenType};

/// How an identifier is highlighted once its binding is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableModifiers {
    /// Replaces the type the syntactic shape would give, for standard names.
    pub token_type: Option<SemanticTokenType>,
    pub modifiers: SemanticTokenModifier,
}

/// Derives the modifiers of an identifier named `name`.
///
/// An identifier without binding is only highlighted when it names a
/// standard function or library. Otherwise a variable written at most once
/// is readonly and a global is static.
pub fn resolve_modifiers(
    name: &str,
    info: Option<&VariableInfo>,
    config: &HighlightConfig,
) -> Option<VariableModifiers> {
    let Some(info) = info else {
        let token_type = config.library_type(name)?;
        return Some(VariableModifiers {
            token_type: Some(token_type),
            modifiers: SemanticTokenModifier::STATIC | SemanticTokenModifier::DEFAULT_LIBRARY,
        });
    };

    let mut modifiers = SemanticTokenModifier::empty();
    if info.write_sites().len() <= 1 {
        modifiers |= SemanticTokenModifier::READONLY;
    }
    if info.kind() == VariableKind::Global {
        modifiers |= SemanticTokenModifier::STATIC;
    }
    Some(VariableModifiers { token_type: None, modifiers })
}

/// Modifiers added to every token emitted below some construct.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ModifierContext {
    modifiers: SemanticTokenModifier,
}

impl ModifierContext {
    pub(crate) fn with(self, modifiers: SemanticTokenModifier) -> Self {
        Self { modifiers: self.modifiers | modifiers }
    }

    pub(crate) fn apply(self, modifiers: SemanticTokenModifier) -> SemanticTokenModifier {
        self.modifiers | modifiers
    }
}
