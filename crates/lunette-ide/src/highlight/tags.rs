use std::fmt;

/// Token types, in legend order.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticTokenType {
    Comment,
    Keyword,
    String,
    Number,
    Operator,
    Variable,
    Function,
    Method,
    Property,
    Type,
}

impl SemanticTokenType {
    pub const ALL: [Self; 10] = [
        Self::Comment,
        Self::Keyword,
        Self::String,
        Self::Number,
        Self::Operator,
        Self::Variable,
        Self::Function,
        Self::Method,
        Self::Property,
        Self::Type,
    ];

    /// Position in the legend.
    pub fn index(self) -> u32 {
        self as u32
    }

    /// The standard LSP name of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Keyword => "keyword",
            Self::String => "string",
            Self::Number => "number",
            Self::Operator => "operator",
            Self::Variable => "variable",
            Self::Function => "function",
            Self::Method => "method",
            Self::Property => "property",
            Self::Type => "type",
        }
    }
}

impl fmt::Display for SemanticTokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags::bitflags! {
    /// Token modifiers. Bit `n` is entry `n` of [`SemanticTokenModifier::LEGEND`].
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SemanticTokenModifier: u32 {
        const DECLARATION = 1 << 0;
        const READONLY = 1 << 1;
        const STATIC = 1 << 2;
        const DEFAULT_LIBRARY = 1 << 3;
    }
}

impl SemanticTokenModifier {
    pub const LEGEND: [&'static str; 4] = ["declaration", "readonly", "static", "defaultLibrary"];

    /// Names of the set modifiers, in legend order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::LEGEND
            .into_iter()
            .enumerate()
            .filter(move |&(bit, _)| self.bits() & (1 << bit) != 0)
            .map(|(_, name)| name)
    }
}

impl fmt::Display for SemanticTokenModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_order_matches_discriminants() {
        for (i, ty) in SemanticTokenType::ALL.into_iter().enumerate() {
            assert_eq!(ty.index() as usize, i);
        }
        let legend_bits = (1 << SemanticTokenModifier::LEGEND.len()) - 1;
        assert_eq!(SemanticTokenModifier::all().bits(), legend_bits);
    }

    #[test]
    fn modifier_names() {
        let modifiers = SemanticTokenModifier::DEFAULT_LIBRARY | SemanticTokenModifier::STATIC;
        assert_eq!(modifiers.to_string(), "static, defaultLibrary");
        assert_eq!(SemanticTokenModifier::empty().to_string(), "");
    }
}
