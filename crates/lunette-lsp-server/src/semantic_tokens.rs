use lunette_ide::{SemanticToken, SemanticTokenModifier, SemanticTokenType};

pub(crate) fn legend() -> lsp_types::SemanticTokensLegend {
    lsp_types::SemanticTokensLegend {
        token_types: SemanticTokenType::ALL
            .iter()
            .map(|token_type| lsp_types::SemanticTokenType::new(token_type.as_str()))
            .collect(),
        token_modifiers: SemanticTokenModifier::LEGEND
            .iter()
            .map(|&name| lsp_types::SemanticTokenModifier::new(name))
            .collect(),
    }
}

/// Relative encoding of `tokens`, which must be sorted by position.
///
/// `delta_start` is relative to the previous token only on the same line.
pub(crate) fn encode(tokens: &[SemanticToken]) -> Vec<lsp_types::SemanticToken> {
    let mut previous_line = 0;
    let mut previous_column = 0;

    tokens
        .iter()
        .map(|token| {
            let delta_line = token.line - previous_line;
            let delta_start =
                if delta_line == 0 { token.column - previous_column } else { token.column };
            previous_line = token.line;
            previous_column = token.column;

            lsp_types::SemanticToken {
                delta_line,
                delta_start,
                length: token.length,
                token_type: token.token_type.index(),
                token_modifiers_bitset: token.modifiers.bits(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use lunette_ide::{SemanticToken, SemanticTokenModifier, SemanticTokenType};

    use super::{encode, legend};

    fn token(
        line: u32,
        column: u32,
        length: u32,
        token_type: SemanticTokenType,
        modifiers: SemanticTokenModifier,
    ) -> SemanticToken {
        SemanticToken { line, column, length, token_type, modifiers }
    }

    #[test]
    fn legend_uses_standard_names() {
        let legend = legend();
        assert_eq!(legend.token_types.len(), SemanticTokenType::ALL.len());
        assert_eq!(legend.token_types[0], lsp_types::SemanticTokenType::COMMENT);
        assert_eq!(
            legend.token_types[SemanticTokenType::Function.index() as usize],
            lsp_types::SemanticTokenType::FUNCTION
        );
        assert_eq!(
            legend.token_types[SemanticTokenType::Property.index() as usize],
            lsp_types::SemanticTokenType::PROPERTY
        );
        assert_eq!(
            legend.token_modifiers,
            [
                lsp_types::SemanticTokenModifier::DECLARATION,
                lsp_types::SemanticTokenModifier::READONLY,
                lsp_types::SemanticTokenModifier::STATIC,
                lsp_types::SemanticTokenModifier::DEFAULT_LIBRARY,
            ]
        );
    }

    #[test]
    fn deltas() {
        let empty = SemanticTokenModifier::empty();
        let tokens = [
            token(0, 0, 5, SemanticTokenType::Keyword, empty),
            token(0, 6, 1, SemanticTokenType::Variable, SemanticTokenModifier::DECLARATION),
            token(2, 4, 3, SemanticTokenType::Function, empty),
            token(2, 9, 1, SemanticTokenType::Number, empty),
            token(3, 2, 6, SemanticTokenType::Comment, empty),
        ];

        let data: Vec<_> = encode(&tokens)
            .into_iter()
            .map(|token| {
                [
                    token.delta_line,
                    token.delta_start,
                    token.length,
                    token.token_type,
                    token.token_modifiers_bitset,
                ]
            })
            .collect();

        assert_eq!(
            data,
            [[0, 0, 5, 1, 0], [0, 6, 1, 5, 1], [2, 4, 3, 6, 0], [0, 5, 1, 3, 0], [1, 2, 6, 0, 0]]
        );
    }

    #[test]
    fn nothing_to_encode() {
        assert!(encode(&[]).is_empty());
    }
}
