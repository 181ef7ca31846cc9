use lunette_syntax::SyntaxKind::*;
use lunette_syntax::ast::{self, Node as _};
use lunette_syntax::{NodeOrToken, SyntaxNode, SyntaxToken, SyntaxTrivia};

use super::modifiers::ModifierContext;
use super::{
    HighlightConfig, ResolveVariable, SemanticToken, SemanticTokenModifier, SemanticTokenType,
    TokenAccumulator, resolve_modifiers,
};
use crate::{Cancellation, Cancelled};

type Classification = Option<(SemanticTokenType, SemanticTokenModifier)>;

pub(crate) struct Walker<'a, R: ?Sized> {
    resolver: &'a R,
    config: &'a HighlightConfig,
    cancel: &'a Cancellation,
    tokens: TokenAccumulator<'a>,
}

impl<'a, R: ResolveVariable + ?Sized> Walker<'a, R> {
    pub(crate) fn new(
        resolver: &'a R,
        config: &'a HighlightConfig,
        cancel: &'a Cancellation,
        tokens: TokenAccumulator<'a>,
    ) -> Self {
        Self { resolver, config, cancel, tokens }
    }

    pub(crate) fn run(mut self, root: SyntaxNode<'_>) -> Result<Vec<SemanticToken>, Cancelled> {
        self.node(root, ModifierContext::default())?;
        Ok(self.tokens.finish())
    }

    fn node(&mut self, node: SyntaxNode<'_>, cx: ModifierContext) -> Result<(), Cancelled> {
        self.cancel.check()?;
        if !self.tokens.wants(node.text_range()) {
            return Ok(());
        }

        match node.kind() {
            NAME | NAME_REF => self.identifier(node, SemanticTokenType::Variable, cx),
            CALL_EXPR => self.call(node, cx),
            METHOD_CALL_EXPR => self.member(node, SemanticTokenType::Method, cx),
            FIELD_EXPR => self.member(node, SemanticTokenType::Property, cx),
            FUNCTION_NAME => self.function_name(node, cx),
            LOCAL_FUNCTION_STMT => self.declarations(node, SemanticTokenType::Function, cx),
            LOCAL_STMT | PARAM_LIST | NUMERIC_FOR_STMT | GENERIC_FOR_STMT => {
                self.declarations(node, SemanticTokenType::Variable, cx)
            }
            TABLE_FIELD => self.table_field(node, cx),
            _ => self.children(node, cx),
        }
    }

    fn children(&mut self, node: SyntaxNode<'_>, cx: ModifierContext) -> Result<(), Cancelled> {
        for element in node.children_with_tokens() {
            match element {
                NodeOrToken::Node(child) => self.node(child, cx)?,
                NodeOrToken::Token(token) => self.token(token, cx),
            }
        }
        Ok(())
    }

    /// A `NAME` or `NAME_REF`, highlighted as `token_type` unless it turns
    /// out to be a standard name.
    fn identifier(
        &mut self,
        node: SyntaxNode<'_>,
        token_type: SemanticTokenType,
        cx: ModifierContext,
    ) -> Result<(), Cancelled> {
        let Some(ident) = node.child_token(IDENT) else {
            return self.children(node, cx);
        };

        let info = self.resolver.resolve(node);
        let classification = resolve_modifiers(ident.text_trimmed(), info, self.config)
            .map(|resolved| (resolved.token_type.unwrap_or(token_type), resolved.modifiers));
        self.emit(ident, classification, cx);
        Ok(())
    }

    /// `callee(args)`: the callee is named as a function.
    fn call(&mut self, node: SyntaxNode<'_>, cx: ModifierContext) -> Result<(), Cancelled> {
        let callee = ast::CallExpr::cast(node).and_then(ast::CallExpr::callee);

        for element in node.children_with_tokens() {
            match element {
                NodeOrToken::Node(child) if Some(child) == callee => {
                    self.cancel.check()?;
                    match child.kind() {
                        NAME_REF => self.identifier(child, SemanticTokenType::Function, cx)?,
                        FIELD_EXPR => self.member(child, SemanticTokenType::Function, cx)?,
                        _ => self.node(child, cx)?,
                    }
                }
                NodeOrToken::Node(child) => self.node(child, cx)?,
                NodeOrToken::Token(token) => self.token(token, cx),
            }
        }
        Ok(())
    }

    /// `base.name` and `receiver:name(args)`: the name gets `token_type`.
    fn member(
        &mut self,
        node: SyntaxNode<'_>,
        token_type: SemanticTokenType,
        cx: ModifierContext,
    ) -> Result<(), Cancelled> {
        for element in node.children_with_tokens() {
            match element {
                NodeOrToken::Node(child) => self.node(child, cx)?,
                NodeOrToken::Token(token) if token.kind() == IDENT => {
                    self.emit(token, Some((token_type, SemanticTokenModifier::empty())), cx);
                }
                NodeOrToken::Token(token) => self.token(token, cx),
            }
        }
        Ok(())
    }

    /// `a.b.c` or `a.b:c` after `function`.
    fn function_name(
        &mut self,
        node: SyntaxNode<'_>,
        cx: ModifierContext,
    ) -> Result<(), Cancelled> {
        let Some(name) = ast::FunctionName::cast(node) else {
            return self.children(node, cx);
        };
        let declaration = cx.with(SemanticTokenModifier::DECLARATION);
        let method = name.method();
        let last_field = name.fields().last();
        let plain = name.is_plain();

        for element in node.children_with_tokens() {
            match element {
                NodeOrToken::Node(child) if child.kind() == NAME_REF && plain => {
                    self.identifier(child, SemanticTokenType::Function, declaration)?;
                }
                NodeOrToken::Node(child) => self.node(child, cx)?,
                NodeOrToken::Token(token) if Some(token) == method => {
                    let method = (SemanticTokenType::Method, SemanticTokenModifier::empty());
                    self.emit(token, Some(method), declaration);
                }
                NodeOrToken::Token(token) if Some(token) == last_field && method.is_none() => {
                    let function = (SemanticTokenType::Function, SemanticTokenModifier::empty());
                    self.emit(token, Some(function), declaration);
                }
                NodeOrToken::Token(token) if token.kind() == IDENT => {
                    let field = (SemanticTokenType::Property, SemanticTokenModifier::empty());
                    self.emit(token, Some(field), cx);
                }
                NodeOrToken::Token(token) => self.token(token, cx),
            }
        }
        Ok(())
    }

    /// A construct that introduces names. Only the `NAME` children are
    /// declarations; initialisers and bodies are visited as usual.
    fn declarations(
        &mut self,
        node: SyntaxNode<'_>,
        token_type: SemanticTokenType,
        cx: ModifierContext,
    ) -> Result<(), Cancelled> {
        let declaration = cx.with(SemanticTokenModifier::DECLARATION);
        for element in node.children_with_tokens() {
            match element {
                NodeOrToken::Node(child) if child.kind() == NAME => {
                    self.cancel.check()?;
                    self.identifier(child, token_type, declaration)?;
                }
                NodeOrToken::Node(child) => self.node(child, cx)?,
                NodeOrToken::Token(token) => self.token(token, cx),
            }
        }
        Ok(())
    }

    /// `{ name = value }`: the key is a property.
    fn table_field(&mut self, node: SyntaxNode<'_>, cx: ModifierContext) -> Result<(), Cancelled> {
        let key = ast::TableField::cast(node).and_then(ast::TableField::name);
        for element in node.children_with_tokens() {
            match element {
                NodeOrToken::Node(child) => self.node(child, cx)?,
                NodeOrToken::Token(token) if Some(token) == key => {
                    let property = (SemanticTokenType::Property, SemanticTokenModifier::empty());
                    self.emit(token, Some(property), cx);
                }
                NodeOrToken::Token(token) => self.token(token, cx),
            }
        }
        Ok(())
    }

    fn token(&mut self, token: SyntaxToken<'_>, cx: ModifierContext) {
        let classification = self
            .config
            .token_type(token.kind(), token.parent().kind())
            .map(|token_type| (token_type, SemanticTokenModifier::empty()));
        self.emit(token, classification, cx);
    }

    /// Emits `token` with its trivia around it.
    fn emit(&mut self, token: SyntaxToken<'_>, classification: Classification, cx: ModifierContext) {
        for trivia in token.leading_trivia() {
            self.trivia(trivia);
        }
        if let Some((token_type, modifiers)) = classification {
            self.tokens.push(token.trimmed_range(), token_type, cx.apply(modifiers));
        }
        for trivia in token.trailing_trivia() {
            self.trivia(trivia);
        }
    }

    /// Comments never inherit modifiers from the construct around them.
    fn trivia(&mut self, trivia: SyntaxTrivia<'_>) {
        if let Some(token_type) = HighlightConfig::trivia_type(trivia.kind()) {
            self.tokens.push(trivia.text_range(), token_type, SemanticTokenModifier::empty());
        }
    }
}
