use crate::SyntaxKind::*;
use crate::{SyntaxKind, SyntaxNode, SyntaxToken};

pub trait Node<'a> {
    fn cast(syntax: SyntaxNode<'a>) -> Option<Self>
    where
        Self: Sized;

    fn syntax(self) -> SyntaxNode<'a>;
}

macro_rules! ast_node {
    ($($(#[$attr:meta])* $name:ident => $kind:ident,)*) => {$(
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name<'a>(SyntaxNode<'a>);

        impl<'a> Node<'a> for $name<'a> {
            fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
                (syntax.kind() == $kind).then_some(Self(syntax))
            }

            fn syntax(self) -> SyntaxNode<'a> {
                self.0
            }
        }
    )*};
}

ast_node! {
    Chunk => CHUNK,
    Block => BLOCK,
    LocalStmt => LOCAL_STMT,
    LocalFunctionStmt => LOCAL_FUNCTION_STMT,
    FunctionStmt => FUNCTION_STMT,
    AssignStmt => ASSIGN_STMT,
    DoStmt => DO_STMT,
    WhileStmt => WHILE_STMT,
    RepeatStmt => REPEAT_STMT,
    IfStmt => IF_STMT,
    NumericForStmt => NUMERIC_FOR_STMT,
    GenericForStmt => GENERIC_FOR_STMT,
    ReturnStmt => RETURN_STMT,
    /// A name introduced by a declaration.
    Name => NAME,
    /// An unqualified name used in an expression.
    NameRef => NAME_REF,
    Attrib => ATTRIB,
    ExprList => EXPR_LIST,
    ParamList => PARAM_LIST,
    ArgList => ARG_LIST,
    FunctionName => FUNCTION_NAME,
    CallExpr => CALL_EXPR,
    MethodCallExpr => METHOD_CALL_EXPR,
    FieldExpr => FIELD_EXPR,
    IndexExpr => INDEX_EXPR,
    FunctionExpr => FUNCTION_EXPR,
    TableExpr => TABLE_EXPR,
    TableField => TABLE_FIELD,
}

fn child<'a, N: Node<'a>>(parent: SyntaxNode<'a>) -> Option<N> {
    parent.children().find_map(N::cast)
}

fn children<'a, N: Node<'a> + 'a>(parent: SyntaxNode<'a>) -> impl Iterator<Item = N> + 'a {
    parent.children().filter_map(N::cast)
}

/// The text of the first identifier token directly under `node`.
fn ident(node: SyntaxNode<'_>) -> Option<SyntaxToken<'_>> {
    node.child_token(IDENT)
}

impl<'a> Chunk<'a> {
    pub fn block(self) -> Option<Block<'a>> {
        child(self.0)
    }
}

impl<'a> Block<'a> {
    pub fn stmts(self) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        self.0.children()
    }
}

impl<'a> Name<'a> {
    pub fn ident(self) -> Option<SyntaxToken<'a>> {
        ident(self.0)
    }

    pub fn text(self) -> &'a str {
        self.ident().map_or("", SyntaxToken::text_trimmed)
    }
}

impl<'a> NameRef<'a> {
    pub fn ident(self) -> Option<SyntaxToken<'a>> {
        ident(self.0)
    }

    pub fn text(self) -> &'a str {
        self.ident().map_or("", SyntaxToken::text_trimmed)
    }
}

impl<'a> LocalStmt<'a> {
    pub fn names(self) -> impl Iterator<Item = Name<'a>> + 'a {
        children(self.0)
    }

    /// The attribute attached to each name, in declaration order.
    pub fn attribs(self) -> impl Iterator<Item = Attrib<'a>> + 'a {
        children(self.0)
    }

    /// The initialiser list, present only when the statement has an `=`.
    pub fn values(self) -> Option<ExprList<'a>> {
        self.0.child_token(EQ)?;
        child(self.0)
    }
}

impl<'a> Attrib<'a> {
    pub fn name(self) -> &'a str {
        ident(self.0).map_or("", SyntaxToken::text_trimmed)
    }
}

impl<'a> LocalFunctionStmt<'a> {
    pub fn name(self) -> Option<Name<'a>> {
        child(self.0)
    }

    pub fn param_list(self) -> Option<ParamList<'a>> {
        child(self.0)
    }

    pub fn body(self) -> Option<Block<'a>> {
        child(self.0)
    }
}

impl<'a> FunctionStmt<'a> {
    pub fn name(self) -> Option<FunctionName<'a>> {
        child(self.0)
    }

    pub fn param_list(self) -> Option<ParamList<'a>> {
        child(self.0)
    }

    pub fn body(self) -> Option<Block<'a>> {
        child(self.0)
    }
}

impl<'a> FunctionName<'a> {
    /// The leading variable, `a` in `function a.b:c()`.
    pub fn base(self) -> Option<NameRef<'a>> {
        child(self.0)
    }

    /// The `.field` components after the base.
    pub fn fields(self) -> impl Iterator<Item = SyntaxToken<'a>> + 'a {
        let method = self.method();
        self.0.child_tokens().filter(move |token| token.kind() == IDENT && Some(*token) != method)
    }

    /// The name after `:`, when the function is a method.
    pub fn method(self) -> Option<SyntaxToken<'a>> {
        let mut tokens = self.0.child_tokens().skip_while(|token| token.kind() != COLON);
        tokens.next()?;
        tokens.find(|token| token.kind() == IDENT)
    }

    /// `true` when assigning through this name writes to the base variable.
    pub fn is_plain(self) -> bool {
        self.0.child_tokens().next().is_none()
    }
}

impl<'a> FunctionExpr<'a> {
    pub fn param_list(self) -> Option<ParamList<'a>> {
        child(self.0)
    }

    pub fn body(self) -> Option<Block<'a>> {
        child(self.0)
    }
}

impl<'a> ParamList<'a> {
    pub fn params(self) -> impl Iterator<Item = Name<'a>> + 'a {
        children(self.0)
    }

    pub fn vararg(self) -> Option<SyntaxToken<'a>> {
        self.0.child_token(DOT3)
    }
}

impl<'a> AssignStmt<'a> {
    pub fn targets(self) -> Option<ExprList<'a>> {
        child(self.0)
    }

    pub fn values(self) -> Option<ExprList<'a>> {
        children(self.0).nth(1)
    }
}

impl<'a> ExprList<'a> {
    pub fn exprs(self) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        self.0.children()
    }
}

impl<'a> NumericForStmt<'a> {
    pub fn name(self) -> Option<Name<'a>> {
        child(self.0)
    }

    /// Start, limit and the optional step.
    pub fn bounds(self) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        self.0.children().filter(|node| !matches!(node.kind(), NAME | BLOCK))
    }

    pub fn body(self) -> Option<Block<'a>> {
        child(self.0)
    }
}

impl<'a> GenericForStmt<'a> {
    pub fn names(self) -> impl Iterator<Item = Name<'a>> + 'a {
        children(self.0)
    }

    pub fn iterators(self) -> Option<ExprList<'a>> {
        child(self.0)
    }

    pub fn body(self) -> Option<Block<'a>> {
        child(self.0)
    }
}

impl<'a> RepeatStmt<'a> {
    pub fn body(self) -> Option<Block<'a>> {
        child(self.0)
    }

    pub fn condition(self) -> Option<SyntaxNode<'a>> {
        self.0.children().find(|node| node.kind() != BLOCK)
    }
}

impl<'a> CallExpr<'a> {
    pub fn callee(self) -> Option<SyntaxNode<'a>> {
        self.0.children().next().filter(|node| node.kind() != ARG_LIST)
    }

    pub fn arg_list(self) -> Option<ArgList<'a>> {
        child(self.0)
    }
}

impl<'a> MethodCallExpr<'a> {
    pub fn receiver(self) -> Option<SyntaxNode<'a>> {
        self.0.children().next().filter(|node| node.kind() != ARG_LIST)
    }

    pub fn name(self) -> Option<SyntaxToken<'a>> {
        ident(self.0)
    }

    pub fn arg_list(self) -> Option<ArgList<'a>> {
        child(self.0)
    }
}

impl<'a> FieldExpr<'a> {
    pub fn base(self) -> Option<SyntaxNode<'a>> {
        self.0.children().next()
    }

    pub fn field(self) -> Option<SyntaxToken<'a>> {
        ident(self.0)
    }
}

impl<'a> TableField<'a> {
    /// The key of a `name = value` field.
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        self.0.child_token(EQ)?;
        ident(self.0)
    }
}

/// `true` for node kinds that are expressions.
pub fn is_expr(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        NAME_REF
            | LITERAL
            | VARARG_EXPR
            | PAREN_EXPR
            | PREFIX_EXPR
            | BINARY_EXPR
            | CALL_EXPR
            | METHOD_CALL_EXPR
            | FIELD_EXPR
            | INDEX_EXPR
            | FUNCTION_EXPR
            | TABLE_EXPR
    )
}
