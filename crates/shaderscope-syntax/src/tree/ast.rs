//! Typed views over [`SyntaxNode`].
//!
//! Each wrapper checks the node kind once in `cast` and then offers
//! accessors that return `Option` for anything the parser may have left
//! out of broken code.

use crate::syntax_kind::SyntaxKind;
use crate::tree::SyntaxNode;

/// A wrapper around a node of one (or a few) kinds.
pub trait AstNode<'t>: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;

    fn cast(node: SyntaxNode<'t>) -> Option<Self>;

    fn syntax(&self) -> SyntaxNode<'t>;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq)]
        pub struct $name<'t>(SyntaxNode<'t>);

        impl<'t> AstNode<'t> for $name<'t> {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode<'t>) -> Option<Self> {
                Self::can_cast(node.kind()).then_some(Self(node))
            }

            fn syntax(&self) -> SyntaxNode<'t> {
                self.0
            }
        }
    };
}

fn child<'t, N: AstNode<'t>>(node: SyntaxNode<'t>) -> Option<N> {
    node.children().find_map(N::cast)
}

fn children<'t, N: AstNode<'t> + 't>(node: SyntaxNode<'t>) -> impl Iterator<Item = N> + 't {
    node.children().filter_map(N::cast)
}

ast_node!(SourceFile, SOURCE_FILE);
ast_node!(
    /// The identifier of a declaration.
    Name,
    NAME
);
ast_node!(
    /// An identifier used as a reference.
    NameRef,
    NAME_REF
);
ast_node!(FunctionDefinition, FUNCTION_DEFINITION);
ast_node!(FunctionPrototype, FUNCTION_PROTOTYPE);
ast_node!(ParameterList, PARAMETER_LIST);
ast_node!(Parameter, PARAMETER);
ast_node!(VariableDeclaration, VARIABLE_DECLARATION);
ast_node!(Declarator, DECLARATOR);
ast_node!(InterfaceBlock, INTERFACE_BLOCK);
ast_node!(StructSpecifier, STRUCT_SPECIFIER);
ast_node!(FieldList, FIELD_LIST);
ast_node!(FieldDeclaration, FIELD_DECLARATION);
ast_node!(TypeQualifiers, TYPE_QUALIFIERS);
ast_node!(TypeSpecifier, TYPE_SPECIFIER);
ast_node!(ArraySpecifier, ARRAY_SPECIFIER);
ast_node!(CompoundStatement, COMPOUND_STATEMENT);
ast_node!(DefineDirective, DEFINE_DIRECTIVE);
ast_node!(MacroParamList, MACRO_PARAM_LIST);
ast_node!(MacroBody, MACRO_BODY);

impl<'t> SourceFile<'t> {
    pub fn declarations(&self) -> impl Iterator<Item = Declaration<'t>> + use<'t> {
        children(self.0)
    }
}

impl<'t> Name<'t> {
    /// The identifier, with line continuations spliced out.
    pub fn text(&self) -> &'t str {
        self.0.first_token().map_or("", |t| t.text.as_str())
    }
}

impl<'t> NameRef<'t> {
    pub fn text(&self) -> &'t str {
        self.0.first_token().map_or("", |t| t.text.as_str())
    }
}

/// Any top-level declaration.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Declaration<'t> {
    Function(FunctionDefinition<'t>),
    Prototype(FunctionPrototype<'t>),
    Variable(VariableDeclaration<'t>),
    Interface(InterfaceBlock<'t>),
    /// `struct S { ... };` with no declarators.
    Struct(SyntaxNode<'t>),
    Precision(SyntaxNode<'t>),
    Qualifier(SyntaxNode<'t>),
}

impl<'t> AstNode<'t> for Declaration<'t> {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::FUNCTION_DEFINITION
                | SyntaxKind::FUNCTION_PROTOTYPE
                | SyntaxKind::VARIABLE_DECLARATION
                | SyntaxKind::INTERFACE_BLOCK
                | SyntaxKind::STRUCT_DECLARATION
                | SyntaxKind::PRECISION_DECLARATION
                | SyntaxKind::QUALIFIER_DECLARATION
        )
    }

    fn cast(node: SyntaxNode<'t>) -> Option<Self> {
        let declaration = match node.kind() {
            SyntaxKind::FUNCTION_DEFINITION => Declaration::Function(FunctionDefinition(node)),
            SyntaxKind::FUNCTION_PROTOTYPE => Declaration::Prototype(FunctionPrototype(node)),
            SyntaxKind::VARIABLE_DECLARATION => Declaration::Variable(VariableDeclaration(node)),
            SyntaxKind::INTERFACE_BLOCK => Declaration::Interface(InterfaceBlock(node)),
            SyntaxKind::STRUCT_DECLARATION => Declaration::Struct(node),
            SyntaxKind::PRECISION_DECLARATION => Declaration::Precision(node),
            SyntaxKind::QUALIFIER_DECLARATION => Declaration::Qualifier(node),
            _ => return None,
        };
        Some(declaration)
    }

    fn syntax(&self) -> SyntaxNode<'t> {
        match self {
            Declaration::Function(f) => f.syntax(),
            Declaration::Prototype(f) => f.syntax(),
            Declaration::Variable(v) => v.syntax(),
            Declaration::Interface(i) => i.syntax(),
            Declaration::Struct(n) | Declaration::Precision(n) | Declaration::Qualifier(n) => *n,
        }
    }
}

/// What definitions and prototypes have in common.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FunctionHeader<'t>(SyntaxNode<'t>);

impl<'t> AstNode<'t> for FunctionHeader<'t> {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::FUNCTION_DEFINITION | SyntaxKind::FUNCTION_PROTOTYPE
        )
    }

    fn cast(node: SyntaxNode<'t>) -> Option<Self> {
        Self::can_cast(node.kind()).then_some(Self(node))
    }

    fn syntax(&self) -> SyntaxNode<'t> {
        self.0
    }
}

impl<'t> FunctionHeader<'t> {
    pub fn qualifiers(&self) -> Option<TypeQualifiers<'t>> {
        child(self.0)
    }

    pub fn return_type(&self) -> Option<TypeSpecifier<'t>> {
        child(self.0)
    }

    pub fn name(&self) -> Option<Name<'t>> {
        child(self.0)
    }

    pub fn parameter_list(&self) -> Option<ParameterList<'t>> {
        child(self.0)
    }

    /// `None` for prototypes.
    pub fn body(&self) -> Option<CompoundStatement<'t>> {
        child(self.0)
    }

    pub fn is_prototype(&self) -> bool {
        self.0.kind() == SyntaxKind::FUNCTION_PROTOTYPE
    }
}

impl<'t> FunctionDefinition<'t> {
    pub fn header(&self) -> FunctionHeader<'t> {
        FunctionHeader(self.0)
    }
}

impl<'t> FunctionPrototype<'t> {
    pub fn header(&self) -> FunctionHeader<'t> {
        FunctionHeader(self.0)
    }
}

impl<'t> ParameterList<'t> {
    pub fn parameters(&self) -> impl Iterator<Item = Parameter<'t>> + use<'t> {
        children(self.0)
    }
}

impl<'t> Parameter<'t> {
    pub fn qualifiers(&self) -> Option<TypeQualifiers<'t>> {
        child(self.0)
    }

    pub fn type_specifier(&self) -> Option<TypeSpecifier<'t>> {
        child(self.0)
    }

    /// Unnamed in prototypes like `float f(float);`.
    pub fn name(&self) -> Option<Name<'t>> {
        child(self.0)
    }

    pub fn array_specifier(&self) -> Option<ArraySpecifier<'t>> {
        child(self.0)
    }
}

impl<'t> VariableDeclaration<'t> {
    pub fn qualifiers(&self) -> Option<TypeQualifiers<'t>> {
        child(self.0)
    }

    pub fn type_specifier(&self) -> Option<TypeSpecifier<'t>> {
        child(self.0)
    }

    pub fn declarators(&self) -> impl Iterator<Item = Declarator<'t>> + use<'t> {
        children(self.0)
    }
}

impl<'t> Declarator<'t> {
    pub fn name(&self) -> Option<Name<'t>> {
        child(self.0)
    }

    pub fn array_specifier(&self) -> Option<ArraySpecifier<'t>> {
        child(self.0)
    }

    /// The node after `=`.
    pub fn initializer(&self) -> Option<SyntaxNode<'t>> {
        self.0
            .children()
            .skip_while(|c| c.kind() != SyntaxKind::EQ)
            .nth(1)
    }
}

impl<'t> InterfaceBlock<'t> {
    pub fn qualifiers(&self) -> Option<TypeQualifiers<'t>> {
        child(self.0)
    }

    /// The block name, `Camera` in `uniform Camera { ... } cam;`.
    pub fn name(&self) -> Option<Name<'t>> {
        child(self.0)
    }

    pub fn fields(&self) -> Option<FieldList<'t>> {
        child(self.0)
    }

    /// The instance declarator, absent for anonymous blocks whose members
    /// are visible at global scope.
    pub fn instance(&self) -> Option<Declarator<'t>> {
        child(self.0)
    }
}

impl<'t> StructSpecifier<'t> {
    pub fn name(&self) -> Option<Name<'t>> {
        child(self.0)
    }

    pub fn fields(&self) -> Option<FieldList<'t>> {
        child(self.0)
    }
}

impl<'t> FieldList<'t> {
    pub fn declarations(&self) -> impl Iterator<Item = FieldDeclaration<'t>> + use<'t> {
        children(self.0)
    }
}

impl<'t> FieldDeclaration<'t> {
    pub fn qualifiers(&self) -> Option<TypeQualifiers<'t>> {
        child(self.0)
    }

    pub fn type_specifier(&self) -> Option<TypeSpecifier<'t>> {
        child(self.0)
    }

    pub fn declarators(&self) -> impl Iterator<Item = Declarator<'t>> + use<'t> {
        children(self.0)
    }
}

impl<'t> TypeQualifiers<'t> {
    /// Each qualifier as written, `layout(...)` as one entry.
    pub fn words(&self) -> Vec<String> {
        self.0
            .children()
            .map(|c| match c.token() {
                Some(token) => token.text.clone(),
                None => collapse_whitespace(&c.text()),
            })
            .collect()
    }
}

impl<'t> TypeSpecifier<'t> {
    /// The inline struct of `struct S { ... } s;`.
    pub fn struct_specifier(&self) -> Option<StructSpecifier<'t>> {
        child(self.0)
    }

    /// The user type name, `Light` in `Light sun;`.
    pub fn name_ref(&self) -> Option<NameRef<'t>> {
        child(self.0)
    }

    pub fn array_specifier(&self) -> Option<ArraySpecifier<'t>> {
        child(self.0)
    }

    /// The type as it would be written in a signature: `vec4`, `Light`,
    /// `float[2]`, `struct S`.
    pub fn display(&self) -> String {
        let mut out = String::new();
        for c in self.0.children() {
            match c.kind() {
                SyntaxKind::STRUCT_SPECIFIER => {
                    out.push_str("struct");
                    if let Some(name) = StructSpecifier(c).name() {
                        out.push(' ');
                        out.push_str(name.text());
                    }
                }
                SyntaxKind::ARRAY_SPECIFIER => out.push_str(&ArraySpecifier(c).display()),
                _ => {
                    if let Some(token) = c.first_token() {
                        out.push_str(&token.text);
                    }
                }
            }
        }
        out
    }
}

impl<'t> ArraySpecifier<'t> {
    /// `[2][N]`, trivia dropped.
    pub fn display(&self) -> String {
        self.0.tokens().map(|t| t.text.as_str()).collect()
    }
}

impl<'t> CompoundStatement<'t> {
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode<'t>> + use<'t> {
        self.0
            .children()
            .filter(|c| !matches!(c.kind(), SyntaxKind::L_CURLY | SyntaxKind::R_CURLY))
    }
}

impl<'t> DefineDirective<'t> {
    pub fn name(&self) -> Option<Name<'t>> {
        child(self.0)
    }

    /// `None` for object-like macros.
    pub fn params(&self) -> Option<MacroParamList<'t>> {
        child(self.0)
    }

    pub fn body(&self) -> Option<MacroBody<'t>> {
        child(self.0)
    }
}

impl<'t> MacroParamList<'t> {
    pub fn names(&self) -> impl Iterator<Item = Name<'t>> + use<'t> {
        children(self.0)
    }
}

impl<'t> MacroBody<'t> {
    /// The replacement text exactly as written, comments included.
    pub fn raw_text(&self) -> String {
        self.0.text().into_owned()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
