//! # Definitions and scopes
//!
//! A pass over a freshly built tree that records every declared name as a
//! [`Definition`] and resolves every `NAME_REF` to one. The results live
//! on the [`SyntaxTree`]; nothing is recomputed per query.
//!
//! ## Scopes
//!
//! | Construct | Scope of its names |
//! |---|---|
//! | top level, `#define` | the document |
//! | function | parameter list through the end of the body |
//! | `{ ... }`, `for`, `while` | the statement |
//! | struct / interface block members | the member list |
//!
//! ## Resolution
//!
//! Innermost scope outward. Inside a block only declarations before the
//! reference count; at document level a later declaration is found too,
//! so a call to a function defined further down still resolves. Members
//! of anonymous interface blocks come next, then the built-in registry
//! filtered by stage and profile. Unresolved names have no definition.

mod builtins;
mod definition;
mod scope;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub use builtins::BuiltinRegistry;
pub use definition::{
    Availability, Definition, DefinitionDetail, DefinitionKind, ParameterInfo,
};
pub use scope::Scope;

use crate::span::Span;
use crate::syntax_kind::SyntaxKind;
use crate::text::{Snapshot, SpanTrackingMode};
use crate::tree::ast::{
    AstNode, Declarator, DefineDirective, FieldList, FunctionHeader, InterfaceBlock, Name,
    Parameter, StructSpecifier, TypeQualifiers, TypeSpecifier, VariableDeclaration,
};
use crate::tree::{NodeId, SyntaxNode, SyntaxTree};
use definition::documentation;

/// Where a reference resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved {
    Local(usize),
    Builtin(usize),
}

/// Definition index of one tree.
#[derive(Debug, Default)]
pub struct Semantics {
    definitions: Vec<Definition>,
    declared: HashMap<NodeId, usize>,
    resolved: HashMap<NodeId, Resolved>,
    builtins: Option<Arc<BuiltinRegistry>>,
}

impl Semantics {
    pub(crate) fn into_definitions(self) -> Vec<Definition> {
        self.definitions
    }
}

/// Builds the definition index of `tree`.
pub(crate) fn analyze(tree: &SyntaxTree) -> Semantics {
    let inactive = tree
        .directives()
        .iter()
        .filter(|line| !line.active)
        .map(|line| line.tokens.start)
        .collect();
    let mut collector = Collector {
        snapshot: tree.snapshot().as_ref(),
        inactive,
        frames: vec![Frame {
            scope: Scope::Document,
            parent: None,
            forward: true,
            names: HashMap::new(),
        }],
        definitions: Vec::new(),
        declared: HashMap::new(),
        references: Vec::new(),
        anonymous_fields: Vec::new(),
    };
    collector.walk(tree.root(), 0);

    let builtins = tree
        .settings()
        .resolve_builtins
        .then(BuiltinRegistry::global);
    let stages = tree.settings().shader_type;
    let profile = tree.profile();

    let mut resolved = HashMap::new();
    for reference in &collector.references {
        let local = collector.resolve(reference.name, reference.frame, reference.offset);
        let target = local.map(Resolved::Local).or_else(|| {
            builtins
                .as_ref()?
                .lookup(reference.name, stages, profile)
                .map(Resolved::Builtin)
        });
        if let Some(target) = target {
            resolved.insert(reference.node, target);
        }
    }

    log::debug!(
        "semantics: {} definitions, {}/{} references resolved",
        collector.definitions.len(),
        resolved.len(),
        collector.references.len()
    );

    Semantics {
        definitions: collector.definitions,
        declared: collector.declared,
        resolved,
        builtins,
    }
}

struct Frame {
    scope: Scope,
    parent: Option<usize>,
    /// Whether declarations after a reference may still satisfy it.
    forward: bool,
    names: HashMap<String, Vec<usize>>,
}

struct Reference<'t> {
    node: NodeId,
    name: &'t str,
    frame: usize,
    offset: usize,
}

struct Collector<'t> {
    snapshot: &'t dyn Snapshot,
    /// First token of every directive line in excluded code.
    inactive: HashSet<usize>,
    frames: Vec<Frame>,
    definitions: Vec<Definition>,
    declared: HashMap<NodeId, usize>,
    references: Vec<Reference<'t>>,
    anonymous_fields: Vec<usize>,
}

fn is_directive(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::DEFINE_DIRECTIVE
            | SyntaxKind::UNDEF_DIRECTIVE
            | SyntaxKind::CONDITIONAL_DIRECTIVE
            | SyntaxKind::VERSION_DIRECTIVE
            | SyntaxKind::EXTENSION_DIRECTIVE
            | SyntaxKind::PRAGMA_DIRECTIVE
            | SyntaxKind::ERROR_DIRECTIVE
            | SyntaxKind::LINE_DIRECTIVE
            | SyntaxKind::NULL_DIRECTIVE
            | SyntaxKind::INVALID_DIRECTIVE
    )
}

impl<'t> Collector<'t> {
    fn walk(&mut self, node: SyntaxNode<'t>, frame: usize) {
        match node.kind() {
            SyntaxKind::EXCLUDED_CODE => {}
            kind if is_directive(kind) => {
                let first = node.children().next().and_then(|c| c.token_index());
                if first.is_some_and(|index| self.inactive.contains(&index)) {
                    return;
                }
                if let Some(define) = DefineDirective::cast(node) {
                    self.define_macro(define);
                }
                self.walk_children(node, frame);
            }
            SyntaxKind::FUNCTION_DEFINITION | SyntaxKind::FUNCTION_PROTOTYPE => {
                if let Some(header) = FunctionHeader::cast(node) {
                    self.function(header, frame);
                }
            }
            SyntaxKind::VARIABLE_DECLARATION => {
                if let Some(declaration) = VariableDeclaration::cast(node) {
                    self.variable_declaration(declaration, frame);
                }
            }
            SyntaxKind::STRUCT_SPECIFIER => {
                if let Some(specifier) = StructSpecifier::cast(node) {
                    self.struct_specifier(specifier, frame);
                }
            }
            SyntaxKind::INTERFACE_BLOCK => {
                if let Some(block) = InterfaceBlock::cast(node) {
                    self.interface_block(block, frame);
                }
            }
            SyntaxKind::CONDITION => self.condition(node, frame),
            SyntaxKind::COMPOUND_STATEMENT
            | SyntaxKind::FOR_STATEMENT
            | SyntaxKind::WHILE_STATEMENT => {
                let inner = self.open(node, frame);
                self.walk_children(node, inner);
            }
            SyntaxKind::NAME_REF => {
                if let Some(token) = node.first_token() {
                    self.references.push(Reference {
                        node: node.id(),
                        name: token.text.as_str(),
                        frame,
                        offset: node.span().start(),
                    });
                }
            }
            _ => self.walk_children(node, frame),
        }
    }

    fn walk_children(&mut self, node: SyntaxNode<'t>, frame: usize) {
        for child in node.children() {
            self.walk(child, frame);
        }
    }

    /// Walks the qualifier and type children of a declaration-like node,
    /// where struct specifiers and type references live.
    fn walk_type_parts(&mut self, node: SyntaxNode<'t>, frame: usize) {
        for child in node.children() {
            if matches!(
                child.kind(),
                SyntaxKind::TYPE_QUALIFIERS | SyntaxKind::TYPE_SPECIFIER
            ) {
                self.walk(child, frame);
            }
        }
    }

    /// A block scope over `node` nested in `parent`.
    fn open(&mut self, node: SyntaxNode<'t>, parent: usize) -> usize {
        self.open_span(node.span(), parent)
    }

    fn open_span(&mut self, span: Span, parent: usize) -> usize {
        self.frames.push(Frame {
            scope: Scope::block(self.snapshot, span),
            parent: Some(parent),
            forward: false,
            names: HashMap::new(),
        });
        self.frames.len() - 1
    }

    fn define(
        &mut self,
        frame: usize,
        name: Name<'t>,
        kind: DefinitionKind,
        declaration: SyntaxNode<'t>,
        doc_node: SyntaxNode<'t>,
        detail: DefinitionDetail,
    ) -> Option<usize> {
        let text = name.text();
        if text.is_empty() {
            return None;
        }
        let span = name.syntax().span();
        let index = self.definitions.len();
        self.definitions.push(Definition {
            name: text.to_string(),
            kind,
            scope: self.frames[frame].scope.clone(),
            documentation: doc_node.first_token().and_then(documentation),
            span: Some(
                self.snapshot
                    .create_tracking_span(span, SpanTrackingMode::EdgeExclusive),
            ),
            name_node: Some(name.syntax().id()),
            declaration: Some(declaration.id()),
            detail,
            availability: None,
            offset: span.start(),
        });
        self.frames[frame]
            .names
            .entry(text.to_string())
            .or_default()
            .push(index);
        self.declared.insert(name.syntax().id(), index);
        Some(index)
    }

    fn define_macro(&mut self, define: DefineDirective<'t>) {
        let Some(name) = define.name() else {
            return;
        };
        let parameters = define
            .params()
            .map(|list| list.names().map(|n| n.text().to_string()).collect());
        let body = define
            .body()
            .map(|b| b.raw_text().trim().to_string())
            .unwrap_or_default();
        let node = define.syntax();
        self.define(
            0,
            name,
            DefinitionKind::Macro,
            node,
            node,
            DefinitionDetail::Macro { parameters, body },
        );
    }

    fn function(&mut self, header: FunctionHeader<'t>, frame: usize) {
        let node = header.syntax();
        self.walk_type_parts(node, frame);

        let parameters: Vec<ParameterInfo> = header
            .parameter_list()
            .map(|list| list.parameters().map(parameter_info).collect())
            .unwrap_or_default();
        if let Some(name) = header.name() {
            let detail = DefinitionDetail::Function {
                qualifiers: words(header.qualifiers()),
                return_type: type_name(header.return_type()),
                parameters,
                prototype: header.is_prototype(),
            };
            self.define(frame, name, DefinitionKind::Function, node, node, detail);
        }

        let Some(list) = header.parameter_list() else {
            return;
        };
        let span = Span::new(list.syntax().span().start(), node.span().end());
        let inner = self.open_span(span, frame);
        for parameter in list.parameters() {
            self.parameter(parameter, inner);
        }
        if let Some(body) = header.body() {
            // The body shares the parameters' scope.
            self.walk_children(body.syntax(), inner);
        }
    }

    fn parameter(&mut self, parameter: Parameter<'t>, frame: usize) {
        let node = parameter.syntax();
        self.walk_type_parts(node, frame);
        if let Some(name) = parameter.name() {
            let info = parameter_info(parameter);
            let detail = DefinitionDetail::Variable {
                qualifiers: info.qualifiers,
                type_name: info.type_name,
                array: info.array,
            };
            self.define(frame, name, DefinitionKind::Parameter, node, node, detail);
        }
        for child in node.children_of_kind(SyntaxKind::ARRAY_SPECIFIER) {
            self.walk(child, frame);
        }
    }

    fn variable_declaration(&mut self, declaration: VariableDeclaration<'t>, frame: usize) {
        let node = declaration.syntax();
        self.walk_type_parts(node, frame);
        let kind = if frame == 0 {
            DefinitionKind::GlobalVariable
        } else {
            DefinitionKind::LocalVariable
        };
        let qualifiers = words(declaration.qualifiers());
        let type_name = type_name(declaration.type_specifier());
        for declarator in declaration.declarators() {
            self.declarator(declarator, frame, kind, &qualifiers, &type_name, node);
        }
    }

    fn declarator(
        &mut self,
        declarator: Declarator<'t>,
        frame: usize,
        kind: DefinitionKind,
        qualifiers: &[String],
        type_name: &str,
        doc_node: SyntaxNode<'t>,
    ) -> Option<usize> {
        let index = declarator.name().and_then(|name| {
            let detail = DefinitionDetail::Variable {
                qualifiers: qualifiers.to_vec(),
                type_name: type_name.to_string(),
                array: declarator.array_specifier().map(|a| a.display()),
            };
            self.define(frame, name, kind, declarator.syntax(), doc_node, detail)
        });
        self.walk_children(declarator.syntax(), frame);
        index
    }

    /// `while (bool more = next())` declares `more` in the loop.
    fn condition(&mut self, node: SyntaxNode<'t>, frame: usize) {
        let Some(specifier) = node.child_of_kind(SyntaxKind::TYPE_SPECIFIER) else {
            self.walk_children(node, frame);
            return;
        };
        self.walk_type_parts(node, frame);
        let qualifiers = words(node.children().find_map(TypeQualifiers::cast));
        let type_name = type_name(TypeSpecifier::cast(specifier));
        for declarator in node.children().filter_map(Declarator::cast) {
            self.declarator(
                declarator,
                frame,
                DefinitionKind::LocalVariable,
                &qualifiers,
                &type_name,
                node,
            );
        }
    }

    fn struct_specifier(&mut self, specifier: StructSpecifier<'t>, frame: usize) {
        let node = specifier.syntax();
        let fields = specifier.fields().map(field_names).unwrap_or_default();
        if let Some(name) = specifier.name() {
            let doc_node = node
                .ancestors()
                .find(|n| {
                    matches!(
                        n.kind(),
                        SyntaxKind::VARIABLE_DECLARATION
                            | SyntaxKind::STRUCT_DECLARATION
                            | SyntaxKind::FIELD_DECLARATION
                            | SyntaxKind::PARAMETER
                    )
                })
                .unwrap_or(node);
            let detail = DefinitionDetail::TypeName { fields };
            self.define(frame, name, DefinitionKind::TypeName, node, doc_node, detail);
        }
        if let Some(list) = specifier.fields() {
            self.fields(list, frame);
        }
    }

    fn interface_block(&mut self, block: InterfaceBlock<'t>, frame: usize) {
        let node = block.syntax();
        self.walk_type_parts(node, frame);
        let qualifiers = words(block.qualifiers());
        let instance = block.instance();
        let block_name = block.name().map(|n| n.text().to_string()).unwrap_or_default();
        if let Some(name) = block.name() {
            let detail = DefinitionDetail::InterfaceBlock {
                qualifiers: qualifiers.clone(),
                fields: block.fields().map(field_names).unwrap_or_default(),
                instance: instance
                    .and_then(|d| d.name())
                    .map(|n| n.text().to_string()),
            };
            self.define(frame, name, DefinitionKind::InterfaceBlock, node, node, detail);
        }
        let fields = block
            .fields()
            .map(|list| self.fields(list, frame))
            .unwrap_or_default();
        match instance {
            Some(declarator) => {
                self.declarator(
                    declarator,
                    frame,
                    DefinitionKind::GlobalVariable,
                    &qualifiers,
                    &block_name,
                    node,
                );
            }
            None => self.anonymous_fields.extend(fields),
        }
    }

    /// Declares the members of a struct or block in their own scope.
    fn fields(&mut self, list: FieldList<'t>, frame: usize) -> Vec<usize> {
        let inner = self.open(list.syntax(), frame);
        let mut indices = Vec::new();
        for field in list.declarations() {
            let node = field.syntax();
            self.walk_type_parts(node, inner);
            let qualifiers = words(field.qualifiers());
            let type_name = type_name(field.type_specifier());
            for declarator in field.declarators() {
                indices.extend(self.declarator(
                    declarator,
                    inner,
                    DefinitionKind::Field,
                    &qualifiers,
                    &type_name,
                    node,
                ));
            }
        }
        indices
    }

    fn resolve(&self, name: &str, frame: usize, offset: usize) -> Option<usize> {
        let mut current = Some(frame);
        while let Some(index) = current {
            let frame = &self.frames[index];
            if let Some(candidates) = frame.names.get(name) {
                let before = candidates
                    .iter()
                    .rev()
                    .find(|&&c| self.definitions[c].offset < offset);
                let found = match before {
                    Some(&c) => Some(c),
                    None if frame.forward => candidates.first().copied(),
                    None => None,
                };
                if found.is_some() {
                    return found;
                }
            }
            current = frame.parent;
        }
        self.anonymous_fields
            .iter()
            .copied()
            .find(|&c| self.definitions[c].name == name)
    }
}

fn words(qualifiers: Option<TypeQualifiers<'_>>) -> Vec<String> {
    qualifiers.map(|q| q.words()).unwrap_or_default()
}

fn type_name(specifier: Option<TypeSpecifier<'_>>) -> String {
    specifier.map(|t| t.display()).unwrap_or_default()
}

fn parameter_info(parameter: Parameter<'_>) -> ParameterInfo {
    ParameterInfo {
        qualifiers: words(parameter.qualifiers()),
        type_name: type_name(parameter.type_specifier()),
        name: parameter.name().map(|n| n.text().to_string()),
        array: parameter.array_specifier().map(|a| a.display()),
    }
}

fn field_names(list: FieldList<'_>) -> Vec<String> {
    list.declarations()
        .flat_map(|field| field.declarators())
        .filter_map(|d| d.name())
        .map(|n| n.text().to_string())
        .collect()
}

impl SyntaxTree {
    /// Every definition of the document, in source order of declaration.
    pub fn definitions(&self) -> &[Definition] {
        &self.semantics.definitions
    }

    /// The definition an identifier refers to or declares. Accepts a
    /// `NAME_REF`, a `NAME`, or the identifier leaf inside either.
    pub fn find_definition(&self, node: SyntaxNode<'_>) -> Option<&Definition> {
        if !std::ptr::eq(node.tree(), self) {
            return None;
        }
        let node = match node.kind() {
            SyntaxKind::NAME | SyntaxKind::NAME_REF => node,
            _ => node
                .parent()
                .filter(|p| matches!(p.kind(), SyntaxKind::NAME | SyntaxKind::NAME_REF))?,
        };
        if let Some(&index) = self.semantics.declared.get(&node.id()) {
            return self.semantics.definitions.get(index);
        }
        match *self.semantics.resolved.get(&node.id())? {
            Resolved::Local(index) => self.semantics.definitions.get(index),
            Resolved::Builtin(index) => self.semantics.builtins.as_ref()?.get(index),
        }
    }

    /// Go-to-definition for the identifier under `position`.
    pub fn definition_at(&self, snapshot: &dyn Snapshot, position: usize) -> Option<&Definition> {
        self.find_definition(self.node_at(snapshot, position)?)
    }

    /// Definitions visible at `position`: their scope contains it and,
    /// below document level, they are declared before it. Built-ins are
    /// listed by [`SyntaxTree::builtins_visible`].
    pub fn definitions_at(&self, snapshot: &dyn Snapshot, position: usize) -> Vec<&Definition> {
        self.semantics
            .definitions
            .iter()
            .filter(|d| d.scope.contains(snapshot, position))
            .filter(|d| {
                matches!(d.scope, Scope::Document)
                    || d.span(snapshot).is_some_and(|s| s.start() < position)
            })
            .collect()
    }

    /// Every reference that resolved to `definition`, in source order.
    pub fn references(&self, definition: &Definition) -> Vec<SyntaxNode<'_>> {
        let mut nodes: Vec<SyntaxNode<'_>> = self
            .semantics
            .resolved
            .iter()
            .filter(|(_, target)| {
                let candidate = match **target {
                    Resolved::Local(index) => self.semantics.definitions.get(index),
                    Resolved::Builtin(index) => self
                        .semantics
                        .builtins
                        .as_ref()
                        .and_then(|registry| registry.get(index)),
                };
                candidate.is_some_and(|c| std::ptr::eq(c, definition))
            })
            .filter_map(|(&id, _)| self.node(id))
            .collect();
        nodes.sort_by_key(|n| n.span().start());
        nodes
    }

    /// Built-ins available to this document's stages and profile.
    pub fn builtins_visible(&self) -> Vec<&Definition> {
        let Some(registry) = self.semantics.builtins.as_ref() else {
            return Vec::new();
        };
        let stages = self.settings().shader_type;
        let profile = self.profile();
        registry.visible(stages, profile).collect()
    }
}
