//! # Syntax Tree
//!
//! The parser's output: an arena of nodes addressed by [`NodeId`], plus the
//! tokens, comments, diagnostics, preprocessor model and definition index
//! of one snapshot.
//!
//! ## Shape
//!
//! Every node has a [`SyntaxKind`], an ordered child list and a parent
//! index. Tokens are leaves; a leaf for a token the grammar expected but
//! did not find is a zero-width *missing* leaf. Every token of the lexer
//! output, EOF included, is a leaf of exactly one node, so the tree covers
//! the whole document.
//!
//! A node's span covers its children's spans. Trivia is not part of any
//! span; it stays attached to the tokens.
//!
//! ## Navigation
//!
//! [`SyntaxNode`] is a cheap `Copy` handle (tree reference + id) with the
//! usual traversal helpers. The typed wrappers in [`ast`] sit on top of it.
//!
//! ```
//! use shaderscope_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("float x = 1.0;");
//! let root = tree.root();
//! assert_eq!(root.kind(), SyntaxKind::SOURCE_FILE);
//! let decl = root.children().next().unwrap();
//! assert_eq!(decl.kind(), SyntaxKind::VARIABLE_DECLARATION);
//! ```

pub mod ast;

use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use crate::error::SyntaxError;
use crate::preprocessor::{DirectiveLine, IfPreprocessor, PreprocessorState};
use crate::semantics::Semantics;
use crate::settings::{Profile, Settings};
use crate::span::Span;
use crate::syntax_kind::SyntaxKind;
use crate::text::{Snapshot, TrackingMode};
use crate::token::Token;

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub kind: SyntaxKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub span: Span,
    /// Index into the tree's tokens, for leaves.
    pub token: Option<u32>,
    pub missing: bool,
}

/// Builds the arena from a stream of start/token/finish calls.
#[derive(Debug)]
pub(crate) struct TreeBuilder<'t> {
    tokens: &'t [Token],
    nodes: Vec<NodeData>,
    token_nodes: Vec<Option<NodeId>>,
    stack: Vec<NodeId>,
    last_end: usize,
}

impl<'t> TreeBuilder<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            nodes: Vec::new(),
            token_nodes: vec![None; tokens.len()],
            stack: Vec::new(),
            last_end: 0,
        }
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        if let Some(parent) = data.parent {
            self.nodes[parent.index()].children.push(id);
        }
        self.nodes.push(data);
        id
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        let id = self.push(NodeData {
            kind,
            parent: self.stack.last().copied(),
            children: Vec::new(),
            span: Span::empty(self.last_end),
            token: None,
            missing: false,
        });
        self.stack.push(id);
    }

    pub fn token(&mut self, index: usize, kind: SyntaxKind) {
        let Some(token) = self.tokens.get(index) else {
            return;
        };
        let span = token.span;
        let id = self.push(NodeData {
            kind,
            parent: self.stack.last().copied(),
            children: Vec::new(),
            span,
            token: Some(index as u32),
            missing: false,
        });
        self.token_nodes[index] = Some(id);
        self.last_end = span.end();
    }

    pub fn missing(&mut self, kind: SyntaxKind) {
        self.push(NodeData {
            kind,
            parent: self.stack.last().copied(),
            children: Vec::new(),
            span: Span::empty(self.last_end),
            token: None,
            missing: true,
        });
    }

    pub fn finish_node(&mut self) {
        let Some(id) = self.stack.pop() else {
            return;
        };
        let node = &self.nodes[id.index()];
        let first = node.children.first().map(|c| self.nodes[c.index()].span);
        let last = node.children.last().map(|c| self.nodes[c.index()].span);
        if let (Some(first), Some(last)) = (first, last) {
            self.nodes[id.index()].span = first.cover(last);
        }
    }

    /// Closes anything still open and returns the arena. The root spans
    /// the whole document.
    pub fn finish(mut self, len: usize) -> (Vec<NodeData>, Vec<Option<NodeId>>) {
        while !self.stack.is_empty() {
            self.finish_node();
        }
        if let Some(root) = self.nodes.first_mut() {
            root.span = Span::new(0, len.max(root.span.end()));
        }
        (self.nodes, self.token_nodes)
    }
}

/// Result of parsing one snapshot.
#[derive(Debug)]
pub struct SyntaxTree {
    snapshot: Arc<dyn Snapshot>,
    settings: Settings,
    tokens: Vec<Token>,
    nodes: Vec<NodeData>,
    token_nodes: Vec<Option<NodeId>>,
    comment_spans: Vec<Span>,
    errors: Vec<SyntaxError>,
    preprocessor: PreprocessorState,
    excluded_spans: Vec<Span>,
    pub(crate) semantics: Semantics,
}

/// Parts the parser hands over once the arena is built.
pub(crate) struct TreeParts {
    pub snapshot: Arc<dyn Snapshot>,
    pub settings: Settings,
    pub tokens: Vec<Token>,
    pub nodes: Vec<NodeData>,
    pub token_nodes: Vec<Option<NodeId>>,
    pub comment_spans: Vec<Span>,
    pub errors: Vec<SyntaxError>,
    pub preprocessor: PreprocessorState,
}

impl SyntaxTree {
    pub(crate) fn from_parts(parts: TreeParts) -> Self {
        let excluded_spans = parts
            .preprocessor
            .excluded
            .iter()
            .filter_map(|run| {
                let first = parts.tokens.get(run.start)?;
                let last = parts.tokens.get(run.end.checked_sub(1)?)?;
                Some(first.span.cover(last.span))
            })
            .collect();
        Self {
            snapshot: parts.snapshot,
            settings: parts.settings,
            tokens: parts.tokens,
            nodes: parts.nodes,
            token_nodes: parts.token_nodes,
            comment_spans: parts.comment_spans,
            errors: parts.errors,
            preprocessor: parts.preprocessor,
            excluded_spans,
            semantics: Semantics::default(),
        }
    }

    pub fn snapshot(&self) -> &Arc<dyn Snapshot> {
        &self.snapshot
    }

    pub fn version(&self) -> u64 {
        self.snapshot.version()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The profile in effect: the document's `#version` if it has one,
    /// otherwise the configured one.
    pub fn profile(&self) -> Profile {
        self.preprocessor.profile.unwrap_or(self.settings.profile)
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            tree: self,
            id: NodeId(0),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<SyntaxNode<'_>> {
        (id.index() < self.nodes.len()).then_some(SyntaxNode { tree: self, id })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The leaf holding token `index`.
    pub fn token_node(&self, index: usize) -> Option<SyntaxNode<'_>> {
        let id = self.token_nodes.get(index).copied().flatten()?;
        self.node(id)
    }

    pub fn comment_spans(&self) -> &[Span] {
        &self.comment_spans
    }

    /// Lexer and parser diagnostics, in source order.
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// `#if` chains in document order, with their current branch values.
    pub fn preprocessors(&self) -> &[IfPreprocessor] {
        &self.preprocessor.chains
    }

    pub fn directives(&self) -> &[DirectiveLine] {
        &self.preprocessor.lines
    }

    /// Spans of code in inactive preprocessor branches.
    pub fn excluded_spans(&self) -> &[Span] {
        &self.excluded_spans
    }

    pub fn is_excluded(&self, position: usize) -> bool {
        self.excluded_spans.iter().any(|s| s.contains(position))
    }

    /// The source text, rebuilt from tokens and trivia.
    pub fn text(&self) -> String {
        crate::lexer::reconstruct(&self.tokens, &self.snapshot.full_text())
    }

    /// Maps `position` in `snapshot` back to this tree's snapshot.
    pub fn map_position(&self, snapshot: &dyn Snapshot, position: usize) -> usize {
        if snapshot.version() == self.snapshot.version() {
            return position;
        }
        snapshot
            .create_tracking_point(position, TrackingMode::Negative)
            .position(self.snapshot.as_ref())
    }

    /// The innermost node covering `position`. `snapshot` may be newer
    /// than the tree; the position is tracked back first.
    pub fn node_at(&self, snapshot: &dyn Snapshot, position: usize) -> Option<SyntaxNode<'_>> {
        let position = self.map_position(snapshot, position);
        let mut node = self.root();
        if position > node.span().end() {
            return None;
        }
        'descend: loop {
            for child in node.children() {
                if child.span().contains(position) {
                    node = child;
                    continue 'descend;
                }
            }
            return Some(node);
        }
    }

    /// Index of the token whose span covers `position`.
    pub fn token_index_at(&self, position: usize) -> Option<usize> {
        let index = self.tokens.partition_point(|t| t.span.end() <= position);
        self.tokens
            .get(index)
            .filter(|t| t.span.contains(position))
            .map(|_| index)
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    /// Indented dump of the tree, one node or token per line.
    pub fn debug_tree(&self) -> String {
        self.root().debug_tree()
    }
}

/// A node handle.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl<'t> SyntaxNode<'t> {
    fn data(&self) -> &'t NodeData {
        self.tree.data(self.id)
    }

    fn handle(&self, id: NodeId) -> SyntaxNode<'t> {
        SyntaxNode {
            tree: self.tree,
            id,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    pub fn span(&self) -> Span {
        self.data().span
    }

    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.data().parent.map(|id| self.handle(id))
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = SyntaxNode<'t>> + use<'t> {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| SyntaxNode { tree, id })
    }

    pub fn first_child(&self) -> Option<SyntaxNode<'t>> {
        self.children().next()
    }

    pub fn child_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode<'t>> {
        self.children().find(|c| c.kind() == kind)
    }

    pub fn children_of_kind(
        &self,
        kind: SyntaxKind,
    ) -> impl Iterator<Item = SyntaxNode<'t>> + use<'t> {
        self.children().filter(move |c| c.kind() == kind)
    }

    /// This node, then its parent, up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode<'t>> + use<'t> {
        std::iter::successors(Some(*self), |n| n.parent())
    }

    /// This node and everything below it, in preorder.
    pub fn descendants(&self) -> impl Iterator<Item = SyntaxNode<'t>> + use<'t> {
        let mut stack = vec![*self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children().rev());
            Some(node)
        })
    }

    /// The token of a leaf, `None` for inner nodes and missing leaves.
    pub fn token(&self) -> Option<&'t Token> {
        let index = self.data().token?;
        self.tree.tokens.get(index as usize)
    }

    pub fn token_index(&self) -> Option<usize> {
        self.data().token.map(|i| i as usize)
    }

    pub fn is_token(&self) -> bool {
        self.data().token.is_some()
    }

    pub fn is_missing(&self) -> bool {
        self.data().missing
    }

    /// Tokens of this subtree in order; missing leaves are skipped.
    pub fn tokens(&self) -> impl Iterator<Item = &'t Token> + use<'t> {
        self.descendants().filter_map(|n| n.token())
    }

    pub fn first_token(&self) -> Option<&'t Token> {
        self.tokens().next()
    }

    /// Logical token text for leaves, source text for inner nodes.
    pub fn text(&self) -> Cow<'t, str> {
        match self.token() {
            Some(token) => Cow::Borrowed(token.text.as_str()),
            None => self.tree.snapshot.text(self.span()),
        }
    }

    /// Whether this node lies inside an `EXCLUDED_CODE` node.
    pub fn is_excluded(&self) -> bool {
        self.ancestors().any(|n| n.kind() == SyntaxKind::EXCLUDED_CODE)
    }

    pub fn debug_tree(&self) -> String {
        let mut out = String::new();
        for (node, depth) in self.walk_with_depth() {
            let indent = "  ".repeat(depth);
            let _ = match (node.token(), node.is_missing()) {
                (Some(token), _) => writeln!(out, "{indent}{:?}@{} {:?}", node.kind(), node.span(), token.text),
                (None, true) => writeln!(out, "{indent}{:?}@{} (missing)", node.kind(), node.span()),
                (None, false) => writeln!(out, "{indent}{:?}@{}", node.kind(), node.span()),
            };
        }
        out
    }

    fn walk_with_depth(&self) -> impl Iterator<Item = (SyntaxNode<'t>, usize)> + use<'t> {
        let mut stack = vec![(*self, 0)];
        std::iter::from_fn(move || {
            let (node, depth) = stack.pop()?;
            stack.extend(node.children().rev().map(|c| (c, depth + 1)));
            Some((node, depth))
        })
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str(&self.debug_tree())
        } else {
            write!(f, "{:?}@{}", self.kind(), self.span())
        }
    }
}
