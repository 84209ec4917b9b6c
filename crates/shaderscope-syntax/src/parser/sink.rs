//! Sink for converting parser events into the arena tree.
//!
//! Besides the grammar's own events the sink receives *inserts*: parsed
//! directive lines and runs of excluded code. They are not part of the
//! token stream the grammar saw, so the sink puts them back in source
//! order. Before opening a node or attaching a token it flushes every
//! insert that starts before the next code token into the node that is
//! currently open. What is left when the root closes goes in right before
//! EOF.

use std::collections::VecDeque;
use std::ops::Range;

use crate::parser::event::Event;
use crate::syntax_kind::SyntaxKind;
use crate::token::Token;
use crate::tree::{NodeData, NodeId, TreeBuilder};

/// Tree content the grammar did not see.
#[derive(Debug)]
pub(crate) enum Insert {
    /// A parsed directive line.
    Directive {
        first: usize,
        events: Vec<Event>,
        code: Vec<usize>,
    },
    /// Tokens of an inactive preprocessor branch.
    Excluded(Range<usize>),
}

impl Insert {
    /// Index of the insert's first token.
    pub fn first(&self) -> usize {
        match self {
            Insert::Directive { first, .. } => *first,
            Insert::Excluded(range) => range.start,
        }
    }
}

pub(crate) struct Sink<'t> {
    builder: TreeBuilder<'t>,
    tokens: &'t [Token],
    inserts: VecDeque<Insert>,
}

impl<'t> Sink<'t> {
    /// `inserts` must be sorted by first token.
    pub fn new(tokens: &'t [Token], inserts: Vec<Insert>) -> Self {
        Self {
            builder: TreeBuilder::new(tokens),
            tokens,
            inserts: inserts.into(),
        }
    }

    /// Replays the grammar's events over `code` and returns the arena.
    pub fn finish(
        mut self,
        events: Vec<Event>,
        code: &[usize],
        len: usize,
    ) -> (Vec<NodeData>, Vec<Option<NodeId>>) {
        self.replay(events, code, true);
        self.builder.finish(len)
    }

    fn replay(&mut self, mut events: Vec<Event>, code: &[usize], top: bool) {
        let mut cursor = 0;
        let mut forward_parents = Vec::new();

        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::Placeholder) {
                Event::Start {
                    kind,
                    forward_parent,
                } => {
                    forward_parents.push(kind);
                    let mut fp = forward_parent;
                    while let Some(parent_idx) = fp {
                        match std::mem::replace(&mut events[parent_idx], Event::Placeholder) {
                            Event::Start {
                                kind,
                                forward_parent,
                            } => {
                                fp = forward_parent;
                                forward_parents.push(kind);
                            }
                            _ => unreachable!(),
                        }
                    }

                    if top && self.builder.depth() > 0 {
                        self.flush_before(code.get(cursor).copied().unwrap_or(usize::MAX));
                    }
                    for kind in forward_parents.drain(..).rev() {
                        self.builder.start_node(kind);
                    }
                }
                Event::Token { kind } => {
                    if let Some(&index) = code.get(cursor) {
                        if top {
                            self.flush_before(index);
                        }
                        self.builder.token(index, kind);
                        cursor += 1;
                    }
                }
                Event::Missing { kind } => self.builder.missing(kind),
                Event::Finish => {
                    if top && self.builder.depth() == 1 {
                        // Closing the root: the rest of the code is EOF.
                        while let Some(&index) = code.get(cursor) {
                            self.flush_before(index);
                            self.builder.token(index, self.tokens[index].kind);
                            cursor += 1;
                        }
                        self.flush_before(usize::MAX);
                    }
                    self.builder.finish_node();
                }
                Event::Placeholder => {}
            }
        }

        // A directive grammar that stopped early still owns its tokens.
        if !top {
            for &index in &code[cursor.min(code.len())..] {
                self.builder.token(index, self.tokens[index].kind);
            }
        }
    }

    fn flush_before(&mut self, limit: usize) {
        while self.inserts.front().is_some_and(|insert| insert.first() < limit) {
            match self.inserts.pop_front() {
                Some(Insert::Directive { events, code, .. }) => self.replay(events, &code, false),
                Some(Insert::Excluded(range)) => self.excluded(range),
                None => break,
            }
        }
    }

    /// One `EXCLUDED_CODE` node; balanced braces inside it become nested
    /// `EXCLUDED_BLOCK`s.
    fn excluded(&mut self, range: Range<usize>) {
        self.builder.start_node(SyntaxKind::EXCLUDED_CODE);
        let mut open = 0usize;
        for index in range {
            let kind = self.tokens[index].kind;
            match kind {
                SyntaxKind::L_CURLY => {
                    self.builder.start_node(SyntaxKind::EXCLUDED_BLOCK);
                    self.builder.token(index, kind);
                    open += 1;
                }
                SyntaxKind::R_CURLY if open > 0 => {
                    self.builder.token(index, kind);
                    self.builder.finish_node();
                    open -= 1;
                }
                _ => self.builder.token(index, kind),
            }
        }
        for _ in 0..open {
            self.builder.finish_node();
        }
        self.builder.finish_node();
    }
}
