//! # Grammar Rules
//!
//! Each function takes a `&mut Parser` and uses its methods to inspect
//! tokens (`current`, `at`, `nth`), consume them (`bump`, `eat`, `expect`)
//! and build structure (`start` → marker → `complete`/`abandon`).
//!
//! ## Module Structure
//!
//! - [`declarations`] - external declarations, functions, interface blocks
//! - [`types`] - qualifiers, type specifiers, structs, array specifiers
//! - [`statements`] - everything that goes inside a function body
//! - [`expressions`] - Pratt parser for GLSL expressions
//! - [`directives`] - one preprocessor line at a time
//!
//! ## Error Recovery
//!
//! Grammar functions must always produce a tree. Missing tokens go through
//! `expect`, unexpected ones end up in `ERROR` nodes, and every loop that
//! consumes a variable number of items bails out if an iteration did not
//! consume anything.

mod declarations;
mod directives;
mod expressions;
mod statements;
mod types;

use crate::parser::{CompletedMarker, Parser};
use crate::syntax_kind::SyntaxKind;

pub(crate) use directives::directive;

/// Parse the live code of a document into a `SOURCE_FILE`.
pub(crate) fn root(p: &mut Parser<'_>) {
    let m = p.start();
    while !p.at_end() {
        let before = p.position();
        declarations::external_declaration(p);
        if p.position() == before {
            p.err_and_bump("expected a declaration");
        }
    }
    m.complete(p, SyntaxKind::SOURCE_FILE);
}

/// `NAME` around the current token.
fn name(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    m.complete(p, SyntaxKind::NAME);
}

/// `NAME_REF` around the current token.
fn name_ref(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.bump();
    m.complete(p, SyntaxKind::NAME_REF)
}

/// Kinds the recovery loops stop at, besides `;`.
const RECOVERY: &[SyntaxKind] = &[
    SyntaxKind::L_CURLY,
    SyntaxKind::R_CURLY,
    SyntaxKind::IF_KW,
    SyntaxKind::FOR_KW,
    SyntaxKind::WHILE_KW,
    SyntaxKind::DO_KW,
    SyntaxKind::SWITCH_KW,
    SyntaxKind::RETURN_KW,
    SyntaxKind::STRUCT_KW,
    SyntaxKind::PRECISION_KW,
];

/// Recovery set for statement-level errors: [`RECOVERY`] plus the
/// qualifiers and type keywords that start a declaration.
fn at_recovery_point(p: &Parser<'_>) -> bool {
    let kind = p.current();
    p.at_any(RECOVERY) || kind.is_qualifier_keyword() || kind.is_type_keyword()
}

/// Skips to `;` (consumed) or a recovery point, reporting `message` and
/// wrapping the skipped tokens in an `ERROR` node. Always consumes at
/// least one token unless at the end.
fn recover(p: &mut Parser<'_>, message: &str) {
    p.error(message);
    if p.at_end() {
        return;
    }
    let m = p.start();
    p.bump();
    while !p.at_end() && !p.at(SyntaxKind::SEMICOLON) && !at_recovery_point(p) {
        p.bump();
    }
    p.eat(SyntaxKind::SEMICOLON);
    m.complete(p, SyntaxKind::ERROR);
}

/// Index just past the `[...]` groups starting at lookahead `n`.
fn skip_brackets(p: &Parser<'_>, mut n: usize) -> usize {
    while p.nth(n) == SyntaxKind::L_BRACK {
        let mut depth = 0usize;
        loop {
            match p.nth(n) {
                SyntaxKind::L_BRACK => depth += 1,
                SyntaxKind::R_BRACK => depth -= 1,
                SyntaxKind::EOF | SyntaxKind::SEMICOLON | SyntaxKind::L_CURLY => return n,
                _ => {}
            }
            n += 1;
            if depth == 0 {
                break;
            }
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use crate::syntax_kind::SyntaxKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn recovery_stops_at_declaration_keywords() {
        let tree = parse("void main() { x y z uniform; float a; }");
        let body = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::COMPOUND_STATEMENT)
            .unwrap();
        let kinds: Vec<_> = body.children().map(|n| n.kind()).collect();
        assert!(kinds.contains(&SyntaxKind::VARIABLE_DECLARATION));
        assert_eq!(kinds.first(), Some(&SyntaxKind::L_CURLY));
        assert_eq!(kinds.last(), Some(&SyntaxKind::R_CURLY));
    }

    #[test]
    fn parse_terminates_on_junk() {
        for source in ["}}}", ")(", "int (((", "struct {", "for(;;", "a ? b", "= = ="] {
            let tree = parse(source);
            assert_eq!(tree.text(), source);
            assert!(!tree.errors().is_empty(), "{source:?} should report errors");
        }
    }
}
