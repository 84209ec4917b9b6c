//! Expressions, parsed with precedence climbing.
//!
//! From loosest to tightest: sequence (`,`), assignment (right
//! associative), conditional (`?:`), the binary operators in the table
//! below, prefix operators, postfix operators (call, index, field, `++`,
//! `--`) and primaries.

use super::{name_ref, types};
use crate::parser::{CompletedMarker, Parser};
use crate::syntax_kind::SyntaxKind;

/// Binding power of a binary operator. Higher binds tighter.
fn infix_binding_power(kind: SyntaxKind) -> Option<u8> {
    use SyntaxKind::*;
    let bp = match kind {
        PIPE_PIPE => 1,
        CARET_CARET => 2,
        AMP_AMP => 3,
        PIPE => 4,
        CARET => 5,
        AMP => 6,
        EQ_EQ | NOT_EQ => 7,
        LT | GT | LT_EQ | GT_EQ => 8,
        SHL | SHR => 9,
        PLUS | MINUS => 10,
        STAR | SLASH | PERCENT => 11,
        _ => return None,
    };
    Some(bp)
}

fn is_prefix_operator(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::BANG
            | SyntaxKind::TILDE
            | SyntaxKind::MINUS
            | SyntaxKind::PLUS
            | SyntaxKind::INC
            | SyntaxKind::DEC
    )
}

pub(super) fn at_expression_start(p: &Parser<'_>) -> bool {
    let kind = p.current();
    kind == SyntaxKind::IDENT
        || kind == SyntaxKind::L_PAREN
        || kind.is_literal()
        || kind.is_type_keyword()
        || is_prefix_operator(kind)
}

/// Full expression, comma sequences included.
pub(super) fn expression(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let first = assignment(p)?;
    if !p.at(SyntaxKind::COMMA) {
        return Some(first);
    }
    let m = first.precede(p);
    while p.eat(SyntaxKind::COMMA) {
        if assignment(p).is_none() {
            p.error("expected an expression");
            break;
        }
    }
    Some(m.complete(p, SyntaxKind::SEQUENCE_EXPR))
}

pub(super) fn assignment(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    if !p.enter() {
        return Some(p.err_nested("expression nested too deeply", false));
    }
    let completed = assignment_inner(p);
    p.leave();
    completed
}

fn assignment_inner(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let lhs = conditional(p)?;
    if !p.current().is_assignment_operator() {
        return Some(lhs);
    }
    let m = lhs.precede(p);
    p.bump();
    if assignment(p).is_none() {
        p.error("expected an expression");
    }
    Some(m.complete(p, SyntaxKind::ASSIGNMENT_EXPR))
}

pub(super) fn conditional(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let condition = binary(p, 0)?;
    if !p.at(SyntaxKind::QUESTION) {
        return Some(condition);
    }
    let m = condition.precede(p);
    p.bump();
    if expression(p).is_none() {
        p.error("expected an expression");
    }
    p.expect(SyntaxKind::COLON);
    if assignment(p).is_none() {
        p.error("expected an expression");
    }
    Some(m.complete(p, SyntaxKind::CONDITIONAL_EXPR))
}

fn binary(p: &mut Parser<'_>, min_bp: u8) -> Option<CompletedMarker> {
    let mut lhs = prefix(p)?;
    while let Some(bp) = infix_binding_power(p.current()) {
        if bp < min_bp {
            break;
        }
        let m = lhs.precede(p);
        p.bump();
        if binary(p, bp + 1).is_none() {
            p.error("expected an expression");
        }
        lhs = m.complete(p, SyntaxKind::BINARY_EXPR);
    }
    Some(lhs)
}

fn prefix(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    if !is_prefix_operator(p.current()) {
        return postfix(p);
    }
    if !p.enter() {
        return Some(p.err_nested("expression nested too deeply", false));
    }
    let m = p.start();
    p.bump();
    if prefix(p).is_none() {
        p.error("expected an expression");
    }
    p.leave();
    Some(m.complete(p, SyntaxKind::PREFIX_EXPR))
}

fn postfix(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let mut lhs = primary(p)?;
    loop {
        lhs = match p.current() {
            SyntaxKind::L_BRACK => {
                let m = lhs.precede(p);
                p.bump();
                if expression(p).is_none() {
                    p.error("expected an index");
                }
                p.expect(SyntaxKind::R_BRACK);
                m.complete(p, SyntaxKind::INDEX_EXPR)
            }
            SyntaxKind::L_PAREN => {
                let m = lhs.precede(p);
                arg_list(p);
                m.complete(p, SyntaxKind::CALL_EXPR)
            }
            SyntaxKind::DOT => {
                let m = lhs.precede(p);
                p.bump();
                p.expect(SyntaxKind::IDENT);
                m.complete(p, SyntaxKind::FIELD_EXPR)
            }
            SyntaxKind::INC | SyntaxKind::DEC => {
                let m = lhs.precede(p);
                p.bump();
                m.complete(p, SyntaxKind::POSTFIX_EXPR)
            }
            _ => break,
        };
    }
    Some(lhs)
}

fn primary(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let kind = p.current();
    let completed = match kind {
        SyntaxKind::IDENT => name_ref(p),
        SyntaxKind::L_PAREN => {
            let m = p.start();
            p.bump();
            if expression(p).is_none() {
                p.error("expected an expression");
            }
            p.expect(SyntaxKind::R_PAREN);
            m.complete(p, SyntaxKind::PAREN_EXPR)
        }
        SyntaxKind::L_CURLY => initializer_list(p),
        _ if kind.is_literal() => {
            let m = p.start();
            p.bump();
            m.complete(p, SyntaxKind::LITERAL)
        }
        _ if kind.is_type_keyword() => {
            let m = p.start();
            types::type_specifier(p);
            if p.at(SyntaxKind::L_PAREN) {
                arg_list(p);
            } else {
                p.expect(SyntaxKind::L_PAREN);
            }
            m.complete(p, SyntaxKind::CALL_EXPR)
        }
        _ => return None,
    };
    Some(completed)
}

fn arg_list(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if p.at(SyntaxKind::VOID_KW) && p.nth(1) == SyntaxKind::R_PAREN {
        p.bump();
    }
    if !p.at(SyntaxKind::R_PAREN) {
        loop {
            if assignment(p).is_none() {
                p.error("expected an argument");
                break;
            }
            if !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    m.complete(p, SyntaxKind::ARG_LIST);
}

/// `{ a, { b, c }, }`
pub(super) fn initializer_list(p: &mut Parser<'_>) -> CompletedMarker {
    if !p.enter() {
        return p.err_nested("initializer nested too deeply", false);
    }
    let m = p.start();
    p.bump();
    while !p.at(SyntaxKind::R_CURLY) && !p.at_end() {
        let ok = if p.at(SyntaxKind::L_CURLY) {
            initializer_list(p);
            true
        } else {
            assignment(p).is_some()
        };
        if !ok {
            p.error("expected an initializer");
            break;
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_CURLY);
    p.leave();
    m.complete(p, SyntaxKind::INITIALIZER_LIST)
}
