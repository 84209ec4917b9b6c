//! Statements inside function bodies.

use super::{declarations, expressions, recover, types};
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// `{ statement* }`
pub(super) fn compound_statement(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    while !p.at(SyntaxKind::R_CURLY) && !p.at_end() {
        let before = p.position();
        statement(p);
        if p.position() == before {
            p.err_and_bump("expected a statement");
        }
    }
    p.expect(SyntaxKind::R_CURLY);
    m.complete(p, SyntaxKind::COMPOUND_STATEMENT);
}

fn statement(p: &mut Parser<'_>) {
    if !p.enter() {
        p.err_nested("statement nested too deeply", true);
        return;
    }
    statement_inner(p);
    p.leave();
}

fn statement_inner(p: &mut Parser<'_>) {
    match p.current() {
        SyntaxKind::L_CURLY => compound_statement(p),
        // A closing brace belongs to the enclosing block.
        SyntaxKind::R_CURLY | SyntaxKind::EOF => p.error("expected a statement"),
        SyntaxKind::SEMICOLON => {
            let m = p.start();
            p.bump();
            m.complete(p, SyntaxKind::EMPTY_STATEMENT);
        }
        SyntaxKind::IF_KW => if_statement(p),
        SyntaxKind::SWITCH_KW => switch_statement(p),
        SyntaxKind::CASE_KW | SyntaxKind::DEFAULT_KW => case_label(p),
        SyntaxKind::WHILE_KW => while_statement(p),
        SyntaxKind::DO_KW => do_while_statement(p),
        SyntaxKind::FOR_KW => for_statement(p),
        SyntaxKind::BREAK_KW => jump(p, SyntaxKind::BREAK_STATEMENT),
        SyntaxKind::CONTINUE_KW => jump(p, SyntaxKind::CONTINUE_STATEMENT),
        SyntaxKind::DISCARD_KW => jump(p, SyntaxKind::DISCARD_STATEMENT),
        SyntaxKind::RETURN_KW => return_statement(p),
        SyntaxKind::PRECISION_KW => declarations::precision_declaration(p),
        _ if declarations::starts_declaration(p) => declarations::declaration(p),
        _ if expressions::at_expression_start(p) => expression_statement(p),
        _ => recover(p, "expected a statement"),
    }
}

fn expression_statement(p: &mut Parser<'_>) {
    let m = p.start();
    if expressions::expression(p).is_none() {
        p.error("expected an expression");
    }
    p.expect(SyntaxKind::SEMICOLON);
    m.complete(p, SyntaxKind::EXPRESSION_STATEMENT);
}

/// `( condition )`, the parentheses included in the caller's node.
fn parenthesized_condition(p: &mut Parser<'_>) {
    p.expect(SyntaxKind::L_PAREN);
    condition(p);
    p.expect(SyntaxKind::R_PAREN);
}

/// An expression, or a declaration with an initializer as in
/// `while (bool more = next())`.
fn condition(p: &mut Parser<'_>) {
    let m = p.start();
    if declarations::starts_declaration(p) {
        if p.current().is_qualifier_keyword() {
            types::type_qualifiers(p);
        }
        types::type_specifier(p);
        declarations::declarators(p);
    } else if expressions::expression(p).is_none() {
        p.error("expected a condition");
    }
    m.complete(p, SyntaxKind::CONDITION);
}

fn if_statement(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    parenthesized_condition(p);
    statement(p);
    if p.at(SyntaxKind::ELSE_KW) {
        let e = p.start();
        p.bump();
        statement(p);
        e.complete(p, SyntaxKind::ELSE_CLAUSE);
    }
    m.complete(p, SyntaxKind::IF_STATEMENT);
}

fn switch_statement(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    parenthesized_condition(p);
    if p.at(SyntaxKind::L_CURLY) {
        compound_statement(p);
    } else {
        p.expect(SyntaxKind::L_CURLY);
    }
    m.complete(p, SyntaxKind::SWITCH_STATEMENT);
}

/// `case expr:` or `default:`
fn case_label(p: &mut Parser<'_>) {
    let m = p.start();
    let is_case = p.at(SyntaxKind::CASE_KW);
    p.bump();
    if is_case && expressions::conditional(p).is_none() {
        p.error("expected a case value");
    }
    p.expect(SyntaxKind::COLON);
    m.complete(p, SyntaxKind::CASE_LABEL);
}

fn while_statement(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    parenthesized_condition(p);
    statement(p);
    m.complete(p, SyntaxKind::WHILE_STATEMENT);
}

fn do_while_statement(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    statement(p);
    if p.expect(SyntaxKind::WHILE_KW) {
        parenthesized_condition(p);
    }
    p.expect(SyntaxKind::SEMICOLON);
    m.complete(p, SyntaxKind::DO_WHILE_STATEMENT);
}

/// `for (init; condition; step) body`, every header part optional.
fn for_statement(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if p.expect(SyntaxKind::L_PAREN) {
        match p.current() {
            SyntaxKind::SEMICOLON => {
                let e = p.start();
                p.bump();
                e.complete(p, SyntaxKind::EMPTY_STATEMENT);
            }
            _ if declarations::starts_declaration(p) => declarations::declaration(p),
            _ => expression_statement(p),
        }
        if !p.at(SyntaxKind::SEMICOLON) {
            condition(p);
        }
        p.expect(SyntaxKind::SEMICOLON);
        if !p.at(SyntaxKind::R_PAREN) && expressions::expression(p).is_none() {
            p.error("expected an expression");
        }
        p.expect(SyntaxKind::R_PAREN);
    }
    statement(p);
    m.complete(p, SyntaxKind::FOR_STATEMENT);
}

/// `break;`, `continue;`, `discard;`
fn jump(p: &mut Parser<'_>, kind: SyntaxKind) {
    let m = p.start();
    p.bump();
    p.expect(SyntaxKind::SEMICOLON);
    m.complete(p, kind);
}

fn return_statement(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if !p.at(SyntaxKind::SEMICOLON) && expressions::expression(p).is_none() {
        p.error("expected an expression");
    }
    p.expect(SyntaxKind::SEMICOLON);
    m.complete(p, SyntaxKind::RETURN_STATEMENT);
}
