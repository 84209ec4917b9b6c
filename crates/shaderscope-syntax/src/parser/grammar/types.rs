//! Qualifiers, type specifiers, struct bodies and array specifiers.

use super::{declarations, expressions, name, name_ref, recover};
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

pub(super) fn at_type_start(p: &Parser<'_>) -> bool {
    let kind = p.current();
    kind.is_type_keyword() || kind == SyntaxKind::IDENT || kind == SyntaxKind::STRUCT_KW
}

/// One or more qualifiers, `layout(...)` included.
pub(super) fn type_qualifiers(p: &mut Parser<'_>) {
    let m = p.start();
    while p.current().is_qualifier_keyword() {
        if p.at(SyntaxKind::LAYOUT_KW) {
            layout_qualifier(p);
        } else {
            p.bump();
        }
    }
    m.complete(p, SyntaxKind::TYPE_QUALIFIERS);
}

fn layout_qualifier(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if p.expect(SyntaxKind::L_PAREN) {
        loop {
            let kind = p.current();
            if kind != SyntaxKind::IDENT && !kind.is_keyword() {
                p.error("expected a layout qualifier");
                break;
            }
            let id = p.start();
            p.bump();
            if p.eat(SyntaxKind::EQ) && expressions::conditional(p).is_none() {
                p.error("expected a layout qualifier value");
            }
            id.complete(p, SyntaxKind::LAYOUT_QUALIFIER_ID);
            if !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        p.expect(SyntaxKind::R_PAREN);
    }
    m.complete(p, SyntaxKind::LAYOUT_QUALIFIER);
}

/// A type name with optional array dimensions. Returns whether it was a
/// struct specifier.
pub(super) fn type_specifier(p: &mut Parser<'_>) -> bool {
    let m = p.start();
    let mut is_struct = false;
    match p.current() {
        SyntaxKind::STRUCT_KW => {
            struct_specifier(p);
            is_struct = true;
        }
        SyntaxKind::IDENT => {
            name_ref(p);
        }
        kind if kind.is_type_keyword() => p.bump(),
        _ => p.error("expected a type"),
    }
    if p.at(SyntaxKind::L_BRACK) {
        array_specifier(p);
    }
    m.complete(p, SyntaxKind::TYPE_SPECIFIER);
    is_struct
}

fn struct_specifier(p: &mut Parser<'_>) {
    if !p.enter() {
        p.err_nested("struct nested too deeply", false);
        return;
    }
    let m = p.start();
    p.bump();
    if p.at(SyntaxKind::IDENT) {
        let text = p.nth_text(0);
        p.add_struct_name(text);
        name(p);
    }
    if p.at(SyntaxKind::L_CURLY) {
        field_list(p);
    } else {
        p.expect(SyntaxKind::L_CURLY);
    }
    p.leave();
    m.complete(p, SyntaxKind::STRUCT_SPECIFIER);
}

/// `{ field; ... }` of a struct or interface block.
pub(super) fn field_list(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    while !p.at(SyntaxKind::R_CURLY) && !p.at_end() {
        let before = p.position();
        field_declaration(p);
        if p.position() == before {
            p.err_and_bump("expected a field");
        }
    }
    p.expect(SyntaxKind::R_CURLY);
    m.complete(p, SyntaxKind::FIELD_LIST);
}

fn field_declaration(p: &mut Parser<'_>) {
    if !p.current().is_qualifier_keyword() && !at_type_start(p) {
        recover(p, "expected a field");
        return;
    }
    let m = p.start();
    if p.current().is_qualifier_keyword() {
        type_qualifiers(p);
    }
    if at_type_start(p) {
        type_specifier(p);
        declarations::declarators(p);
    } else {
        p.error("expected a field type");
    }
    p.expect(SyntaxKind::SEMICOLON);
    m.complete(p, SyntaxKind::FIELD_DECLARATION);
}

/// `[N]`, `[]`, `[2][3]`.
pub(super) fn array_specifier(p: &mut Parser<'_>) {
    let m = p.start();
    while p.eat(SyntaxKind::L_BRACK) {
        if !p.at(SyntaxKind::R_BRACK) && expressions::expression(p).is_none() {
            p.error("expected an array size");
        }
        p.expect(SyntaxKind::R_BRACK);
    }
    m.complete(p, SyntaxKind::ARRAY_SPECIFIER);
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use crate::syntax_kind::SyntaxKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn layout_ids_keep_values() {
        let tree = parse("layout(location = 2 + 1, flat_id, shared) in vec3 n;");
        let ids: Vec<String> = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::LAYOUT_QUALIFIER_ID)
            .map(|n| n.text().into_owned())
            .collect();
        assert_eq!(ids, vec!["location = 2 + 1", "flat_id", "shared"]);
    }

    #[test]
    fn struct_name_makes_declarations() {
        let tree = parse("struct Light { vec3 pos; float k[2]; };\nLight sun;\n");
        let kinds: Vec<_> = tree.root().children().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::STRUCT_DECLARATION,
                SyntaxKind::VARIABLE_DECLARATION,
                SyntaxKind::EOF
            ]
        );
        let fields = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::FIELD_DECLARATION)
            .count();
        assert_eq!(fields, 2);
    }

    #[test]
    fn multi_dimensional_array() {
        let tree = parse("float grid[2][3];");
        let array = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::ARRAY_SPECIFIER)
            .unwrap();
        assert_eq!(array.text(), "[2][3]");
    }
}
