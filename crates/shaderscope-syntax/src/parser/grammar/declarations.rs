//! Declarations: functions, variables, interface blocks and the
//! qualifier-only and precision forms.

use super::{expressions, name, name_ref, recover, skip_brackets, statements, types};
use crate::parser::{Marker, Parser};
use crate::syntax_kind::SyntaxKind;

pub(super) fn external_declaration(p: &mut Parser<'_>) {
    match p.current() {
        SyntaxKind::SEMICOLON => p.bump(),
        SyntaxKind::PRECISION_KW => precision_declaration(p),
        _ if starts_declaration(p) => declaration(p),
        _ => recover(p, "expected a declaration"),
    }
}

/// Whether the upcoming tokens are a declaration rather than an
/// expression. Type keywords followed by `(` (or `[...]` then `(`) are
/// constructor calls; a user type needs a following declarator name.
pub(super) fn starts_declaration(p: &Parser<'_>) -> bool {
    let kind = p.current();
    if kind.is_qualifier_keyword() || kind == SyntaxKind::STRUCT_KW {
        return true;
    }
    if kind.is_type_keyword() {
        return p.nth(skip_brackets(p, 1)) != SyntaxKind::L_PAREN;
    }
    if kind == SyntaxKind::IDENT {
        return p.nth(skip_brackets(p, 1)) == SyntaxKind::IDENT;
    }
    false
}

pub(super) fn precision_declaration(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if p.current().is_precision_qualifier() {
        p.bump();
    } else {
        p.error("expected a precision qualifier");
    }
    if p.current().is_type_keyword() {
        types::type_specifier(p);
    } else {
        p.error("expected a type");
    }
    p.expect(SyntaxKind::SEMICOLON);
    m.complete(p, SyntaxKind::PRECISION_DECLARATION);
}

pub(super) fn declaration(p: &mut Parser<'_>) {
    let m = p.start();
    let qualified = p.current().is_qualifier_keyword();
    if qualified {
        types::type_qualifiers(p);

        if p.eat(SyntaxKind::SEMICOLON) {
            m.complete(p, SyntaxKind::QUALIFIER_DECLARATION);
            return;
        }
        if p.at(SyntaxKind::IDENT)
            && matches!(p.nth(1), SyntaxKind::SEMICOLON | SyntaxKind::COMMA)
            && !p.is_struct_name(p.nth_text(0))
        {
            qualified_names(p, m);
            return;
        }
        if p.at(SyntaxKind::IDENT) && p.nth(1) == SyntaxKind::L_CURLY {
            interface_block(p, m);
            return;
        }
    }

    if !types::at_type_start(p) {
        recover(p, "expected a type");
        m.complete(p, SyntaxKind::VARIABLE_DECLARATION);
        return;
    }
    let is_struct = types::type_specifier(p);

    if p.eat(SyntaxKind::SEMICOLON) {
        let kind = if is_struct {
            SyntaxKind::STRUCT_DECLARATION
        } else {
            SyntaxKind::VARIABLE_DECLARATION
        };
        m.complete(p, kind);
        return;
    }
    if p.at(SyntaxKind::IDENT) && p.nth(1) == SyntaxKind::L_PAREN {
        function(p, m);
        return;
    }
    declarators(p);
    p.expect(SyntaxKind::SEMICOLON);
    m.complete(p, SyntaxKind::VARIABLE_DECLARATION);
}

/// `invariant gl_Position;`, `precise a, b;`
fn qualified_names(p: &mut Parser<'_>, m: Marker) {
    loop {
        if p.at(SyntaxKind::IDENT) {
            name_ref(p);
        } else {
            p.expect(SyntaxKind::IDENT);
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::SEMICOLON);
    m.complete(p, SyntaxKind::QUALIFIER_DECLARATION);
}

fn function(p: &mut Parser<'_>, m: Marker) {
    name(p);
    parameter_list(p);
    if p.at(SyntaxKind::L_CURLY) {
        statements::compound_statement(p);
        m.complete(p, SyntaxKind::FUNCTION_DEFINITION);
    } else {
        p.expect(SyntaxKind::SEMICOLON);
        m.complete(p, SyntaxKind::FUNCTION_PROTOTYPE);
    }
}

fn parameter_list(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if !p.at(SyntaxKind::R_PAREN) {
        loop {
            let before = p.position();
            parameter(p);
            if p.eat(SyntaxKind::COMMA) {
                continue;
            }
            if p.position() == before
                || p.at_any(&[
                    SyntaxKind::R_PAREN,
                    SyntaxKind::L_CURLY,
                    SyntaxKind::SEMICOLON,
                ])
                || p.at_end()
            {
                break;
            }
            p.err_and_bump("expected `,` or `)`");
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    m.complete(p, SyntaxKind::PARAMETER_LIST);
}

fn parameter(p: &mut Parser<'_>) {
    if !p.current().is_qualifier_keyword() && !types::at_type_start(p) {
        p.error("expected a parameter");
        return;
    }
    let m = p.start();
    if p.current().is_qualifier_keyword() {
        types::type_qualifiers(p);
    }
    if types::at_type_start(p) {
        types::type_specifier(p);
    } else {
        p.error("expected a parameter type");
    }
    if p.at(SyntaxKind::IDENT) {
        name(p);
        if p.at(SyntaxKind::L_BRACK) {
            types::array_specifier(p);
        }
    }
    m.complete(p, SyntaxKind::PARAMETER);
}

/// Comma separated declarators.
pub(super) fn declarators(p: &mut Parser<'_>) {
    loop {
        declarator(p);
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
}

fn declarator(p: &mut Parser<'_>) {
    let m = p.start();
    if p.at(SyntaxKind::IDENT) {
        name(p);
    } else {
        p.expect(SyntaxKind::IDENT);
    }
    if p.at(SyntaxKind::L_BRACK) {
        types::array_specifier(p);
    }
    if p.eat(SyntaxKind::EQ) {
        initializer(p);
    }
    m.complete(p, SyntaxKind::DECLARATOR);
}

pub(super) fn initializer(p: &mut Parser<'_>) {
    if p.at(SyntaxKind::L_CURLY) {
        expressions::initializer_list(p);
    } else if expressions::assignment(p).is_none() {
        p.error("expected an initializer");
    }
}

/// `uniform Name { ... } instance[2];` with the qualifiers already parsed.
fn interface_block(p: &mut Parser<'_>, m: Marker) {
    name(p);
    types::field_list(p);
    if p.at(SyntaxKind::IDENT) {
        let d = p.start();
        name(p);
        if p.at(SyntaxKind::L_BRACK) {
            types::array_specifier(p);
        }
        d.complete(p, SyntaxKind::DECLARATOR);
    }
    p.expect(SyntaxKind::SEMICOLON);
    m.complete(p, SyntaxKind::INTERFACE_BLOCK);
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use crate::syntax_kind::SyntaxKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn first_kind(source: &str) -> SyntaxKind {
        parse(source).root().first_child().unwrap().kind()
    }

    #[rstest]
    #[case("float a, b[2] = float[2](1.0, 2.0), c = 3.0;", SyntaxKind::VARIABLE_DECLARATION)]
    #[case("Light lights[4];", SyntaxKind::VARIABLE_DECLARATION)]
    #[case("const int N = 4;", SyntaxKind::VARIABLE_DECLARATION)]
    #[case("struct S { float x; } s;", SyntaxKind::VARIABLE_DECLARATION)]
    #[case("struct S { float x; };", SyntaxKind::STRUCT_DECLARATION)]
    #[case("invariant gl_Position;", SyntaxKind::QUALIFIER_DECLARATION)]
    #[case("layout(std140) uniform;", SyntaxKind::QUALIFIER_DECLARATION)]
    #[case("buffer Data { float v[]; };", SyntaxKind::INTERFACE_BLOCK)]
    #[case("vec4 shade(in vec3 n, const float k[2]);", SyntaxKind::FUNCTION_PROTOTYPE)]
    #[case("void main(void) {}", SyntaxKind::FUNCTION_DEFINITION)]
    #[case("precision mediump sampler2D;", SyntaxKind::PRECISION_DECLARATION)]
    fn declaration_forms(#[case] source: &str, #[case] expected: SyntaxKind) {
        assert_eq!(first_kind(source), expected);
        assert!(parse(source).errors().is_empty(), "{source}");
    }

    #[test]
    fn function_parameters() {
        let tree = parse("float mixed(float a, inout vec2 b[3]) { return a; }");
        let params = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::PARAMETER_LIST)
            .unwrap();
        let names: Vec<String> = params
            .children_of_kind(SyntaxKind::PARAMETER)
            .filter_map(|p| p.child_of_kind(SyntaxKind::NAME))
            .map(|n| n.text().into_owned())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn interface_block_with_instance() {
        let tree = parse("layout(std140, binding = 0) uniform Camera { mat4 view; } cam[2];");
        let block = tree.root().first_child().unwrap();
        assert_eq!(block.kind(), SyntaxKind::INTERFACE_BLOCK);
        let instance = block.child_of_kind(SyntaxKind::DECLARATOR).unwrap();
        assert_eq!(instance.text(), "cam[2]");
        assert!(tree.errors().is_empty());
    }
}
