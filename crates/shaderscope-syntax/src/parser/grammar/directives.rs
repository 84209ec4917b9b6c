//! Preprocessor lines. The parser running these sees the tokens of one
//! directive line and nothing else, so `at_end` means end of line.
//!
//! Conditions and macro bodies are kept as flat token runs; only the
//! names in them get `NAME`/`NAME_REF` nodes for the definition pass.
//! Conditional nesting, `#ifdef` names and `#version` numbers are
//! diagnosed by the preprocessor pass, not here.

use super::{name, name_ref};
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

const EXTENSION_BEHAVIORS: &[&str] = &["require", "enable", "warn", "disable"];

/// Parse one directive line.
pub(crate) fn directive(p: &mut Parser<'_>) {
    match p.current() {
        SyntaxKind::PP_DEFINE => define(p),
        SyntaxKind::PP_UNDEF => undef(p),
        SyntaxKind::PP_IF | SyntaxKind::PP_ELIF => condition_directive(p),
        SyntaxKind::PP_IFDEF | SyntaxKind::PP_IFNDEF => ifdef(p),
        SyntaxKind::PP_ELSE | SyntaxKind::PP_ENDIF => {
            simple(p, SyntaxKind::CONDITIONAL_DIRECTIVE)
        }
        SyntaxKind::PP_VERSION => version(p),
        SyntaxKind::PP_EXTENSION => extension(p),
        SyntaxKind::PP_PRAGMA => text_directive(p, SyntaxKind::PRAGMA_DIRECTIVE),
        SyntaxKind::PP_ERROR => {
            let message = match p.nth(1) {
                SyntaxKind::PREPROCESSOR_TEXT => format!("#error {}", p.nth_text(1)),
                _ => "#error".to_string(),
            };
            p.error(message);
            text_directive(p, SyntaxKind::ERROR_DIRECTIVE);
        }
        SyntaxKind::PP_LINE => line(p),
        SyntaxKind::HASH if p.nth(1) == SyntaxKind::EOF => {
            simple(p, SyntaxKind::NULL_DIRECTIVE)
        }
        SyntaxKind::HASH => {
            let m = p.start();
            p.bump();
            p.error("expected a preprocessor directive");
            rest(p);
            m.complete(p, SyntaxKind::INVALID_DIRECTIVE);
        }
        // `#foo`: the lexer already reported it.
        _ => {
            let m = p.start();
            p.bump();
            rest(p);
            m.complete(p, SyntaxKind::INVALID_DIRECTIVE);
        }
    }
}

fn at_name(p: &Parser<'_>) -> bool {
    p.at(SyntaxKind::IDENT) || p.current().is_keyword()
}

/// Consumes whatever is left on the line.
fn rest(p: &mut Parser<'_>) {
    while !p.at_end() {
        p.bump();
    }
}

/// Leftover tokens after a complete directive.
fn trailing(p: &mut Parser<'_>) {
    if p.at_end() {
        return;
    }
    p.error("unexpected tokens after directive");
    let m = p.start();
    rest(p);
    m.complete(p, SyntaxKind::ERROR);
}

fn simple(p: &mut Parser<'_>, kind: SyntaxKind) {
    let m = p.start();
    p.bump();
    trailing(p);
    m.complete(p, kind);
}

/// `#define NAME body` or `#define NAME(a, b) body`. The parameter list
/// only counts when `(` touches the name.
fn define(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if !at_name(p) {
        p.error("expected a macro name");
        rest(p);
        m.complete(p, SyntaxKind::DEFINE_DIRECTIVE);
        return;
    }
    let name_end = p.nth_token(0).map(|t| t.span.end());
    name(p);
    let adjacent = p
        .nth_token(0)
        .is_some_and(|t| Some(t.span.start()) == name_end);
    if p.at(SyntaxKind::L_PAREN) && adjacent {
        macro_params(p);
    }
    if !p.at_end() {
        let body = p.start();
        rest(p);
        body.complete(p, SyntaxKind::MACRO_BODY);
    }
    m.complete(p, SyntaxKind::DEFINE_DIRECTIVE);
}

fn macro_params(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if !p.at(SyntaxKind::R_PAREN) {
        loop {
            if !at_name(p) {
                p.error("expected a macro parameter");
                break;
            }
            name(p);
            if !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    m.complete(p, SyntaxKind::MACRO_PARAM_LIST);
}

fn undef(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if at_name(p) {
        name_ref(p);
    } else {
        p.error("expected a macro name");
    }
    trailing(p);
    m.complete(p, SyntaxKind::UNDEF_DIRECTIVE);
}

/// `#if`/`#elif` with the raw condition tokens.
fn condition_directive(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if !p.at_end() {
        let c = p.start();
        while !p.at_end() {
            if p.at(SyntaxKind::IDENT) && p.nth_text(0) != "defined" {
                name_ref(p);
            } else {
                p.bump();
            }
        }
        c.complete(p, SyntaxKind::DIRECTIVE_CONDITION);
    }
    m.complete(p, SyntaxKind::CONDITIONAL_DIRECTIVE);
}

fn ifdef(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if at_name(p) {
        name_ref(p);
        trailing(p);
    } else {
        rest(p);
    }
    m.complete(p, SyntaxKind::CONDITIONAL_DIRECTIVE);
}

fn version(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if p.eat(SyntaxKind::INT_CONST) {
        p.eat(SyntaxKind::IDENT);
        trailing(p);
    } else {
        rest(p);
    }
    m.complete(p, SyntaxKind::VERSION_DIRECTIVE);
}

/// `#extension name : behavior`
fn extension(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if !p.eat(SyntaxKind::IDENT) {
        p.error("expected an extension name");
        rest(p);
        m.complete(p, SyntaxKind::EXTENSION_DIRECTIVE);
        return;
    }
    if p.expect(SyntaxKind::COLON) {
        if !p.at(SyntaxKind::IDENT) {
            p.error("expected an extension behavior");
        } else {
            let behavior = p.nth_text(0);
            if !EXTENSION_BEHAVIORS.contains(&behavior) {
                p.error(format!("unknown extension behavior `{behavior}`"));
            }
            p.bump();
        }
    }
    trailing(p);
    m.complete(p, SyntaxKind::EXTENSION_DIRECTIVE);
}

/// `#pragma` and `#error`, whose text the lexer keeps as one token.
fn text_directive(p: &mut Parser<'_>, kind: SyntaxKind) {
    let m = p.start();
    p.bump();
    p.eat(SyntaxKind::PREPROCESSOR_TEXT);
    trailing(p);
    m.complete(p, kind);
}

/// `#line line [source-string-number]`
fn line(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    if p.at(SyntaxKind::INT_CONST) {
        p.bump();
        p.eat(SyntaxKind::INT_CONST);
    } else {
        p.error("expected a line number");
    }
    trailing(p);
    m.complete(p, SyntaxKind::LINE_DIRECTIVE);
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use crate::syntax_kind::SyntaxKind;
    use crate::tree::SyntaxTree;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn messages(tree: &SyntaxTree) -> Vec<String> {
        tree.errors().iter().map(|e| e.message.clone()).collect()
    }

    #[rstest]
    #[case("#define PI 3.14159\n", SyntaxKind::DEFINE_DIRECTIVE)]
    #[case("#undef PI\n", SyntaxKind::UNDEF_DIRECTIVE)]
    #[case("#version 450 core\n", SyntaxKind::VERSION_DIRECTIVE)]
    #[case("#extension GL_ARB_shading_language_420pack : enable\n", SyntaxKind::EXTENSION_DIRECTIVE)]
    #[case("#pragma optimize(off)\n", SyntaxKind::PRAGMA_DIRECTIVE)]
    #[case("#line 10 2\n", SyntaxKind::LINE_DIRECTIVE)]
    #[case("#\n", SyntaxKind::NULL_DIRECTIVE)]
    fn directive_forms(#[case] source: &str, #[case] expected: SyntaxKind) {
        let tree = parse(source);
        assert_eq!(tree.root().first_child().unwrap().kind(), expected);
        assert_eq!(messages(&tree), Vec::<String>::new());
    }

    #[test]
    fn function_like_macro() {
        let tree = parse("#define MAX(a, b) ((a) > (b) ? (a) : (b))\n");
        let define = tree.root().first_child().unwrap();
        let kinds: Vec<_> = define.children().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::PP_DEFINE,
                SyntaxKind::NAME,
                SyntaxKind::MACRO_PARAM_LIST,
                SyntaxKind::MACRO_BODY
            ]
        );
        let body = define.child_of_kind(SyntaxKind::MACRO_BODY).unwrap();
        assert_eq!(body.text(), "((a) > (b) ? (a) : (b))");
    }

    #[test]
    fn space_before_paren_makes_object_like_macro() {
        let tree = parse("#define WRAP (1)\n");
        let define = tree.root().first_child().unwrap();
        assert!(define.child_of_kind(SyntaxKind::MACRO_PARAM_LIST).is_none());
        let body = define.child_of_kind(SyntaxKind::MACRO_BODY).unwrap();
        assert_eq!(body.text(), "(1)");
    }

    #[test]
    fn condition_names_are_references() {
        let tree = parse("#if defined(FOG) && QUALITY > 1\n#endif\n");
        let refs: Vec<String> = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::NAME_REF)
            .map(|n| n.text().into_owned())
            .collect();
        assert_eq!(refs, vec!["FOG", "QUALITY"]);
    }

    #[test]
    fn directive_diagnostics() {
        let tree = parse("#extension GL_foo : maybe\n#define\n# 42\n#endif junk\n");
        assert_eq!(
            messages(&tree),
            vec![
                "unknown extension behavior `maybe`",
                "expected a macro name",
                "expected a preprocessor directive",
                "#endif without matching #if",
                "unexpected tokens after directive",
            ]
        );
    }

    #[test]
    fn error_directive_reports_only_when_live() {
        let live = parse("#error unsupported target\n");
        assert_eq!(messages(&live), vec!["#error unsupported target"]);
        let dead = parse("#if 0\n#error unsupported target\n#endif\n");
        assert!(dead.errors().is_empty(), "{:?}", dead.errors());
    }
}
