use pretty_assertions::assert_eq;
use rstest::rstest;
use shaderscope_syntax::lexer::{lex, reconstruct};
use shaderscope_syntax::{LexErrorKind, Span, SyntaxKind, TriviaKind};

fn kinds(input: &str) -> Vec<SyntaxKind> {
    lex(input).tokens.iter().map(|t| t.kind).collect()
}

/// The kind of a single-token input.
fn single(input: &str) -> SyntaxKind {
    let tokens = lex(input).tokens;
    assert_eq!(tokens.len(), 2, "{input:?} lexed as {tokens:?}");
    tokens[0].kind
}

#[test]
fn documented_comment_fixture() {
    let input = "/* a /* b */\n// c /* d\n\n  /* e */ // f\nx";
    let result = lex(input);
    let x = &result.tokens[0];
    assert_eq!(x.text, "x");
    let trivia = x.leading_trivia.as_ref().unwrap();
    assert_eq!(
        trivia.kinds(),
        vec![
            TriviaKind::BlockComment,
            TriviaKind::Newline,
            TriviaKind::LineComment,
            TriviaKind::Newline,
            TriviaKind::Newline,
            TriviaKind::Whitespace,
            TriviaKind::BlockComment,
            TriviaKind::Whitespace,
            TriviaKind::LineComment,
            TriviaKind::Newline,
        ]
    );
    let texts: Vec<&str> = trivia.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts[0], "/* a /* b */");
    assert_eq!(texts[2], "// c /* d");
    assert_eq!(texts[6], "/* e */");
    assert_eq!(trivia.span(), Span::new(0, 39));
    assert_eq!(
        result.comment_spans,
        vec![
            Span::new(0, 12),
            Span::new(13, 22),
            Span::new(26, 33),
            Span::new(34, 38)
        ]
    );
}

#[test]
fn block_comment_closes_at_first_terminator() {
    assert_eq!(
        kinds("/* /* */ x */"),
        vec![
            SyntaxKind::IDENT,
            SyntaxKind::STAR,
            SyntaxKind::SLASH,
            SyntaxKind::EOF
        ]
    );
}

#[test]
fn line_comment_continues_over_backslash_newline() {
    let input = "// first \\\nstill comment\nx";
    let result = lex(input);
    assert_eq!(result.tokens[0].text, "x");
    assert_eq!(result.comment_spans.len(), 1);
    assert_eq!(reconstruct(&result.tokens, input), input);
}

#[rstest]
#[case("0", SyntaxKind::INT_CONST)]
#[case("42", SyntaxKind::INT_CONST)]
#[case("0x1F", SyntaxKind::INT_CONST)]
#[case("0777", SyntaxKind::INT_CONST)]
#[case("42u", SyntaxKind::UINT_CONST)]
#[case("0XffU", SyntaxKind::UINT_CONST)]
#[case("1.0", SyntaxKind::FLOAT_CONST)]
#[case(".5", SyntaxKind::FLOAT_CONST)]
#[case("5.", SyntaxKind::FLOAT_CONST)]
#[case("1.5e-3f", SyntaxKind::FLOAT_CONST)]
#[case("2.0lf", SyntaxKind::DOUBLE_CONST)]
#[case("2e3LF", SyntaxKind::DOUBLE_CONST)]
#[case("089", SyntaxKind::INVALID_TOKEN)]
#[case("12abc", SyntaxKind::INVALID_TOKEN)]
fn numeric_literals(#[case] input: &str, #[case] expected: SyntaxKind) {
    assert_eq!(single(input), expected);
}

#[test]
fn invalid_number_carries_its_category() {
    let result = lex("float x = 1e;");
    let bad = result
        .tokens
        .iter()
        .find(|t| t.kind == SyntaxKind::INVALID_TOKEN)
        .unwrap();
    assert_eq!(bad.text, "1e");
    assert_eq!(bad.error.as_ref().unwrap().kind, LexErrorKind::Number);
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn every_keyword_has_its_kind() {
    for &(kind, text) in SyntaxKind::KEYWORDS {
        assert_eq!(single(text), kind, "{text}");
        assert!(kind.is_keyword(), "{text}");
    }
}

#[rstest]
#[case("vec4x")]
#[case("Float")]
#[case("_uniform")]
#[case("gl_Position")]
fn keyword_lookalikes_are_identifiers(#[case] input: &str) {
    assert_eq!(single(input), SyntaxKind::IDENT);
}

#[test]
fn every_directive_word_joins_its_hash() {
    for &(kind, word) in SyntaxKind::DIRECTIVES {
        let input = format!("#{word}\n");
        let first = &lex(&input).tokens[0];
        assert_eq!(first.kind, kind, "{input:?}");
        assert!(first.kind.is_preprocessor());
        assert_eq!(kind.directive_word(), Some(word));
    }
}

#[test]
fn punctuation_round_trips() {
    for &(kind, text) in SyntaxKind::PUNCTUATION {
        assert_eq!(single(text), kind, "{text}");
        assert_eq!(kind.fixed_text(), Some(text));
        assert_eq!(SyntaxKind::from_punctuation(text), Some(kind));
        assert!(kind.is_punctuation());
    }
}

#[rstest]
#[case("a<<=b", vec![SyntaxKind::IDENT, SyntaxKind::SHL_EQ, SyntaxKind::IDENT, SyntaxKind::EOF])]
#[case("a>>b", vec![SyntaxKind::IDENT, SyntaxKind::SHR, SyntaxKind::IDENT, SyntaxKind::EOF])]
#[case("a^^b", vec![SyntaxKind::IDENT, SyntaxKind::CARET_CARET, SyntaxKind::IDENT, SyntaxKind::EOF])]
#[case("i+++j", vec![SyntaxKind::IDENT, SyntaxKind::INC, SyntaxKind::PLUS, SyntaxKind::IDENT, SyntaxKind::EOF])]
#[case("a.x", vec![SyntaxKind::IDENT, SyntaxKind::DOT, SyntaxKind::IDENT, SyntaxKind::EOF])]
fn operators_munch_maximally(#[case] input: &str, #[case] expected: Vec<SyntaxKind>) {
    assert_eq!(kinds(input), expected);
}

#[test]
fn lexing_is_lossless() {
    let input = "\
#version 450 core
// Vertex stage.
layout(location = 0) in vec3 position;   \t
uniform mat4 mvp; /* model-view-projection */

#define SCALE(v) \\
    ((v) * 2.0)

void main() {\r
    gl_Position = mvp * vec4(SCALE(position), 1.0);\r
}
/* unterminated";
    let result = lex(input);
    assert_eq!(reconstruct(&result.tokens, input), input);
    assert!(result.tokens.last().unwrap().is_eof());
    for pair in result.tokens.windows(2) {
        assert!(pair[0].full_span().end() <= pair[1].full_span().start());
    }
}

#[test]
fn tokens_know_their_lines() {
    let result = lex("a\n  b c\n\nd");
    let lines: Vec<(String, usize, bool)> = result
        .tokens
        .iter()
        .filter(|t| !t.is_eof())
        .map(|t| (t.text.clone(), t.line, t.at_line_start))
        .collect();
    assert_eq!(
        lines,
        vec![
            ("a".to_string(), 0, true),
            ("b".to_string(), 1, true),
            ("c".to_string(), 1, false),
            ("d".to_string(), 3, true),
        ]
    );
}
