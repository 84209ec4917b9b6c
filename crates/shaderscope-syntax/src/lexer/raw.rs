//! The context-free first pass, generated by [Logos].
//!
//! [Logos]: https://docs.rs/logos
//!
//! Raw tokens run over the spliced logical text. Everything that depends on
//! context (keywords vs. identifiers, directives, trivia attachment) is
//! decided afterwards in the parent module.

use logos::{Lexer, Logos};

use super::number::{self, NumberClass};
use crate::syntax_kind::SyntaxKind;

/// Raw token kinds produced by Logos.
///
/// Logos needs its own enum to derive on; punctuation is folded into one
/// variant carrying its final [`SyntaxKind`].
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawToken {
    /// Horizontal whitespace, vertical tab and form feed
    #[regex(r"[ \t\x0B\x0C]+")]
    Whitespace,

    #[regex(r"\r\n|\n|\r")]
    Newline,

    #[token("//", line_comment)]
    LineComment,

    /// `true` when the closing `*/` was found
    #[token("/*", block_comment)]
    BlockComment(bool),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]|\.[0-9]", number_literal)]
    Number(NumberClass),

    #[token("#")]
    Hash,

    #[token("(", |_| SyntaxKind::L_PAREN)]
    #[token(")", |_| SyntaxKind::R_PAREN)]
    #[token("[", |_| SyntaxKind::L_BRACK)]
    #[token("]", |_| SyntaxKind::R_BRACK)]
    #[token("{", |_| SyntaxKind::L_CURLY)]
    #[token("}", |_| SyntaxKind::R_CURLY)]
    #[token(".", |_| SyntaxKind::DOT)]
    #[token(",", |_| SyntaxKind::COMMA)]
    #[token(";", |_| SyntaxKind::SEMICOLON)]
    #[token(":", |_| SyntaxKind::COLON)]
    #[token("?", |_| SyntaxKind::QUESTION)]
    #[token("+", |_| SyntaxKind::PLUS)]
    #[token("-", |_| SyntaxKind::MINUS)]
    #[token("*", |_| SyntaxKind::STAR)]
    #[token("/", |_| SyntaxKind::SLASH)]
    #[token("%", |_| SyntaxKind::PERCENT)]
    #[token("++", |_| SyntaxKind::INC)]
    #[token("--", |_| SyntaxKind::DEC)]
    #[token("<<", |_| SyntaxKind::SHL)]
    #[token(">>", |_| SyntaxKind::SHR)]
    #[token("<", |_| SyntaxKind::LT)]
    #[token(">", |_| SyntaxKind::GT)]
    #[token("<=", |_| SyntaxKind::LT_EQ)]
    #[token(">=", |_| SyntaxKind::GT_EQ)]
    #[token("==", |_| SyntaxKind::EQ_EQ)]
    #[token("!=", |_| SyntaxKind::NOT_EQ)]
    #[token("&", |_| SyntaxKind::AMP)]
    #[token("^", |_| SyntaxKind::CARET)]
    #[token("|", |_| SyntaxKind::PIPE)]
    #[token("&&", |_| SyntaxKind::AMP_AMP)]
    #[token("^^", |_| SyntaxKind::CARET_CARET)]
    #[token("||", |_| SyntaxKind::PIPE_PIPE)]
    #[token("!", |_| SyntaxKind::BANG)]
    #[token("~", |_| SyntaxKind::TILDE)]
    #[token("=", |_| SyntaxKind::EQ)]
    #[token("+=", |_| SyntaxKind::PLUS_EQ)]
    #[token("-=", |_| SyntaxKind::MINUS_EQ)]
    #[token("*=", |_| SyntaxKind::STAR_EQ)]
    #[token("/=", |_| SyntaxKind::SLASH_EQ)]
    #[token("%=", |_| SyntaxKind::PERCENT_EQ)]
    #[token("<<=", |_| SyntaxKind::SHL_EQ)]
    #[token(">>=", |_| SyntaxKind::SHR_EQ)]
    #[token("&=", |_| SyntaxKind::AMP_EQ)]
    #[token("^=", |_| SyntaxKind::CARET_EQ)]
    #[token("|=", |_| SyntaxKind::PIPE_EQ)]
    Punct(SyntaxKind),
}

/// Runs to the end of the logical line. Continuations are already spliced,
/// so a `\`-continued comment keeps going.
fn line_comment(lex: &mut Lexer<RawToken>) {
    let rest = lex.remainder();
    let end = rest.find(['\n', '\r']).unwrap_or(rest.len());
    lex.bump(end);
}

/// Runs to the first `*/`. A nested `/*` is plain comment text.
fn block_comment(lex: &mut Lexer<RawToken>) -> bool {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(rest.len());
            false
        }
    }
}

fn number_literal(lex: &mut Lexer<RawToken>) -> NumberClass {
    let start = lex.span().start;
    let matched = lex.slice().len();
    let (len, class) = number::scan(&lex.source()[start..]);
    lex.bump(len.saturating_sub(matched));
    class
}
