//! # Lexer - Tokenizing GLSL Source
//!
//! The lexer turns a [`Snapshot`] into an EOF-terminated token sequence.
//! It works in three passes:
//!
//! 1. **Splicing**: line continuations (`\` + line terminator) are removed,
//!    with an offset map back to the source. Tokens split over several
//!    physical lines come out whole.
//! 2. **Raw scan**: a [Logos] lexer classifies the logical text into
//!    trivia, identifiers, numbers and punctuation.
//! 3. **Cooking**: keywords and directives are recognised, continuation
//!    markers between tokens become trivia, and trivia is attached to the
//!    tokens around it.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every source byte belongs to exactly one token or trivia item. Putting
//! them back together gives the original text:
//!
//! ```
//! use shaderscope_syntax::lexer::{lex, reconstruct};
//!
//! let input = "float x = 1.0; // one\n";
//! let result = lex(input);
//! assert_eq!(reconstruct(&result.tokens, input), input);
//! ```
//!
//! Lexing never fails. Text that cannot be classified becomes an
//! `INVALID_TOKEN` with a [`LexError`] and a diagnostic in
//! [`LexResult::errors`].

mod number;
mod raw;
mod splice;

use std::ops::Range;

use logos::Logos;

pub use number::NumberClass;

use crate::error::{LexError, LexErrorKind, SyntaxError};
use crate::span::Span;
use crate::syntax_kind::SyntaxKind;
use crate::text::{LineIndex, Snapshot, StringSnapshot};
use crate::token::{Token, Trivia, TriviaKind, TriviaList};
use raw::RawToken;
use splice::Spliced;

/// Everything one lexer run produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexResult {
    /// Tokens in source order; the last one is always `EOF`.
    pub tokens: Vec<Token>,
    /// Spans of every comment, in source order.
    pub comment_spans: Vec<Span>,
    /// One entry per invalid token.
    pub errors: Vec<SyntaxError>,
}

/// Lexes `text` as a whole document.
pub fn lex(text: &str) -> LexResult {
    Lexer::run(&StringSnapshot::new(text), None)
}

/// Reassembles the source text covered by `tokens`.
pub fn reconstruct(tokens: &[Token], source: &str) -> String {
    tokens.iter().map(|t| t.full_text(source)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Trivia(TriviaKind),
    Token(SyntaxKind),
}

/// A token or trivia item before attachment.
#[derive(Debug, Clone)]
struct Item {
    kind: ItemKind,
    logical: Range<usize>,
    span: Span,
    error: Option<LexError>,
}

impl Item {
    fn is_trivia(&self, kind: TriviaKind) -> bool {
        self.kind == ItemKind::Trivia(kind)
    }

    fn token_kind(&self) -> Option<SyntaxKind> {
        match self.kind {
            ItemKind::Token(kind) => Some(kind),
            ItemKind::Trivia(_) => None,
        }
    }
}

pub struct Lexer;

impl Lexer {
    /// Lexes `snapshot`.
    ///
    /// With a `restart` span only the lines it touches are lexed: from the
    /// start of the logical line containing `restart.start()` to the end of
    /// the logical line containing `restart.end()`. Spans stay in document
    /// coordinates.
    pub fn run(snapshot: &dyn Snapshot, restart: Option<Span>) -> LexResult {
        let region = lex_region(snapshot, restart);
        let source = snapshot.text(region);
        let spliced = Spliced::new(&source, region.start());

        let mut comment_spans = Vec::new();
        let items = scan(&spliced, &mut comment_spans);
        let items = fill_continuations(items, &spliced, region);
        let items = fold_directives(items, &spliced);

        let base_line = snapshot.line_from_position(region.start()).line_number;
        let lines = LineIndex::new(&source);
        let cook = Cook {
            spliced: &spliced,
            source: &source,
            region,
            base_line,
            lines: &lines,
        };
        let tokens = cook.attach(items);

        let errors: Vec<SyntaxError> = tokens
            .iter()
            .filter_map(|t| {
                t.error
                    .as_ref()
                    .map(|e| SyntaxError::new(e.message.clone(), t.span))
            })
            .collect();

        log::debug!(
            "lexed {} tokens over {} ({} errors, {} comments)",
            tokens.len(),
            region,
            errors.len(),
            comment_spans.len()
        );

        LexResult {
            tokens,
            comment_spans,
            errors,
        }
    }
}

/// Widens a restart span to whole logical lines.
fn lex_region(snapshot: &dyn Snapshot, restart: Option<Span>) -> Span {
    let len = snapshot.len();
    let Some(restart) = restart else {
        return Span::new(0, len);
    };
    let restart = restart.clamp_to(len);

    let mut first = snapshot.line_from_position(restart.start());
    while first.line_number > 0 {
        match snapshot.line_from_line_number(first.line_number - 1) {
            Some(previous) if previous.has_line_continuation() => first = previous,
            _ => break,
        }
    }

    let mut last = snapshot.line_from_position(restart.end());
    while last.has_line_continuation() {
        match snapshot.line_from_line_number(last.line_number + 1) {
            Some(next) => last = next,
            None => break,
        }
    }

    Span::new(first.span.start(), last.span.end().max(first.span.start()))
}

/// Runs Logos over the logical text.
fn scan(spliced: &Spliced, comment_spans: &mut Vec<Span>) -> Vec<Item> {
    let mut items = Vec::new();
    let mut lexer = RawToken::lexer(&spliced.text);

    while let Some(result) = lexer.next() {
        let logical = lexer.span();
        let span = spliced.source_span(logical.clone());
        let slice = lexer.slice();

        let (kind, error) = match result {
            Ok(RawToken::Whitespace) => (ItemKind::Trivia(TriviaKind::Whitespace), None),
            Ok(RawToken::Newline) => (ItemKind::Trivia(TriviaKind::Newline), None),
            Ok(RawToken::LineComment) => {
                comment_spans.push(span);
                (ItemKind::Trivia(TriviaKind::LineComment), None)
            }
            Ok(RawToken::BlockComment(true)) => {
                comment_spans.push(span);
                (ItemKind::Trivia(TriviaKind::BlockComment), None)
            }
            Ok(RawToken::BlockComment(false)) => {
                comment_spans.push(span);
                (
                    ItemKind::Token(SyntaxKind::INVALID_TOKEN),
                    Some(LexError::new(
                        LexErrorKind::UnterminatedComment,
                        "unterminated block comment",
                    )),
                )
            }
            Ok(RawToken::Ident) => (
                ItemKind::Token(SyntaxKind::from_keyword(slice).unwrap_or(SyntaxKind::IDENT)),
                None,
            ),
            Ok(RawToken::Number(class)) => match class.kind() {
                Some(kind) => (ItemKind::Token(kind), None),
                None => (
                    ItemKind::Token(SyntaxKind::INVALID_TOKEN),
                    Some(LexError::new(
                        LexErrorKind::Number,
                        format!("'{slice}' is not a valid numeric literal"),
                    )),
                ),
            },
            Ok(RawToken::Hash) => (ItemKind::Token(SyntaxKind::HASH), None),
            Ok(RawToken::Punct(kind)) => (ItemKind::Token(kind), None),
            Err(()) => (
                ItemKind::Token(SyntaxKind::INVALID_TOKEN),
                Some(LexError::new(
                    LexErrorKind::Character,
                    format!("unexpected character '{slice}'"),
                )),
            ),
        };

        items.push(Item {
            kind,
            logical,
            span,
            error,
        });
    }
    items
}

/// Turns the source gaps left by splicing into `LineContinuation` trivia.
fn fill_continuations(items: Vec<Item>, spliced: &Spliced, region: Span) -> Vec<Item> {
    if spliced.continuations.is_empty() {
        return items;
    }
    let mut out = Vec::with_capacity(items.len() + spliced.continuations.len());
    let mut cursor = region.start();
    let mut logical_cursor = 0;
    for item in items {
        if item.span.start() > cursor {
            out.push(continuation(cursor, item.span.start(), item.logical.start));
        }
        cursor = item.span.end();
        logical_cursor = item.logical.end;
        out.push(item);
    }
    let end = spliced.source_end();
    if end > cursor {
        out.push(continuation(cursor, end, logical_cursor));
    }
    out
}

fn continuation(start: usize, end: usize, logical: usize) -> Item {
    Item {
        kind: ItemKind::Trivia(TriviaKind::LineContinuation),
        logical: logical..logical,
        span: Span::new(start, end),
        error: None,
    }
}

/// Folds `#` + directive word into one directive token, and the rest of an
/// `#error`/`#pragma` line into one `PREPROCESSOR_TEXT` token.
fn fold_directives(items: Vec<Item>, spliced: &Spliced) -> Vec<Item> {
    let mut out: Vec<Item> = Vec::with_capacity(items.len());
    let mut line_start = true;
    let mut i = 0;

    while i < items.len() {
        let item = &items[i];
        match item.kind {
            ItemKind::Trivia(TriviaKind::Newline) => line_start = true,
            ItemKind::Trivia(_) => {}
            ItemKind::Token(SyntaxKind::HASH) if line_start => {
                line_start = false;
                let word = next_significant(&items, i + 1);
                let word_kind = word.and_then(|w| items[w].token_kind());
                if let (Some(w), Some(kind)) = (word, word_kind)
                    && (kind == SyntaxKind::IDENT || kind.is_keyword())
                {
                    let text = &spliced.text[items[w].logical.clone()];
                    let merged = Item {
                        kind: ItemKind::Token(SyntaxKind::INVALID_TOKEN),
                        logical: item.logical.start..items[w].logical.end,
                        span: item.span.cover(items[w].span),
                        error: None,
                    };
                    match SyntaxKind::from_directive(text) {
                        Some(directive) => {
                            out.push(Item {
                                kind: ItemKind::Token(directive),
                                ..merged
                            });
                            i = w + 1;
                            if matches!(directive, SyntaxKind::PP_ERROR | SyntaxKind::PP_PRAGMA) {
                                i = capture_line_text(&items, i, &mut out);
                            }
                        }
                        None => {
                            out.push(Item {
                                error: Some(LexError::new(
                                    LexErrorKind::PreprocessorToken,
                                    format!("'#{text}' is not a valid preprocessor directive"),
                                )),
                                ..merged
                            });
                            i = w + 1;
                        }
                    }
                    continue;
                }
            }
            ItemKind::Token(_) => line_start = false,
        }
        out.push(items[i].clone());
        i += 1;
    }
    out
}

/// Index of the next item that is not whitespace or a continuation.
fn next_significant(items: &[Item], from: usize) -> Option<usize> {
    (from..items.len()).find(|&j| {
        !items[j].is_trivia(TriviaKind::Whitespace)
            && !items[j].is_trivia(TriviaKind::LineContinuation)
    })
}

/// Copies leading trivia, merges everything from the first to the last
/// token before the line end into one `PREPROCESSOR_TEXT`, and returns the
/// index after it.
fn capture_line_text(items: &[Item], from: usize, out: &mut Vec<Item>) -> usize {
    let line_end = (from..items.len())
        .find(|&j| items[j].is_trivia(TriviaKind::Newline))
        .unwrap_or(items.len());
    let tokens: Vec<usize> = (from..line_end)
        .filter(|&j| items[j].token_kind().is_some())
        .collect();
    let (Some(&first), Some(&last)) = (tokens.first(), tokens.last()) else {
        return from;
    };
    out.extend(items[from..first].iter().cloned());
    out.push(Item {
        kind: ItemKind::Token(SyntaxKind::PREPROCESSOR_TEXT),
        logical: items[first].logical.start..items[last].logical.end,
        span: items[first].span.cover(items[last].span),
        error: None,
    });
    last + 1
}

/// The attachment pass.
struct Cook<'a> {
    spliced: &'a Spliced,
    source: &'a str,
    region: Span,
    base_line: usize,
    lines: &'a LineIndex,
}

impl Cook<'_> {
    fn trivia(&self, kind: TriviaKind, span: Span) -> Trivia {
        let local = span.start() - self.region.start()..span.end() - self.region.start();
        Trivia::new(kind, span, self.source.get(local).unwrap_or_default())
    }

    fn line_of(&self, position: usize) -> usize {
        self.base_line + self.lines.line_of(position - self.region.start())
    }

    fn attach(&self, items: Vec<Item>) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut pending: Vec<Trivia> = Vec::new();
        let mut line_start = true;
        let mut iter = items.into_iter().peekable();

        while let Some(item) = iter.next() {
            let kind = match item.kind {
                ItemKind::Trivia(kind) => {
                    if kind == TriviaKind::Newline {
                        line_start = true;
                    }
                    pending.push(self.trivia(kind, item.span));
                    continue;
                }
                ItemKind::Token(kind) => kind,
            };

            let mut token = Token::new(kind, item.span, &self.spliced.text[item.logical]);
            token.line = self.line_of(item.span.start());
            token.at_line_start = line_start;
            token.leading_trivia = TriviaList::new(std::mem::take(&mut pending)).ok();
            token.error = item.error;
            line_start = false;

            let mut trailing = Vec::new();
            while let Some(next) = iter.peek() {
                let ItemKind::Trivia(trivia_kind) = next.kind else {
                    break;
                };
                trailing.push(self.trivia(trivia_kind, next.span));
                iter.next();
                if trivia_kind == TriviaKind::Newline {
                    line_start = true;
                    break;
                }
            }
            token.trailing_trivia = TriviaList::new(trailing).ok();
            tokens.push(token);
        }

        let end = self.spliced.source_end();
        let mut eof = Token::new(SyntaxKind::EOF, Span::empty(end), "");
        eof.line = self.line_of(end);
        eof.at_line_start = line_start;
        eof.leading_trivia = TriviaList::new(pending).ok();
        tokens.push(eof);
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        lex(input).tokens.iter().map(|t| t.kind).collect()
    }

    fn texts(input: &str) -> Vec<String> {
        lex(input).tokens.into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn lex_empty_input() {
        let result = lex("");
        assert_eq!(result.tokens.len(), 1);
        assert!(result.tokens[0].is_eof());
        assert_eq!(result.tokens[0].span, Span::empty(0));
    }

    #[test]
    fn lex_declaration() {
        assert_eq!(
            kinds("uniform vec4 color;"),
            vec![
                SyntaxKind::UNIFORM_KW,
                SyntaxKind::VEC4_KW,
                SyntaxKind::IDENT,
                SyntaxKind::SEMICOLON,
                SyntaxKind::EOF,
            ]
        );
    }

    #[test]
    fn continuation_splices_tokens() {
        let input = "in\\\nt ab\\\ncde\\\nfgh;";
        assert_eq!(
            kinds(input),
            vec![
                SyntaxKind::INT_KW,
                SyntaxKind::IDENT,
                SyntaxKind::SEMICOLON,
                SyntaxKind::EOF
            ]
        );
        assert_eq!(texts(input), vec!["int", "abcdefgh", ";", ""]);
        let result = lex(input);
        assert_eq!(result.tokens[0].span, Span::new(0, 5));
        assert_eq!(result.tokens[1].span, Span::new(6, 18));
        assert_eq!(reconstruct(&result.tokens, input), input);
    }

    #[test]
    fn continuation_between_tokens_is_trivia() {
        let input = "a \\\n= 1;";
        let result = lex(input);
        let trailing = result.tokens[0].trailing_trivia.as_ref().unwrap();
        assert_eq!(
            trailing.kinds(),
            vec![TriviaKind::Whitespace, TriviaKind::LineContinuation]
        );
        assert_eq!(trailing.text(), " \\\n");
        assert_eq!(reconstruct(&result.tokens, input), input);
    }

    #[test]
    fn trailing_trivia_stops_after_newline() {
        let result = lex("a; // done\n  b");
        let semi = &result.tokens[1];
        assert_eq!(
            semi.trailing_trivia.as_ref().unwrap().kinds(),
            vec![
                TriviaKind::Whitespace,
                TriviaKind::LineComment,
                TriviaKind::Newline
            ]
        );
        let b = &result.tokens[2];
        assert_eq!(
            b.leading_trivia.as_ref().unwrap().kinds(),
            vec![TriviaKind::Whitespace]
        );
        assert!(b.at_line_start);
        assert_eq!(b.line, 1);
    }

    #[test]
    fn eof_owns_remaining_trivia() {
        let result = lex("x;\n\n/* tail */");
        let eof = result.tokens.last().unwrap();
        assert_eq!(
            eof.leading_trivia.as_ref().unwrap().kinds(),
            vec![TriviaKind::Newline, TriviaKind::BlockComment]
        );
        assert_eq!(result.comment_spans, vec![Span::new(4, 14)]);
    }

    #[test]
    fn directive_word_joins_hash() {
        let result = lex("  #  define FOO 1\n");
        assert_eq!(result.tokens[0].kind, SyntaxKind::PP_DEFINE);
        assert_eq!(result.tokens[0].span, Span::new(2, 11));
        assert_eq!(result.tokens[1].kind, SyntaxKind::IDENT);
    }

    #[test]
    fn hash_mid_line_is_not_a_directive() {
        assert_eq!(
            kinds("a # define"),
            vec![
                SyntaxKind::IDENT,
                SyntaxKind::HASH,
                SyntaxKind::IDENT,
                SyntaxKind::EOF
            ]
        );
    }

    #[test]
    fn invalid_directive_reports_word() {
        let result = lex("#foo bar\n");
        let token = &result.tokens[0];
        assert_eq!(token.kind, SyntaxKind::INVALID_TOKEN);
        let error = token.error.as_ref().unwrap();
        assert_eq!(error.kind, LexErrorKind::PreprocessorToken);
        assert_eq!(error.message, "'#foo' is not a valid preprocessor directive");
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn pragma_captures_rest_of_line() {
        let result = lex("#pragma optimize(on) // note\nint x;");
        assert_eq!(result.tokens[0].kind, SyntaxKind::PP_PRAGMA);
        assert_eq!(result.tokens[1].kind, SyntaxKind::PREPROCESSOR_TEXT);
        assert_eq!(result.tokens[1].text, "optimize(on)");
        assert_eq!(result.tokens[2].kind, SyntaxKind::INT_KW);
    }

    #[test]
    fn error_directive_swallows_invalid_characters() {
        let result = lex("#error don't do this\n");
        assert_eq!(
            result.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                SyntaxKind::PP_ERROR,
                SyntaxKind::PREPROCESSOR_TEXT,
                SyntaxKind::EOF
            ]
        );
        assert!(result.errors.is_empty());
    }

    #[test]
    fn unterminated_comment_is_invalid() {
        let result = lex("x /* never closed");
        let token = &result.tokens[1];
        assert_eq!(token.kind, SyntaxKind::INVALID_TOKEN);
        assert_eq!(
            token.error.as_ref().unwrap().kind,
            LexErrorKind::UnterminatedComment
        );
    }

    #[test]
    fn unknown_character_is_invalid() {
        let result = lex("a @ b");
        assert_eq!(result.tokens[1].kind, SyntaxKind::INVALID_TOKEN);
        assert_eq!(
            result.tokens[1].error.as_ref().unwrap().kind,
            LexErrorKind::Character
        );
    }

    #[test]
    fn restart_lexes_whole_lines() {
        let input = "int a;\nfloat b;\nvec2 c;\n";
        let snapshot = StringSnapshot::new(input);
        let result = Lexer::run(&snapshot, Some(Span::new(10, 11)));
        let kinds: Vec<_> = result.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::FLOAT_KW,
                SyntaxKind::IDENT,
                SyntaxKind::SEMICOLON,
                SyntaxKind::EOF
            ]
        );
        assert_eq!(result.tokens[0].span, Span::new(7, 12));
        assert_eq!(result.tokens[0].line, 1);
        assert_eq!(result.tokens[3].span, Span::empty(16));
    }

    #[test]
    fn restart_follows_continued_lines() {
        let input = "x;\n#define A \\\n  1\ny;\n";
        let snapshot = StringSnapshot::new(input);
        let result = Lexer::run(&snapshot, Some(Span::new(16, 16)));
        assert_eq!(result.tokens[0].kind, SyntaxKind::PP_DEFINE);
        assert_eq!(result.tokens[0].span.start(), 3);
    }
}
