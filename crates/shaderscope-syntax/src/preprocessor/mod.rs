//! # Preprocessor model
//!
//! A pass over the token sequence that runs before the grammar. It finds
//! directive lines, groups conditional directives into `#if` chains, decides
//! which branch of every chain is live, and marks the tokens of dead
//! branches as excluded code.
//!
//! Only conditionals, `#define`/`#undef` (for `#ifdef` and `#if`) and
//! `#version` (for the profile) have any effect here. Macros are never
//! expanded into the token stream.
//!
//! The live branch of a chain comes from, in order of precedence:
//!
//! 1. a host override ([`Settings::set_preprocessors`]),
//! 2. evaluating the condition against the macros defined so far,
//! 3. `#else`, when nothing before it was true.

mod eval;

use std::ops::Range;

use crate::error::{LexErrorKind, SyntaxError};
use crate::settings::{Profile, Settings};
use crate::syntax_kind::SyntaxKind;
use crate::token::Token;
use eval::{MacroBody, MacroTable};

/// One conditional directive and whether its branch is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preprocessor {
    /// Index of the directive token in the token sequence.
    pub keyword: usize,
    pub kind: SyntaxKind,
    pub value: bool,
}

/// An `#if`/`#ifdef`/`#ifndef` with its `#elif`, `#else` and `#endif`
/// siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfPreprocessor {
    pub head: Preprocessor,
    pub siblings: Vec<Preprocessor>,
}

impl IfPreprocessor {
    pub fn new(head: Preprocessor) -> Self {
        Self {
            head,
            siblings: Vec::new(),
        }
    }

    /// The head and every `#elif`/`#else`, in order. `#endif` is not a
    /// branch.
    pub fn branches(&self) -> impl Iterator<Item = &Preprocessor> {
        std::iter::once(&self.head).chain(
            self.siblings
                .iter()
                .filter(|p| p.kind != SyntaxKind::PP_ENDIF),
        )
    }

    fn branches_mut(&mut self) -> impl Iterator<Item = &mut Preprocessor> {
        std::iter::once(&mut self.head).chain(
            self.siblings
                .iter_mut()
                .filter(|p| p.kind != SyntaxKind::PP_ENDIF),
        )
    }

    pub fn branch_count(&self) -> usize {
        self.branches().count()
    }

    pub fn values(&self) -> Vec<bool> {
        self.branches().map(|p| p.value).collect()
    }

    /// Index of the live branch, if any.
    pub fn active_branch(&self) -> Option<usize> {
        self.branches().position(|p| p.value)
    }

    pub fn endif(&self) -> Option<&Preprocessor> {
        self.siblings
            .iter()
            .find(|p| p.kind == SyntaxKind::PP_ENDIF)
    }

    /// Turns the `#else` branch on when no other branch is live.
    pub fn check_for_else(&mut self) {
        if self.active_branch().is_some() {
            return;
        }
        if let Some(last) = self.branches_mut().last()
            && last.kind == SyntaxKind::PP_ELSE
        {
            last.value = true;
        }
    }

    /// Makes `branch` the only live branch. An out-of-range index turns
    /// every branch off.
    pub fn set_all_values(&mut self, branch: usize) {
        for (index, p) in self.branches_mut().enumerate() {
            p.value = index == branch;
        }
    }
}

/// A directive line: the directive token and the tokens up to the next
/// logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveLine {
    /// A `PP_*` kind, `HASH` for the null directive, or `INVALID_TOKEN`.
    pub kind: SyntaxKind,
    pub tokens: Range<usize>,
    /// False for directives inside excluded code.
    pub active: bool,
}

/// Result of the preprocessor pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocessorState {
    pub lines: Vec<DirectiveLine>,
    pub chains: Vec<IfPreprocessor>,
    /// Token ranges of excluded code, between directive lines.
    pub excluded: Vec<Range<usize>>,
    /// Profile selected by `#version`, if present.
    pub profile: Option<Profile>,
    pub errors: Vec<SyntaxError>,
    code: Vec<bool>,
}

#[derive(Debug)]
struct Frame {
    chain: usize,
    parent_active: bool,
    forced: Option<usize>,
    branch: usize,
    seen_else: bool,
}

fn is_name(token: &Token) -> bool {
    token.kind == SyntaxKind::IDENT || token.kind.is_keyword()
}

/// True for the first token of a directive line.
pub(crate) fn starts_directive(token: &Token) -> bool {
    if !token.at_line_start {
        return false;
    }
    token.kind.is_preprocessor()
        || token.kind == SyntaxKind::HASH
        || (token.kind == SyntaxKind::INVALID_TOKEN
            && token
                .error
                .as_ref()
                .is_some_and(|e| e.kind == LexErrorKind::PreprocessorToken))
}

fn line_end(tokens: &[Token], start: usize) -> usize {
    let mut end = start + 1;
    while end < tokens.len() && !tokens[end].at_line_start && !tokens[end].is_eof() {
        end += 1;
    }
    end
}

impl PreprocessorState {
    pub(crate) fn run(tokens: &[Token], settings: &Settings) -> Self {
        let mut pass = Pass {
            tokens,
            settings,
            macros: MacroTable::predefined(settings),
            frames: Vec::new(),
            active: true,
            state: PreprocessorState {
                code: vec![false; tokens.len()],
                ..Self::default()
            },
        };
        pass.walk();
        pass.finish()
    }

    /// Whether token `index` is live code for the grammar.
    pub fn is_code(&self, index: usize) -> bool {
        self.code.get(index).copied().unwrap_or(false)
    }

    /// Indices of live code tokens, EOF included.
    pub fn code_tokens(&self) -> Vec<usize> {
        self.code
            .iter()
            .enumerate()
            .filter_map(|(i, live)| live.then_some(i))
            .collect()
    }

    /// Whether token `index` lies in excluded code.
    pub fn is_excluded(&self, index: usize) -> bool {
        self.excluded.iter().any(|run| run.contains(&index))
    }
}

struct Pass<'t> {
    tokens: &'t [Token],
    settings: &'t Settings,
    macros: MacroTable,
    frames: Vec<Frame>,
    active: bool,
    state: PreprocessorState,
}

impl Pass<'_> {
    fn walk(&mut self) {
        let mut excluded_start: Option<usize> = None;
        let mut i = 0;
        while i < self.tokens.len() {
            let token = &self.tokens[i];
            if token.is_eof() {
                self.state.code[i] = true;
                break;
            }
            if starts_directive(token) {
                if let Some(start) = excluded_start.take() {
                    self.state.excluded.push(start..i);
                }
                let end = line_end(self.tokens, i);
                let line_active = self.active;
                self.directive(i, end);
                self.state.lines.push(DirectiveLine {
                    kind: token.kind,
                    tokens: i..end,
                    active: line_active,
                });
                i = end;
                continue;
            }
            if self.active {
                self.state.code[i] = true;
            } else if excluded_start.is_none() {
                excluded_start = Some(i);
            }
            i += 1;
        }
        if let Some(start) = excluded_start {
            self.state.excluded.push(start..i);
        }
    }

    fn finish(mut self) -> PreprocessorState {
        while let Some(frame) = self.frames.pop() {
            let head = self.state.chains[frame.chain].head.keyword;
            self.error("unterminated conditional directive", head);
        }
        log::debug!(
            "preprocessor: {} directives, {} chains, {} excluded runs",
            self.state.lines.len(),
            self.state.chains.len(),
            self.state.excluded.len()
        );
        self.state
    }

    fn error(&mut self, message: &str, token: usize) {
        let span = self.tokens[token].span;
        self.state.errors.push(SyntaxError::new(message, span));
    }

    fn directive(&mut self, start: usize, end: usize) {
        let kind = self.tokens[start].kind;
        let args = &self.tokens[start + 1..end];
        match kind {
            SyntaxKind::PP_IF | SyntaxKind::PP_IFDEF | SyntaxKind::PP_IFNDEF => {
                let ordinal = self.state.chains.len();
                let forced = self.settings.preprocessor_override(ordinal);
                let value = self.active
                    && match forced {
                        Some(branch) => branch == 0,
                        None => self.condition(kind, start, args),
                    };
                self.state.chains.push(IfPreprocessor::new(Preprocessor {
                    keyword: start,
                    kind,
                    value,
                }));
                self.frames.push(Frame {
                    chain: ordinal,
                    parent_active: self.active,
                    forced,
                    branch: 0,
                    seen_else: false,
                });
                self.active = value;
            }
            SyntaxKind::PP_ELIF => {
                let Some(frame) = self.frames.last_mut() else {
                    return self.error("#elif without matching #if", start);
                };
                if frame.seen_else {
                    return self.error("#elif after #else", start);
                }
                frame.branch += 1;
                let (chain, parent_active, forced, branch) =
                    (frame.chain, frame.parent_active, frame.forced, frame.branch);
                let taken = self.state.chains[chain].active_branch().is_some();
                let value = parent_active
                    && !taken
                    && match forced {
                        Some(forced) => forced == branch,
                        None => self.condition(kind, start, args),
                    };
                self.state.chains[chain].siblings.push(Preprocessor {
                    keyword: start,
                    kind,
                    value,
                });
                self.active = value;
            }
            SyntaxKind::PP_ELSE => {
                let Some(frame) = self.frames.last_mut() else {
                    return self.error("#else without matching #if", start);
                };
                if frame.seen_else {
                    return self.error("#else after #else", start);
                }
                frame.branch += 1;
                frame.seen_else = true;
                let chain = &mut self.state.chains[frame.chain];
                chain.siblings.push(Preprocessor {
                    keyword: start,
                    kind,
                    value: false,
                });
                if frame.parent_active {
                    match frame.forced {
                        Some(branch) => chain.set_all_values(branch),
                        None => chain.check_for_else(),
                    }
                }
                self.active = chain.siblings.last().is_some_and(|p| p.value);
            }
            SyntaxKind::PP_ENDIF => {
                let Some(frame) = self.frames.pop() else {
                    return self.error("#endif without matching #if", start);
                };
                self.state.chains[frame.chain].siblings.push(Preprocessor {
                    keyword: start,
                    kind,
                    value: false,
                });
                self.active = frame.parent_active;
            }
            SyntaxKind::PP_DEFINE if self.active => self.define(args),
            SyntaxKind::PP_UNDEF if self.active => {
                if let Some(name) = args.first().filter(|t| is_name(t)) {
                    self.macros.undefine(&name.text);
                }
            }
            SyntaxKind::PP_VERSION if self.active => self.version(start, args),
            _ => {}
        }
    }

    fn condition(&mut self, kind: SyntaxKind, start: usize, args: &[Token]) -> bool {
        match kind {
            SyntaxKind::PP_IFDEF | SyntaxKind::PP_IFNDEF => {
                let Some(name) = args.first().filter(|t| is_name(t)) else {
                    self.error("expected a macro name", start);
                    return false;
                };
                let defined = self.macros.is_defined(&name.text);
                if kind == SyntaxKind::PP_IFDEF {
                    defined
                } else {
                    !defined
                }
            }
            _ => {
                if args.is_empty() {
                    self.error("expected a condition", start);
                    return false;
                }
                eval::evaluate(args, &self.macros).is_some_and(|v| v != 0)
            }
        }
    }

    fn define(&mut self, args: &[Token]) {
        let Some(name) = args.first().filter(|t| is_name(t)) else {
            return;
        };
        let function_like = args
            .get(1)
            .is_some_and(|t| t.kind == SyntaxKind::L_PAREN && t.span.start() == name.span.end());
        let body_start = if function_like {
            args.iter()
                .position(|t| t.kind == SyntaxKind::R_PAREN)
                .map_or(args.len(), |i| i + 1)
        } else {
            1
        };
        let tokens = args[body_start..]
            .iter()
            .map(|t| (t.kind, t.text.clone()))
            .collect();
        self.macros.define(
            &name.text,
            MacroBody {
                function_like,
                tokens,
            },
        );
    }

    fn version(&mut self, start: usize, args: &[Token]) {
        let Some(number) = args.first().filter(|t| t.kind == SyntaxKind::INT_CONST) else {
            return self.error("expected a version number", start);
        };
        let Ok(version) = number.text.parse::<u32>() else {
            return self.error("expected a version number", start);
        };
        let word = args.get(1).map(|t| t.text.as_str());
        match Profile::from_directive(version, word) {
            Ok(profile) => {
                self.macros.set_profile(profile);
                self.state.profile = Some(profile);
            }
            Err(err) => {
                let span = args[1].span;
                self.state.errors.push(SyntaxError::new(err.to_string(), span));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::settings::ProfileKind;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> (Vec<Token>, PreprocessorState) {
        run_with(source, &Settings::default())
    }

    fn run_with(source: &str, settings: &Settings) -> (Vec<Token>, PreprocessorState) {
        let tokens = lex(source).tokens;
        let state = PreprocessorState::run(&tokens, settings);
        (tokens, state)
    }

    fn code_texts(tokens: &[Token], state: &PreprocessorState) -> Vec<String> {
        state
            .code_tokens()
            .into_iter()
            .map(|i| tokens[i].text.clone())
            .filter(|t| !t.is_empty())
            .collect()
    }

    #[test]
    fn if_else_picks_one_branch() {
        let (tokens, state) = run("#if 0\na;\n#else\nb;\n#endif\n");
        assert_eq!(code_texts(&tokens, &state), vec!["b", ";"]);
        assert_eq!(state.chains[0].values(), vec![false, true]);
        assert_eq!(state.excluded.len(), 1);
        assert_eq!(tokens[state.excluded[0].start].text, "a");
    }

    #[test]
    fn ifdef_sees_earlier_defines_only() {
        let source = "#ifdef A\nx;\n#endif\n#define A\n#ifdef A\ny;\n#endif\n";
        let (tokens, state) = run(source);
        assert_eq!(code_texts(&tokens, &state), vec!["y", ";"]);
    }

    #[test]
    fn elif_stops_after_first_true_branch() {
        let source = "#if 0\na;\n#elif 1\nb;\n#elif 1\nc;\n#else\nd;\n#endif\n";
        let (tokens, state) = run(source);
        assert_eq!(code_texts(&tokens, &state), vec!["b", ";"]);
        assert_eq!(state.chains[0].values(), vec![false, true, false, false]);
    }

    #[test]
    fn nested_chain_in_dead_branch_stays_dead() {
        let source = "#if 0\n#if 1\na;\n#else\nb;\n#endif\n#endif\nc;\n";
        let (tokens, state) = run(source);
        assert_eq!(code_texts(&tokens, &state), vec!["c", ";"]);
        assert_eq!(state.chains[1].values(), vec![false, false]);
        assert!(!state.lines[1].active);
    }

    #[test]
    fn host_override_forces_branch() {
        let mut settings = Settings::default();
        settings.set_preprocessors(0, 0);
        let (tokens, state) = run_with("#if 0\na;\n#else\nb;\n#endif\n", &settings);
        assert_eq!(code_texts(&tokens, &state), vec!["a", ";"]);
        assert_eq!(state.chains[0].values(), vec![true, false]);
    }

    #[test]
    fn predefined_macros_are_visible() {
        let settings = Settings::default().with_macros(["USE_FOG"]);
        let (tokens, state) = run_with("#ifdef USE_FOG\nfog;\n#endif\n", &settings);
        assert_eq!(code_texts(&tokens, &state), vec!["fog", ";"]);
    }

    #[test]
    fn version_directive_sets_profile() {
        let (_, state) = run("#version 300 es\n#if defined(GL_ES)\n#endif\n");
        assert_eq!(state.profile, Some(Profile::new(300, ProfileKind::Es)));
        assert_eq!(state.chains[0].values(), vec![true]);
    }

    #[test]
    fn unbalanced_directives_are_reported() {
        let (_, state) = run("#endif\n#if 1\n");
        let messages: Vec<_> = state.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "#endif without matching #if",
                "unterminated conditional directive"
            ]
        );
    }

    #[test]
    fn check_for_else_activates_only_when_nothing_is_live() {
        let mut chain = IfPreprocessor::new(Preprocessor {
            keyword: 0,
            kind: SyntaxKind::PP_IF,
            value: false,
        });
        chain.siblings.push(Preprocessor {
            keyword: 3,
            kind: SyntaxKind::PP_ELSE,
            value: false,
        });
        chain.siblings.push(Preprocessor {
            keyword: 6,
            kind: SyntaxKind::PP_ENDIF,
            value: false,
        });
        chain.check_for_else();
        assert_eq!(chain.values(), vec![false, true]);
        assert_eq!(chain.active_branch(), Some(1));

        chain.set_all_values(0);
        chain.check_for_else();
        assert_eq!(chain.values(), vec![true, false]);
        assert_eq!(chain.endif().map(|p| p.keyword), Some(6));
    }
}
