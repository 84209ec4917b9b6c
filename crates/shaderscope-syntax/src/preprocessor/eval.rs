//! Constant evaluation of `#if` / `#elif` conditions.
//!
//! Supports integer literals, `defined NAME` / `defined(NAME)`, the unary
//! operators `! ~ - +`, the C binary operators, `?:` and parentheses.
//! Object-like macros are replaced by their evaluated body; names that are
//! not macros evaluate to zero. Anything else (function-like macros,
//! division by zero, stray tokens) makes the condition unevaluable.

use std::collections::HashMap;

use crate::lexer::lex;
use crate::settings::{Profile, ProfileKind, Settings};
use crate::syntax_kind::SyntaxKind;
use crate::token::Token;

/// Macro bodies get expanded at most this deep, so `#define A A` ends.
const MAX_DEPTH: u8 = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MacroBody {
    pub function_like: bool,
    pub tokens: Vec<(SyntaxKind, String)>,
}

/// Macros defined at some point of the preprocessor walk.
#[derive(Debug, Clone, Default)]
pub(crate) struct MacroTable {
    macros: HashMap<String, MacroBody>,
}

impl MacroTable {
    /// The language-defined macros plus everything `settings` predefines.
    pub fn predefined(settings: &Settings) -> Self {
        let mut table = Self::default();
        table.set_profile(settings.profile);
        table.define_text("__LINE__", "0");
        table.define_text("__FILE__", "0");
        for (name, body) in settings.macro_definitions() {
            table.define_text(name, body);
        }
        table
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.define_text("__VERSION__", &profile.version.to_string());
        self.macros.remove("GL_ES");
        self.macros.remove("GL_core_profile");
        self.macros.remove("GL_compatibility_profile");
        match profile.kind {
            ProfileKind::Es => self.define_text("GL_ES", "1"),
            ProfileKind::Core => self.define_text("GL_core_profile", "1"),
            ProfileKind::Compatibility => self.define_text("GL_compatibility_profile", "1"),
        }
    }

    fn define_text(&mut self, name: &str, body: &str) {
        let tokens = lex(body)
            .tokens
            .into_iter()
            .filter(|t| !t.is_eof())
            .map(|t| (t.kind, t.text))
            .collect();
        self.macros.insert(
            name.to_string(),
            MacroBody {
                function_like: false,
                tokens,
            },
        );
    }

    pub fn define(&mut self, name: &str, body: MacroBody) {
        self.macros.insert(name.to_string(), body);
    }

    pub fn undefine(&mut self, name: &str) {
        self.macros.remove(name);
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<&MacroBody> {
        self.macros.get(name)
    }
}

/// Evaluates a condition. `None` means it could not be evaluated.
pub(crate) fn evaluate(tokens: &[Token], macros: &MacroTable) -> Option<i64> {
    let tokens: Vec<(SyntaxKind, &str)> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
    evaluate_pairs(&tokens, macros, 0)
}

fn evaluate_pairs(tokens: &[(SyntaxKind, &str)], macros: &MacroTable, depth: u8) -> Option<i64> {
    if tokens.is_empty() || depth > MAX_DEPTH {
        return None;
    }
    let mut eval = Evaluator {
        tokens,
        pos: 0,
        macros,
        depth,
        failed: false,
    };
    let value = eval.conditional();
    if eval.failed || eval.pos != tokens.len() {
        return None;
    }
    value
}

struct Evaluator<'a> {
    tokens: &'a [(SyntaxKind, &'a str)],
    pos: usize,
    macros: &'a MacroTable,
    depth: u8,
    failed: bool,
}

fn binding_power(kind: SyntaxKind) -> Option<u8> {
    use SyntaxKind::*;
    let bp = match kind {
        PIPE_PIPE => 1,
        AMP_AMP => 2,
        PIPE => 3,
        CARET => 4,
        AMP => 5,
        EQ_EQ | NOT_EQ => 6,
        LT | GT | LT_EQ | GT_EQ => 7,
        SHL | SHR => 8,
        PLUS | MINUS => 9,
        STAR | SLASH | PERCENT => 10,
        _ => return None,
    };
    Some(bp)
}

fn apply(op: SyntaxKind, lhs: Option<i64>, rhs: Option<i64>) -> Option<i64> {
    use SyntaxKind::*;
    match (op, lhs) {
        (AMP_AMP, Some(0)) => return Some(0),
        (PIPE_PIPE, Some(l)) if l != 0 => return Some(1),
        _ => {}
    }
    let (l, r) = (lhs?, rhs?);
    let value = match op {
        PIPE_PIPE | AMP_AMP => i64::from(r != 0),
        PIPE => l | r,
        CARET => l ^ r,
        AMP => l & r,
        EQ_EQ => i64::from(l == r),
        NOT_EQ => i64::from(l != r),
        LT => i64::from(l < r),
        GT => i64::from(l > r),
        LT_EQ => i64::from(l <= r),
        GT_EQ => i64::from(l >= r),
        SHL => l.checked_shl(u32::try_from(r).ok()?)?,
        SHR => l.checked_shr(u32::try_from(r).ok()?)?,
        PLUS => l.wrapping_add(r),
        MINUS => l.wrapping_sub(r),
        STAR => l.wrapping_mul(r),
        SLASH => l.checked_div(r)?,
        PERCENT => l.checked_rem(r)?,
        _ => return None,
    };
    Some(value)
}

fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim_end_matches(['u', 'U']);
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if text.len() > 1 && text.starts_with('0') {
        i64::from_str_radix(&text[1..], 8).ok()
    } else {
        text.parse().ok()
    }
}

fn is_name(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::IDENT || kind.is_keyword()
}

impl Evaluator<'_> {
    fn peek(&self) -> Option<SyntaxKind> {
        self.tokens.get(self.pos).map(|(kind, _)| *kind)
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn fail(&mut self) -> Option<i64> {
        self.failed = true;
        None
    }

    fn conditional(&mut self) -> Option<i64> {
        let condition = self.binary(0);
        if !self.eat(SyntaxKind::QUESTION) {
            return condition;
        }
        let then = self.conditional();
        if !self.eat(SyntaxKind::COLON) {
            return self.fail();
        }
        let otherwise = self.conditional();
        if condition? != 0 { then } else { otherwise }
    }

    fn binary(&mut self, min_bp: u8) -> Option<i64> {
        let mut lhs = self.unary();
        while let Some(op) = self.peek() {
            let Some(bp) = binding_power(op) else { break };
            if bp < min_bp {
                break;
            }
            self.pos += 1;
            let rhs = self.binary(bp + 1);
            lhs = apply(op, lhs, rhs);
        }
        lhs
    }

    fn unary(&mut self) -> Option<i64> {
        match self.peek() {
            Some(SyntaxKind::BANG) => {
                self.pos += 1;
                self.unary().map(|v| i64::from(v == 0))
            }
            Some(SyntaxKind::TILDE) => {
                self.pos += 1;
                self.unary().map(|v| !v)
            }
            Some(SyntaxKind::MINUS) => {
                self.pos += 1;
                self.unary().map(i64::wrapping_neg)
            }
            Some(SyntaxKind::PLUS) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Option<i64> {
        let Some(&(kind, text)) = self.tokens.get(self.pos) else {
            return self.fail();
        };
        self.pos += 1;
        match kind {
            SyntaxKind::INT_CONST | SyntaxKind::UINT_CONST => parse_integer(text),
            SyntaxKind::L_PAREN => {
                let value = self.conditional();
                if !self.eat(SyntaxKind::R_PAREN) {
                    return self.fail();
                }
                value
            }
            SyntaxKind::IDENT if text == "defined" => {
                let parenthesised = self.eat(SyntaxKind::L_PAREN);
                let name = match self.tokens.get(self.pos) {
                    Some(&(kind, name)) if is_name(kind) => name,
                    _ => return self.fail(),
                };
                self.pos += 1;
                if parenthesised && !self.eat(SyntaxKind::R_PAREN) {
                    return self.fail();
                }
                Some(i64::from(self.macros.is_defined(name)))
            }
            kind if is_name(kind) => match self.macros.get(text) {
                None => Some(0),
                Some(body) if body.function_like => None,
                Some(body) => {
                    let pairs: Vec<(SyntaxKind, &str)> =
                        body.tokens.iter().map(|(k, t)| (*k, t.as_str())).collect();
                    evaluate_pairs(&pairs, self.macros, self.depth + 1)
                }
            },
            _ => self.fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn eval_with(source: &str, macros: &MacroTable) -> Option<i64> {
        let tokens: Vec<Token> = lex(source)
            .tokens
            .into_iter()
            .filter(|t| !t.is_eof())
            .collect();
        evaluate(&tokens, macros)
    }

    fn table() -> MacroTable {
        let settings = Settings::default().with_macros(["FOUR=4", "ALIAS=FOUR * 2", "LOOP=LOOP"]);
        MacroTable::predefined(&settings)
    }

    #[rstest]
    #[case("1", Some(1))]
    #[case("0x10 + 010", Some(24))]
    #[case("1 + 2 * 3", Some(7))]
    #[case("(1 + 2) * 3", Some(9))]
    #[case("!0 && ~0", Some(1))]
    #[case("-3 < 2 ? 10 : 20", Some(10))]
    #[case("defined FOUR", Some(1))]
    #[case("defined(MISSING) || FOUR == 4", Some(1))]
    #[case("ALIAS", Some(8))]
    #[case("UNKNOWN", Some(0))]
    #[case("__VERSION__ >= 450", Some(1))]
    #[case("0 && 1 / 0", Some(0))]
    #[case("1 / 0", None)]
    #[case("LOOP", None)]
    #[case("1 +", None)]
    #[case("(1", None)]
    #[case("1 2", None)]
    fn evaluates_conditions(#[case] source: &str, #[case] expected: Option<i64>) {
        assert_eq!(eval_with(source, &table()), expected);
    }

    #[test]
    fn function_like_macros_are_unevaluable() {
        let mut macros = table();
        macros.define(
            "F",
            MacroBody {
                function_like: true,
                tokens: vec![(SyntaxKind::INT_CONST, "1".to_string())],
            },
        );
        assert_eq!(eval_with("F", &macros), None);
        assert_eq!(eval_with("defined F", &macros), Some(1));
    }

    #[test]
    fn profile_macros_follow_version() {
        let mut macros = table();
        macros.set_profile(Profile::new(300, ProfileKind::Es));
        assert_eq!(eval_with("defined GL_ES && __VERSION__ == 300", &macros), Some(1));
        assert_eq!(eval_with("defined GL_core_profile", &macros), Some(0));
    }
}
