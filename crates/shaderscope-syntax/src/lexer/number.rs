//! Numeric literal classification.
//!
//! A small state machine over the literal grammar:
//!
//! ```text
//! hex      0x[0-9a-fA-F]+ [uU]?
//! octal    0[0-7]*        [uU]?
//! decimal  [1-9][0-9]*    [uU]?
//! float    digits? (. digits?)? ([eE] [+-]? digits)? (f | F | lf | LF)?
//! ```
//!
//! A float needs a `.` or an exponent. Any identifier characters glued to
//! the end of a literal make the whole run invalid, which is how `12abc`,
//! `0x` and `1f` are rejected.

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberClass {
    Int,
    Uint,
    Float,
    Double,
    Invalid,
}

impl NumberClass {
    /// The token kind, or `None` for malformed literals.
    pub fn kind(self) -> Option<SyntaxKind> {
        match self {
            NumberClass::Int => Some(SyntaxKind::INT_CONST),
            NumberClass::Uint => Some(SyntaxKind::UINT_CONST),
            NumberClass::Float => Some(SyntaxKind::FLOAT_CONST),
            NumberClass::Double => Some(SyntaxKind::DOUBLE_CONST),
            NumberClass::Invalid => None,
        }
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn skip_while(bytes: &[u8], mut i: usize, pred: impl Fn(u8) -> bool) -> usize {
    while i < bytes.len() && pred(bytes[i]) {
        i += 1;
    }
    i
}

/// Scans the literal at the start of `text`, returning its byte length and
/// class. `text` must start with a digit or with `.` and a digit.
pub fn scan(text: &str) -> (usize, NumberClass) {
    let bytes = text.as_bytes();

    if bytes.len() >= 2 && bytes[0] == b'0' && matches!(bytes[1], b'x' | b'X') {
        let digits_end = skip_while(bytes, 2, |b| b.is_ascii_hexdigit());
        if digits_end == 2 {
            return finish_invalid(bytes, digits_end);
        }
        return finish_integer(bytes, digits_end, NumberClass::Int);
    }

    let int_end = skip_while(bytes, 0, |b| b.is_ascii_digit());
    let mut i = int_end;
    let mut is_float = false;

    if bytes.get(i) == Some(&b'.') {
        is_float = true;
        i = skip_while(bytes, i + 1, |b| b.is_ascii_digit());
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_end = skip_while(bytes, j, |b| b.is_ascii_digit());
        if exp_end == j {
            return finish_invalid(bytes, i);
        }
        is_float = true;
        i = exp_end;
    }

    if is_float {
        let rest = &bytes[i..];
        if rest.starts_with(b"lf") || rest.starts_with(b"LF") {
            return finish_suffixed(bytes, i + 2, NumberClass::Double);
        }
        if matches!(rest.first(), Some(b'f' | b'F')) {
            return finish_suffixed(bytes, i + 1, NumberClass::Float);
        }
        return finish_suffixed(bytes, i, NumberClass::Float);
    }

    let literal = &bytes[..int_end];
    if literal.len() > 1 && literal[0] == b'0' && literal.iter().any(|b| matches!(b, b'8' | b'9'))
    {
        return finish_invalid(bytes, int_end);
    }
    finish_integer(bytes, int_end, NumberClass::Int)
}

/// Applies an optional `u`/`U` suffix to an integer literal.
fn finish_integer(bytes: &[u8], end: usize, class: NumberClass) -> (usize, NumberClass) {
    if matches!(bytes.get(end), Some(b'u' | b'U')) {
        return finish_suffixed(bytes, end + 1, NumberClass::Uint);
    }
    finish_suffixed(bytes, end, class)
}

fn finish_suffixed(bytes: &[u8], end: usize, class: NumberClass) -> (usize, NumberClass) {
    if bytes.get(end).copied().is_some_and(is_ident_byte) {
        return finish_invalid(bytes, end);
    }
    (end, class)
}

/// Swallows the glued identifier tail so the whole run becomes one invalid
/// token.
fn finish_invalid(bytes: &[u8], end: usize) -> (usize, NumberClass) {
    let mut i = end;
    loop {
        i = skip_while(bytes, i, is_ident_byte);
        // keep exponent signs inside the run: `1e+x`
        if matches!(bytes.get(i), Some(b'+' | b'-'))
            && i > 0
            && matches!(bytes[i - 1], b'e' | b'E')
            && bytes.get(i + 1).copied().is_some_and(is_ident_byte)
        {
            i += 1;
            continue;
        }
        break;
    }
    (i, NumberClass::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 1, NumberClass::Int)]
    #[case("42", 2, NumberClass::Int)]
    #[case("42u", 3, NumberClass::Uint)]
    #[case("0777U", 5, NumberClass::Uint)]
    #[case("0x1F", 4, NumberClass::Int)]
    #[case("0XffU", 5, NumberClass::Uint)]
    #[case("1.0", 3, NumberClass::Float)]
    #[case(".5", 2, NumberClass::Float)]
    #[case("5.", 2, NumberClass::Float)]
    #[case("1e10", 4, NumberClass::Float)]
    #[case("1.5E-3f", 7, NumberClass::Float)]
    #[case("2.0lf", 5, NumberClass::Double)]
    #[case("2e3LF", 5, NumberClass::Double)]
    #[case("089", 3, NumberClass::Invalid)]
    #[case("0x", 2, NumberClass::Invalid)]
    #[case("1e", 2, NumberClass::Invalid)]
    #[case("12abc", 5, NumberClass::Invalid)]
    #[case("1f", 2, NumberClass::Invalid)]
    #[case("3.0fx", 5, NumberClass::Invalid)]
    fn classifies_literals(#[case] text: &str, #[case] len: usize, #[case] class: NumberClass) {
        assert_eq!(scan(text), (len, class));
    }

    #[test]
    fn stops_at_operators() {
        assert_eq!(scan("1+2"), (1, NumberClass::Int));
        assert_eq!(scan("1.0*x"), (3, NumberClass::Float));
        assert_eq!(scan("7u)"), (2, NumberClass::Uint));
    }
}
