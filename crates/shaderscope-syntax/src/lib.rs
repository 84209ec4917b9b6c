//! # shaderscope-syntax
//!
//! A trivia-preserving GLSL lexer, an error-tolerant parser with a
//! preprocessor-aware syntax tree, and a definition index, built for
//! editor tooling that reparses on every keystroke.
//!
//! ## What is kept
//!
//! Nothing in the source is discarded. Whitespace, comments and line
//! continuations ride along on the tokens as trivia, so the token stream
//! rebuilds the document byte for byte:
//!
//! ```
//! use shaderscope_syntax::lexer::{lex, reconstruct};
//!
//! let source = "float a; // gain\nvoid main() {}\n";
//! assert_eq!(reconstruct(&lex(source).tokens, source), source);
//! ```
//!
//! ## Architecture Overview
//!
//! ```text
//! Snapshot → Lexer → Tokens → Preprocessor → Parser → Events → Sink → SyntaxTree
//!           (Logos)           (#if model)   (Grammar)                 + Semantics
//! ```
//!
//! ### 1. Text ([`text`] module)
//!
//! The parser reads an immutable [`Snapshot`] of the document. Positions
//! in one snapshot are carried into later ones by tracking points and
//! spans; the `shaderscope-engine` crate supplies a rope-backed snapshot
//! whose tracking follows real edits.
//!
//! ### 2. Lexer ([`lexer`] module)
//!
//! [Logos] drives the raw scan. On top of it the lexer splices line
//! continuations, classifies numeric literals, keeps whole `#error` and
//! `#pragma` lines as one token and attaches trivia. A restart span lets
//! a caller relex from a line boundary only.
//!
//! ### 3. Preprocessor ([`preprocessor`] module)
//!
//! Conditional chains are evaluated against macros defined so far, the
//! predefined macros of the [`Settings`] and any branch the user forced.
//! Tokens of inactive branches never reach the grammar.
//!
//! ### 4. Parser ([`parser`] module)
//!
//! A marker-based recursive descent parser emitting events, replayed by
//! the sink into the arena [`SyntaxTree`]. It never fails: every input,
//! however broken, gives a tree covering every token, plus diagnostics.
//!
//! ### 5. Definitions ([`semantics`] module)
//!
//! After the tree is built, declared names are collected with their
//! scopes and every identifier reference is resolved, falling back to
//! the GLSL built-ins for the document's shader stage and profile.
//!
//! ## Quick Start
//!
//! ```
//! use shaderscope_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("uniform float gain;\nvoid main() { float g = gain; }\n");
//! assert!(tree.errors().is_empty());
//!
//! let reference = tree
//!     .root()
//!     .descendants()
//!     .find(|n| n.kind() == SyntaxKind::NAME_REF)
//!     .unwrap();
//! let definition = tree.find_definition(reference).unwrap();
//! assert_eq!(definition.signature(), "uniform float gain");
//! ```
//!
//! [Logos]: https://docs.rs/logos

pub mod error;
pub mod lexer;
pub mod parser;
pub mod preprocessor;
pub mod semantics;
pub mod settings;
pub mod span;
pub mod syntax_kind;
pub mod text;
pub mod token;
pub mod tree;

use std::sync::Arc;

pub use error::{LexError, LexErrorKind, SyntaxError};
pub use lexer::{LexResult, Lexer};
pub use preprocessor::IfPreprocessor;
pub use semantics::{Definition, DefinitionKind, Scope};
pub use settings::{Profile, ProfileKind, Settings, ShaderType};
pub use span::Span;
pub use syntax_kind::SyntaxKind;
pub use text::{
    SharedPoint, SharedSpan, Snapshot, SpanTrackingMode, StringSnapshot, TrackingMode,
    TrackingPoint, TrackingSpan,
};
pub use token::{Token, Trivia, TriviaKind, TriviaList};
pub use tree::{NodeId, SyntaxNode, SyntaxTree};

/// Parses `text` with default settings.
pub fn parse(text: &str) -> SyntaxTree {
    parse_with(text, &Settings::default())
}

/// Parses `text` as a one-off snapshot.
pub fn parse_with(text: &str, settings: &Settings) -> SyntaxTree {
    parse_snapshot(Arc::new(StringSnapshot::new(text)), settings)
}

/// Lexes and parses a whole snapshot.
pub fn parse_snapshot(snapshot: Arc<dyn Snapshot>, settings: &Settings) -> SyntaxTree {
    let lexed = Lexer::run(snapshot.as_ref(), None);
    parser::Parser::run(snapshot, lexed, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    #[test]
    fn snapshot_declaration_tree() {
        let tree = parse("int x;");
        assert_snapshot!(tree.debug_tree(), @r#"
        SOURCE_FILE@0..6
          VARIABLE_DECLARATION@0..6
            TYPE_SPECIFIER@0..3
              INT_KW@0..3 "int"
            DECLARATOR@4..5
              NAME@4..5
                IDENT@4..5 "x"
            SEMICOLON@5..6 ";"
          EOF@6..6 ""
        "#);
    }

    #[test]
    fn roundtrip_preserves_text() {
        let inputs = [
            "void main() {}\n",
            "  float x = 1.0;  // trailing\n",
            "/* header */\n#version 450 core\n",
            "#define LONG a + \\\n    b\n",
            "#if 0\nbroken ( code\n#endif\n",
            "vec4 c = vec4(1.0, 0.5e-3, 2u, 0x1F);\r\n",
            "}}}{{{ ;; ??",
            "",
        ];

        for input in inputs {
            let tree = parse(input);
            assert_eq!(tree.text(), input, "Roundtrip failed for: {:?}", input);
        }
    }

    #[test]
    fn settings_reach_the_tree() {
        let settings = Settings::new(ShaderType::COMPUTE, Profile::new(310, ProfileKind::Es));
        let tree = parse_with("void main() {}", &settings);
        assert_eq!(tree.settings().shader_type, ShaderType::COMPUTE);
        assert!(tree.profile().is_es());
    }
}
