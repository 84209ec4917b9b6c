//! Definition records.

use std::fmt;

use crate::lexer::lex;
use crate::semantics::Scope;
use crate::settings::{Profile, ShaderType};
use crate::span::Span;
use crate::text::{SharedSpan, Snapshot};
use crate::token::{Token, TriviaKind};
use crate::tree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Function,
    TypeName,
    LocalVariable,
    GlobalVariable,
    Macro,
    Parameter,
    Field,
    InterfaceBlock,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DefinitionKind::Function => "function",
            DefinitionKind::TypeName => "type",
            DefinitionKind::LocalVariable => "local",
            DefinitionKind::GlobalVariable => "global",
            DefinitionKind::Macro => "macro",
            DefinitionKind::Parameter => "parameter",
            DefinitionKind::Field => "field",
            DefinitionKind::InterfaceBlock => "block",
        };
        f.write_str(name)
    }
}

/// One parameter of a function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub qualifiers: Vec<String>,
    pub type_name: String,
    pub name: Option<String>,
    pub array: Option<String>,
}

impl fmt::Display for ParameterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for qualifier in &self.qualifiers {
            write!(f, "{qualifier} ")?;
        }
        f.write_str(&self.type_name)?;
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        if let Some(array) = &self.array {
            f.write_str(array)?;
        }
        Ok(())
    }
}

/// Kind-specific structure of a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionDetail {
    Function {
        qualifiers: Vec<String>,
        return_type: String,
        parameters: Vec<ParameterInfo>,
        prototype: bool,
    },
    /// Variables, parameters and fields.
    Variable {
        qualifiers: Vec<String>,
        type_name: String,
        array: Option<String>,
    },
    TypeName {
        fields: Vec<String>,
    },
    InterfaceBlock {
        qualifiers: Vec<String>,
        fields: Vec<String>,
        instance: Option<String>,
    },
    Macro {
        /// `None` for object-like macros.
        parameters: Option<Vec<String>>,
        body: String,
    },
}

/// Where a built-in symbol exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub stages: ShaderType,
    /// First desktop version that has it.
    pub core: u32,
    /// First ES version that has it, if any.
    pub es: Option<u32>,
}

impl Availability {
    pub fn is_visible(&self, stages: ShaderType, profile: Profile) -> bool {
        if !self.stages.intersects(stages) {
            return false;
        }
        if profile.is_es() {
            self.es.is_some_and(|es| profile.version >= es)
        } else {
            profile.version >= self.core
        }
    }
}

/// A declared name.
#[derive(Debug, Clone)]
pub struct Definition {
    pub name: String,
    pub kind: DefinitionKind,
    pub scope: Scope,
    /// Comments directly above the declaration, markers stripped.
    pub documentation: Option<String>,
    /// Span of the declared name. `None` for built-ins.
    pub span: Option<SharedSpan>,
    /// The `NAME` node in the tree the definition came from.
    pub name_node: Option<NodeId>,
    /// The declaring node (function, declaration, parameter, ...).
    pub declaration: Option<NodeId>,
    pub detail: DefinitionDetail,
    /// Set on built-ins only.
    pub availability: Option<Availability>,
    /// Name offset in the defining snapshot, for ordering.
    pub(crate) offset: usize,
}

impl Definition {
    pub fn is_builtin(&self) -> bool {
        self.scope.is_builtin()
    }

    /// The name's span in `snapshot`.
    pub fn span(&self, snapshot: &dyn Snapshot) -> Option<Span> {
        self.span.as_ref().map(|s| s.span(snapshot))
    }

    /// The declaration as a one-line signature, `vec4 shade(in vec3 n)`.
    pub fn signature(&self) -> String {
        fn prefix(qualifiers: &[String]) -> String {
            qualifiers.iter().map(|q| format!("{q} ")).collect()
        }
        match &self.detail {
            DefinitionDetail::Function {
                qualifiers,
                return_type,
                parameters,
                ..
            } => {
                let params: Vec<String> = parameters.iter().map(ToString::to_string).collect();
                format!(
                    "{}{return_type} {}({})",
                    prefix(qualifiers),
                    self.name,
                    params.join(", ")
                )
            }
            DefinitionDetail::Variable {
                qualifiers,
                type_name,
                array,
            } => format!(
                "{}{type_name} {}{}",
                prefix(qualifiers),
                self.name,
                array.as_deref().unwrap_or_default()
            ),
            DefinitionDetail::TypeName { .. } => format!("struct {}", self.name),
            DefinitionDetail::InterfaceBlock { qualifiers, .. } => {
                format!("{}{}", prefix(qualifiers), self.name)
            }
            DefinitionDetail::Macro { parameters, body } => {
                let mut out = format!("#define {}", self.name);
                if let Some(parameters) = parameters {
                    out.push('(');
                    out.push_str(&parameters.join(", "));
                    out.push(')');
                }
                if !body.is_empty() {
                    out.push(' ');
                    out.push_str(body);
                }
                out
            }
        }
    }

    /// The signature as tokens, for colored display.
    pub fn tokens(&self) -> Vec<Token> {
        let mut tokens = lex(&self.signature()).tokens;
        tokens.retain(|t| !t.is_eof());
        tokens
    }
}

/// The comment block directly above `token`: the comments in its leading
/// trivia that are not separated from it by a blank line.
pub(crate) fn documentation(token: &Token) -> Option<String> {
    let trivia = token.leading_trivia.as_ref()?;
    let mut lines = Vec::new();
    let mut newlines = 0;
    for item in trivia.iter().rev() {
        match item.kind {
            TriviaKind::Newline => {
                newlines += 1;
                if newlines > 1 {
                    break;
                }
            }
            TriviaKind::LineComment => {
                newlines = 0;
                lines.push(item.text.trim_start_matches('/').trim().to_string());
            }
            TriviaKind::BlockComment => {
                newlines = 0;
                let inner = item.text.trim_start_matches("/*").trim_end_matches("*/");
                let block: Vec<&str> = inner
                    .lines()
                    .map(|l| l.trim().trim_start_matches('*').trim())
                    .filter(|l| !l.is_empty())
                    .collect();
                for line in block.into_iter().rev() {
                    lines.push(line.to_string());
                }
            }
            TriviaKind::Whitespace | TriviaKind::LineContinuation => {}
        }
    }
    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ProfileKind;
    use crate::syntax_kind::SyntaxKind;
    use pretty_assertions::assert_eq;

    fn leading_of_last_token(source: &str) -> Option<String> {
        let tokens = lex(source).tokens;
        let token = tokens.iter().rev().find(|t| !t.is_eof()).unwrap();
        documentation(token)
    }

    #[test]
    fn documentation_takes_adjacent_comments() {
        assert_eq!(
            leading_of_last_token("// unrelated\n\n// Light count.\n// Max 8.\nx"),
            Some("Light count.\nMax 8.".to_string())
        );
        assert_eq!(
            leading_of_last_token("/**\n * Fog density.\n */\nx"),
            Some("Fog density.".to_string())
        );
        assert_eq!(leading_of_last_token("// far away\n\nx"), None);
    }

    #[test]
    fn availability_checks_stage_and_version() {
        let availability = Availability {
            stages: ShaderType::FRAGMENT,
            core: 130,
            es: Some(300),
        };
        let core = Profile::new(450, ProfileKind::Core);
        assert!(availability.is_visible(ShaderType::FRAGMENT, core));
        assert!(!availability.is_visible(ShaderType::VERTEX, core));
        assert!(!availability.is_visible(
            ShaderType::FRAGMENT,
            Profile::new(120, ProfileKind::Core)
        ));
        assert!(!availability.is_visible(
            ShaderType::FRAGMENT,
            Profile::new(100, ProfileKind::Es)
        ));
    }

    #[test]
    fn macro_signature_and_tokens() {
        let definition = Definition {
            name: "SQR".to_string(),
            kind: DefinitionKind::Macro,
            scope: Scope::Document,
            documentation: None,
            span: None,
            name_node: None,
            declaration: None,
            detail: DefinitionDetail::Macro {
                parameters: Some(vec!["x".to_string()]),
                body: "((x) * (x))".to_string(),
            },
            availability: None,
            offset: 0,
        };
        assert_eq!(definition.signature(), "#define SQR(x) ((x) * (x))");
        let kinds: Vec<_> = definition.tokens().iter().take(3).map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![SyntaxKind::PP_DEFINE, SyntaxKind::IDENT, SyntaxKind::L_PAREN]
        );
    }
}
