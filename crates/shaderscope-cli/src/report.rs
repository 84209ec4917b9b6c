//! Plain-text renderings of an analysis.

use std::fmt::Write;

use shaderscope_syntax::{Definition, Scope, Snapshot, SyntaxTree};

/// One-based `line:column` of a byte offset.
pub fn line_col(snapshot: &dyn Snapshot, position: usize) -> (usize, usize) {
    let line = snapshot.line_from_position(position);
    (
        line.line_number + 1,
        position.saturating_sub(line.span.start()) + 1,
    )
}

/// Byte offset of a one-based `line:column`, if the line exists.
pub fn position_of(snapshot: &dyn Snapshot, line: usize, column: usize) -> Option<usize> {
    let source_line = snapshot.line_from_line_number(line.checked_sub(1)?)?;
    let offset = column.saturating_sub(1).min(source_line.content().len());
    Some(source_line.span.start() + offset)
}

pub fn tokens(tree: &SyntaxTree) -> String {
    let snapshot = tree.snapshot().as_ref();
    let mut out = String::new();
    for token in tree.tokens() {
        let (line, col) = line_col(snapshot, token.span.start());
        let _ = write!(out, "{line}:{col} {:?} {:?}", token.kind, token.text);
        if let Some(error) = &token.error {
            let _ = write!(out, " ({error})");
        }
        out.push('\n');
    }
    out
}

pub fn outline(tree: &SyntaxTree) -> String {
    let snapshot = tree.snapshot().as_ref();
    let mut out = String::new();
    for definition in tree.definitions() {
        let depth = match definition.scope {
            Scope::Document | Scope::BuiltIn => 0,
            Scope::Block { .. } => 1,
        };
        let (line, col) = definition
            .span(snapshot)
            .map(|span| line_col(snapshot, span.start()))
            .unwrap_or((0, 0));
        let _ = writeln!(
            out,
            "{}{line}:{col} {} {}",
            "  ".repeat(depth),
            definition.kind,
            definition.signature()
        );
    }
    out
}

pub fn diagnostics(tree: &SyntaxTree, name: &str) -> String {
    let snapshot = tree.snapshot().as_ref();
    let mut out = String::new();
    for error in tree.errors() {
        let (line, col) = line_col(snapshot, error.span.start());
        let _ = writeln!(out, "{name}:{line}:{col}: error: {}", error.message);
    }
    let _ = writeln!(
        out,
        "{} error(s), {} excluded region(s), profile {}",
        tree.errors().len(),
        tree.excluded_spans().len(),
        tree.profile()
    );
    out
}

/// What sits at `position`: the node path and, for a name, its definition.
pub fn locate(tree: &SyntaxTree, position: usize) -> String {
    let snapshot = tree.snapshot().as_ref();
    let mut out = String::new();
    let Some(node) = tree.node_at(snapshot, position) else {
        return "nothing here\n".to_string();
    };
    let mut path: Vec<String> = node.ancestors().map(|n| format!("{:?}", n.kind())).collect();
    path.reverse();
    let _ = writeln!(out, "{}", path.join(" > "));
    if tree.is_excluded(position) {
        out.push_str("in an inactive preprocessor branch\n");
    }
    match tree.find_definition(node) {
        Some(definition) => describe(&mut out, tree, definition),
        None => out.push_str("no definition\n"),
    }
    out
}

fn describe(out: &mut String, tree: &SyntaxTree, definition: &Definition) {
    let snapshot = tree.snapshot().as_ref();
    let _ = writeln!(out, "{}: {}", definition.kind, definition.signature());
    if let Some(docs) = &definition.documentation {
        for line in docs.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
    if definition.is_builtin() {
        out.push_str("built in\n");
        return;
    }
    if let Some(span) = definition.span(snapshot) {
        let (line, col) = line_col(snapshot, span.start());
        let _ = writeln!(out, "declared at {line}:{col}");
    }
    let _ = writeln!(out, "{} reference(s)", tree.references(definition).len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shaderscope_syntax::{StringSnapshot, parse};

    const SHADER: &str = "\
#version 330 core
// Output colour.
out vec4 color;
void main() {
    float k = 0.5;
    color = vec4(k);
}
";

    #[test]
    fn positions_round_trip() {
        let snapshot = StringSnapshot::new(SHADER);
        let position = SHADER.find("k = 0.5").unwrap();
        let (line, col) = line_col(&snapshot, position);
        assert_eq!((line, col), (5, 11));
        assert_eq!(position_of(&snapshot, line, col), Some(position));
        assert_eq!(position_of(&snapshot, 0, 1), None);
        assert_eq!(position_of(&snapshot, 99, 1), None);
    }

    #[test]
    fn column_past_the_line_end_clamps() {
        let snapshot = StringSnapshot::new(SHADER);
        let end_of_first_line = "#version 330 core".len();
        assert_eq!(position_of(&snapshot, 1, 500), Some(end_of_first_line));
    }

    #[test]
    fn outline_lists_declarations_with_locals_indented() {
        let text = outline(&parse(SHADER));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "3:10 global out vec4 color");
        assert!(lines.contains(&"4:6 function void main()"), "{text}");
        assert!(lines.contains(&"  5:11 local float k"), "{text}");
    }

    #[test]
    fn tokens_show_position_kind_and_text() {
        let text = tokens(&parse("int x;"));
        assert_eq!(
            text,
            "1:1 INT_KW \"int\"\n1:5 IDENT \"x\"\n1:6 SEMICOLON \";\"\n1:7 EOF \"\"\n"
        );
    }

    #[test]
    fn diagnostics_end_with_a_summary() {
        let text = diagnostics(&parse("void main() { float = 1.0; }"), "broken.frag");
        assert!(text.starts_with("broken.frag:1:"), "{text}");
        assert!(text.contains(": error: "), "{text}");
        assert!(text.ends_with("excluded region(s), profile 450 core\n"), "{text}");

        let clean = diagnostics(&parse(SHADER), "ok.frag");
        assert!(clean.starts_with("0 error(s), 0 excluded region(s)"), "{clean}");
    }

    #[test]
    fn locate_resolves_names() {
        let tree = parse(SHADER);
        let position = SHADER.rfind("color").unwrap();
        let text = locate(&tree, position);
        assert!(text.starts_with("SOURCE_FILE > "), "{text}");
        assert!(text.lines().next().unwrap().ends_with("IDENT"), "{text}");
        assert!(text.contains("global: out vec4 color\n"), "{text}");
        assert!(text.contains("  Output colour.\n"), "{text}");
        assert!(text.contains("declared at 3:10\n"), "{text}");
        assert!(text.contains("1 reference(s)\n"), "{text}");

        let builtin = locate(&parse("void main() { gl_Position = vec4(0.0); }"), 15);
        assert!(builtin.contains("built in\n"), "{builtin}");
    }
}
