use pretty_assertions::assert_eq;
use rstest::rstest;
use shaderscope_syntax::{
    Settings, Snapshot, StringSnapshot, SyntaxKind, SyntaxNode, SyntaxTree, parse, parse_with,
};

const LIGHTING: &str = include_str!("fixtures/lighting.frag");

/// Structural checks that hold for every tree, however broken the input.
fn assert_well_formed(tree: &SyntaxTree, input: &str) {
    assert_eq!(tree.text(), input);
    let root = tree.root();
    assert_eq!(root.span().start(), 0);
    assert_eq!(root.span().end(), input.len());
    for index in 0..tree.tokens().len() {
        let leaf = tree.token_node(index).unwrap();
        assert_eq!(leaf.token_index(), Some(index));
    }
    for node in root.descendants() {
        if let Some(parent) = node.parent() {
            assert!(
                parent.span().contains_span(node.span()),
                "{node:?} escapes {parent:?}"
            );
        }
    }
}

fn root_kinds(tree: &SyntaxTree) -> Vec<SyntaxKind> {
    tree.root().children().map(|n| n.kind()).collect()
}

#[test]
fn fixture_parses_cleanly() {
    let tree = parse(LIGHTING);
    assert!(tree.errors().is_empty(), "{:?}", tree.errors());
    assert_well_formed(&tree, LIGHTING);
    let functions: Vec<&str> = tree
        .root()
        .children_of_kind(SyntaxKind::FUNCTION_DEFINITION)
        .filter_map(|f| f.child_of_kind(SyntaxKind::NAME))
        .map(|n| n.first_token().unwrap().text.as_str())
        .collect();
    assert_eq!(functions, vec!["attenuation", "shade", "main"]);
}

#[test]
fn inactive_branch_is_excluded_code() {
    let tree = parse(LIGHTING);
    let excluded: Vec<_> = tree
        .root()
        .descendants()
        .filter(|n| n.kind() == SyntaxKind::EXCLUDED_CODE)
        .collect();
    assert_eq!(excluded.len(), 1);
    assert_eq!(excluded[0].text(), "fragColor = vec4(n * 0.5 + 0.5, 1.0);");
    let position = LIGHTING.find("n * 0.5").unwrap();
    assert!(tree.is_excluded(position));
    assert!(!tree.is_excluded(LIGHTING.find("texture(").unwrap()));
}

#[test]
fn defined_macro_flips_the_branch() {
    let settings = Settings::default().with_macros(["DEBUG_NORMALS"]);
    let tree = parse_with(LIGHTING, &settings);
    assert!(tree.errors().is_empty(), "{:?}", tree.errors());
    assert!(tree.is_excluded(LIGHTING.find("texture(").unwrap()));
    assert_eq!(tree.preprocessors()[0].values(), vec![true, false]);
}

#[rstest]
#[case("#if 1\na;\n#else\nb;\n#endif\n")]
#[case("#if 0\na;\n#elif 2 > 1\nb;\n#elif 1\nc;\n#else\nd;\n#endif\n")]
#[case("#ifndef GUARD\n#define GUARD\n#ifdef GUARD\nx;\n#else\ny;\n#endif\n#endif\n")]
#[case("#if defined(NOPE) || 0\na;\n#else\n#if 0\nb;\n#else\nc;\n#endif\n#endif\n")]
fn if_else_chains_have_one_live_branch(#[case] source: &str) {
    let tree = parse(source);
    for chain in tree.preprocessors() {
        let live = chain.values().iter().filter(|v| **v).count();
        let has_else = chain.branches().any(|b| b.kind == SyntaxKind::PP_ELSE);
        let in_live_code = tree
            .directives()
            .iter()
            .any(|line| line.tokens.start == chain.head.keyword && line.active);
        if has_else && in_live_code {
            assert_eq!(live, 1, "{chain:?}");
        } else {
            assert!(live <= 1, "{chain:?}");
        }
    }
}

#[test]
fn missing_semicolon_recovers_at_brace() {
    let source = "void main() { float x = ; x = 1.0 }\nvec4 y;\n";
    let tree = parse(source);
    assert!(!tree.errors().is_empty());
    assert_eq!(
        root_kinds(&tree),
        vec![
            SyntaxKind::FUNCTION_DEFINITION,
            SyntaxKind::VARIABLE_DECLARATION,
            SyntaxKind::EOF
        ]
    );
    assert_well_formed(&tree, source);
}

#[test]
fn errors_are_sorted_and_inside_the_document() {
    let source = "float = ;\nvoid f( { return }\n#endif\nint 9x;\n";
    let tree = parse(source);
    let errors = tree.errors();
    assert!(errors.len() >= 3, "{errors:?}");
    for pair in errors.windows(2) {
        assert!(pair[0].span.start() <= pair[1].span.start());
    }
    for error in errors {
        assert!(error.span.end() <= source.len());
    }
    assert_well_formed(&tree, source);
}

#[test]
fn node_at_position_in_newer_snapshot_of_same_version() {
    let tree = parse(LIGHTING);
    let snapshot = StringSnapshot::new(LIGHTING);
    let position = LIGHTING.find("lambert =").unwrap();
    let leaf = tree.node_at(&snapshot, position).unwrap();
    assert_eq!(leaf.kind(), SyntaxKind::IDENT);
    let kinds: Vec<SyntaxKind> = leaf.ancestors().map(|n| n.kind()).collect();
    assert!(kinds.contains(&SyntaxKind::DECLARATOR));
    assert!(kinds.contains(&SyntaxKind::FUNCTION_DEFINITION));
    assert_eq!(snapshot.text(leaf.span()), "lambert");
}

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as usize
    }
}

const FRAGMENTS: &[&str] = &[
    "float", "vec4", "x", "y", "main", "(", ")", "{", "}", "[", "]", ";", ",", "=", "+=", "?",
    ":", ".", "1", "2.5", "0x", "struct", "uniform", "layout", "in", "out", "return", "if",
    "else", "for", "while", "do", "switch", "case", "default", "break", "discard", "precision",
    "highp", "\n", " ", "\t", "/*", "*/", "//", "\\\n", "#define", "#if 1", "#else", "#endif",
    "#ifdef A", "#elif", "#version 300 es", "#extension X : enable", "#", "@", "\"", "++",
];

#[test]
fn parsing_terminates_on_arbitrary_input() {
    let mut rng = Lcg(0x5eed);
    for _ in 0..300 {
        let len = rng.next() % 60;
        let mut source = String::new();
        for _ in 0..len {
            source.push_str(FRAGMENTS[rng.next() % FRAGMENTS.len()]);
            if rng.next() % 3 == 0 {
                source.push(' ');
            }
        }
        let tree = parse(&source);
        assert_well_formed(&tree, &source);
    }
}

#[test]
fn excluded_nodes_hold_only_tokens() {
    let tree = parse(LIGHTING);
    let excluded = tree
        .root()
        .descendants()
        .find(|n: &SyntaxNode<'_>| n.kind() == SyntaxKind::EXCLUDED_CODE)
        .unwrap();
    assert!(excluded.children().all(|c| c.is_token()));
    assert!(excluded.children().all(|c| c.is_excluded()));
}
