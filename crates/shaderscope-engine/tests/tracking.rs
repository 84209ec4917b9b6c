use pretty_assertions::assert_eq;
use rstest::rstest;
use shaderscope_engine::Source;
use shaderscope_syntax::{
    DefinitionKind, Settings, Snapshot, Span, SpanTrackingMode, SyntaxKind, TrackingMode,
};

const DECLARATION: &str = "float gain = 1.0;";

enum Edit {
    Insert(usize, &'static str),
    Delete(usize, usize),
}

#[rstest]
#[case::insert_before(Edit::Insert(0, "const "), SpanTrackingMode::EdgeExclusive, "gain", Span::new(12, 16))]
#[case::insert_after(Edit::Insert(17, " // dB"), SpanTrackingMode::EdgeExclusive, "gain", Span::new(6, 10))]
#[case::insert_inside(Edit::Insert(8, "XX"), SpanTrackingMode::EdgeExclusive, "gaXXin", Span::new(6, 12))]
#[case::insert_at_start(Edit::Insert(6, "my"), SpanTrackingMode::EdgeExclusive, "gain", Span::new(8, 12))]
#[case::insert_at_end(Edit::Insert(10, "Db"), SpanTrackingMode::EdgeExclusive, "gain", Span::new(6, 10))]
#[case::insert_at_end_inclusive(Edit::Insert(10, "Boost"), SpanTrackingMode::EdgeInclusive, "gainBoost", Span::new(6, 15))]
#[case::delete_before(Edit::Delete(0, 6), SpanTrackingMode::EdgeExclusive, "gain", Span::new(0, 4))]
#[case::delete_around(Edit::Delete(4, 12), SpanTrackingMode::EdgeExclusive, "", Span::new(4, 4))]
fn spans_follow_edits(
    #[case] edit: Edit,
    #[case] mode: SpanTrackingMode,
    #[case] expected_text: &str,
    #[case] expected: Span,
) {
    let source = Source::new(DECLARATION, Settings::default());
    let tracked = source
        .snapshot()
        .create_tracking_span(Span::new(6, 10), mode);

    let edited = match edit {
        Edit::Insert(at, text) => source.insert(at, text),
        Edit::Delete(start, end) => source.delete(Span::new(start, end)),
    }
    .unwrap();

    let span = tracked.span(edited.as_ref());
    assert_eq!(span, expected);
    assert_eq!(edited.text(span), expected_text);
}

#[test]
fn points_from_newer_snapshots_map_back() {
    let source = Source::new(DECLARATION, Settings::default());
    let original = source.snapshot();
    source.insert(0, "const ").unwrap();
    let edited = source.insert(16, "Db").unwrap();

    // "const float gainDb = 1.0;": the `=` moved by eight bytes.
    let equals = edited.create_tracking_point(19, TrackingMode::Negative);
    assert_eq!(edited.text(Span::from_len(19, 1)), "=");
    assert_eq!(equals.position(original.as_ref()), 11);
    assert_eq!(original.text(Span::from_len(11, 1)), "=");
}

const SHADER: &str = "uniform float gain;\nvoid main() {\n    float g = gain;\n}\n";

#[test]
fn old_tree_answers_queries_about_new_text() {
    let source = Source::new(SHADER, Settings::default());
    let analysis = source.analysis().unwrap();
    let tree = analysis.tree();
    let edited = source.insert(0, "// header\n").unwrap();

    // `gain` inside main, in the edited text.
    let position = edited.as_str().rfind("gain").unwrap();
    assert_eq!(position, 58);
    let leaf = tree.node_at(edited.as_ref(), position).unwrap();
    assert_eq!(leaf.kind(), SyntaxKind::IDENT);

    let definition = tree.find_definition(leaf).unwrap();
    assert_eq!(definition.name, "gain");
    let declared = definition.span(edited.as_ref()).unwrap();
    assert_eq!(declared, Span::new(24, 28));
    assert_eq!(edited.text(declared), "gain");
}

#[test]
fn scopes_stretch_over_inserted_code() {
    let source = Source::new(SHADER, Settings::default());
    let analysis = source.analysis().unwrap();
    let tree = analysis.tree();
    source.insert(0, "// header\n").unwrap();
    let edited = source.insert(63, "\n    g *= 2.0;").unwrap();
    assert_eq!(
        edited.as_str(),
        "// header\nuniform float gain;\nvoid main() {\n    float g = gain;\n    g *= 2.0;\n}\n"
    );

    let new_use = edited.as_str().rfind("g *=").unwrap();
    let local = tree
        .definitions()
        .iter()
        .find(|d| d.name == "g")
        .unwrap();
    assert!(local.scope.contains(edited.as_ref(), new_use));

    let visible: Vec<&str> = tree
        .definitions_at(edited.as_ref(), new_use)
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert!(visible.contains(&"g"), "{visible:?}");
    assert!(visible.contains(&"gain"), "{visible:?}");
    assert!(visible.contains(&"main"), "{visible:?}");

    let reparsed = source.reparse();
    assert!(reparsed.errors().is_empty(), "{:?}", reparsed.errors());
    let leaf = reparsed
        .tree()
        .node_at(edited.as_ref(), new_use)
        .unwrap();
    assert_eq!(
        reparsed.tree().find_definition(leaf).unwrap().kind,
        DefinitionKind::LocalVariable
    );
}
