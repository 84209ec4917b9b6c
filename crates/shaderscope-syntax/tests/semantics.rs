use pretty_assertions::assert_eq;
use shaderscope_syntax::semantics::DefinitionDetail;
use shaderscope_syntax::{DefinitionKind, Scope, Span, SyntaxKind, SyntaxNode, SyntaxTree, parse};

const LIGHTING: &str = include_str!("fixtures/lighting.frag");

fn references(tree: &SyntaxTree) -> impl Iterator<Item = SyntaxNode<'_>> {
    tree.root()
        .descendants()
        .filter(|n| n.kind() == SyntaxKind::NAME_REF)
}

fn in_directive(node: SyntaxNode<'_>) -> bool {
    node.ancestors()
        .any(|n| n.kind() == SyntaxKind::CONDITIONAL_DIRECTIVE)
}

#[test]
fn every_code_reference_resolves() {
    let tree = parse(LIGHTING);
    let unresolved: Vec<String> = references(&tree)
        .filter(|n| !in_directive(*n))
        .filter(|n| tree.find_definition(*n).is_none())
        .map(|n| n.text().into_owned())
        .collect();
    assert_eq!(unresolved, Vec::<String>::new());
}

#[test]
fn references_lie_inside_their_definition_scope() {
    let tree = parse(LIGHTING);
    let snapshot = tree.snapshot().as_ref();
    for reference in references(&tree) {
        let Some(definition) = tree.find_definition(reference) else {
            continue;
        };
        // Members of anonymous blocks are reachable from anywhere.
        if definition.kind == DefinitionKind::Field {
            continue;
        }
        assert!(
            definition.scope.contains(snapshot, reference.span().start()),
            "{} at {} outside {:?}",
            definition.name,
            reference.span(),
            definition.scope.span(snapshot)
        );
        if let Some(span) = definition.span(snapshot) {
            assert!(definition.scope.contains(snapshot, span.start()));
        }
    }
}

#[test]
fn block_scopes_nest_or_are_disjoint() {
    let tree = parse(LIGHTING);
    let snapshot = tree.snapshot().as_ref();
    let spans: Vec<Span> = tree
        .definitions()
        .iter()
        .filter(|d| matches!(d.scope, Scope::Block { .. }))
        .filter_map(|d| d.scope.span(snapshot))
        .collect();
    assert!(!spans.is_empty());
    for a in &spans {
        for b in &spans {
            let nested = a.contains_span(*b) || b.contains_span(*a);
            let disjoint = a.intersection(*b).is_none_or(|i| i.is_empty());
            assert!(nested || disjoint, "{a} and {b} overlap");
        }
    }
}

#[test]
fn outline_of_the_fixture() {
    let tree = parse(LIGHTING);
    let outline: Vec<(DefinitionKind, &str)> = tree
        .definitions()
        .iter()
        .filter(|d| matches!(d.scope, Scope::Document))
        .map(|d| (d.kind, d.name.as_str()))
        .collect();
    assert_eq!(
        outline,
        vec![
            (DefinitionKind::Macro, "MAX_LIGHTS"),
            (DefinitionKind::Macro, "SQR"),
            (DefinitionKind::TypeName, "Light"),
            (DefinitionKind::InterfaceBlock, "Lights"),
            (DefinitionKind::GlobalVariable, "vPosition"),
            (DefinitionKind::GlobalVariable, "vNormal"),
            (DefinitionKind::GlobalVariable, "vUv"),
            (DefinitionKind::GlobalVariable, "fragColor"),
            (DefinitionKind::GlobalVariable, "albedo"),
            (DefinitionKind::Function, "attenuation"),
            (DefinitionKind::Function, "shade"),
            (DefinitionKind::Function, "main"),
        ]
    );
}

#[test]
fn quick_info_for_a_call() {
    let tree = parse(LIGHTING);
    let snapshot = tree.snapshot().as_ref();
    let call = LIGHTING.find("attenuation(d").unwrap();
    let definition = tree.definition_at(snapshot, call).unwrap();
    assert_eq!(definition.kind, DefinitionKind::Function);
    assert_eq!(
        definition.signature(),
        "float attenuation(float distance, float radius)"
    );
    assert_eq!(
        definition.documentation.as_deref(),
        Some("Smooth falloff to zero at the light's radius.")
    );
    assert_eq!(tree.references(definition).len(), 1);
    let declared = definition.span(snapshot).unwrap();
    assert_eq!(snapshot.text(declared), "attenuation");
}

#[test]
fn struct_and_block_details() {
    let tree = parse(LIGHTING);
    let light = tree
        .definitions()
        .iter()
        .find(|d| d.name == "Light")
        .unwrap();
    assert_eq!(light.documentation.as_deref(), Some("One light in the scene."));
    assert_eq!(
        light.detail,
        DefinitionDetail::TypeName {
            fields: vec![
                "position".to_string(),
                "color".to_string(),
                "radius".to_string()
            ]
        }
    );
    let block = tree
        .definitions()
        .iter()
        .find(|d| d.kind == DefinitionKind::InterfaceBlock)
        .unwrap();
    assert_eq!(
        block.signature(),
        "layout(std140, binding = 0) uniform Lights"
    );
}

#[test]
fn parameter_shadows_builtin() {
    let tree = parse(LIGHTING);
    let inside = LIGHTING.find("distance / radius").unwrap();
    let definition = tree
        .definition_at(tree.snapshot().as_ref(), inside)
        .unwrap();
    assert_eq!(definition.kind, DefinitionKind::Parameter);
    assert!(!definition.is_builtin());

    let length_call = LIGHTING.find("length(toLight)").unwrap();
    let builtin = tree
        .definition_at(tree.snapshot().as_ref(), length_call)
        .unwrap();
    assert!(builtin.is_builtin());
}
