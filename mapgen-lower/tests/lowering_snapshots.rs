//! End-to-end lowering: declarations resolve to plans, plans lower to
//! statements, statements render to stable preview text.

use mapgen_engine::testing::{node_fixture, person_fixture};
use mapgen_engine::{ConfigDelta, EnumStrategy, MappingDeclaration, resolve};
use mapgen_lower::{RenderOptions, lower_method, render_method};
use mapgen_model::{TypeCatalog, TypeDescriptor, TypeRef};

#[test]
fn test_lowers_person_construction() {
    let fixture = person_fixture();
    let resolution = resolve(
        &fixture.catalog,
        vec![MappingDeclaration::new(
            "map_person",
            fixture.person,
            fixture.person_dto,
        )],
    );
    assert!(!resolution.has_errors());

    let method = resolution.method("map_person").unwrap();
    let lowered = lower_method(&fixture.catalog, method).unwrap();
    let text = render_method(&lowered, &RenderOptions::default());
    insta::assert_snapshot!("person_construction", text.trim_end());
}

#[test]
fn test_lowers_null_mismatch_guard() {
    let (catalog, builtins) = TypeCatalog::with_builtins();
    let resolution = resolve(
        &catalog,
        vec![MappingDeclaration::new(
            "narrow",
            TypeRef::nullable(builtins.i32),
            TypeRef::non_null(builtins.i32),
        )],
    );
    // the implicit throw is surfaced as a warning, not an error
    assert!(!resolution.has_errors());
    assert!(!resolution.diagnostics.is_empty());

    let method = resolution.method("narrow").unwrap();
    let lowered = lower_method(&catalog, method).unwrap();
    let text = render_method(&lowered, &RenderOptions::default());
    insta::assert_snapshot!("null_mismatch_guard", text.trim_end());
}

#[test]
fn test_lowers_enum_by_name_switch() {
    let (mut catalog, builtins) = TypeCatalog::with_builtins();
    let status = catalog
        .insert(TypeDescriptor::enumeration(
            "Status",
            builtins.i32,
            vec![("Active", 0), ("Inactive", 1)],
        ))
        .map(TypeRef::non_null)
        .unwrap();
    let status_dto = catalog
        .insert(TypeDescriptor::enumeration(
            "StatusDto",
            builtins.i32,
            vec![("Active", 0), ("Inactive", 1)],
        ))
        .map(TypeRef::non_null)
        .unwrap();

    let declaration = MappingDeclaration::new("map_status", status, status_dto).with_config(
        ConfigDelta {
            enum_strategy: Some(EnumStrategy::ByName),
            ..Default::default()
        },
    );
    let resolution = resolve(&catalog, vec![declaration]);
    assert!(!resolution.has_errors());

    let method = resolution.method("map_status").unwrap();
    let lowered = lower_method(&catalog, method).unwrap();
    let text = render_method(&lowered, &RenderOptions::default());
    insta::assert_snapshot!("enum_by_name_switch", text.trim_end());
}

#[test]
fn test_cyclic_graph_lowers_to_self_delegation() {
    let fixture = node_fixture();
    let resolution = resolve(
        &fixture.catalog,
        vec![MappingDeclaration::new(
            "map_node",
            fixture.node,
            fixture.node_dto,
        )],
    );
    assert!(!resolution.has_errors());
    assert_eq!(resolution.methods.len(), 1);

    let method = resolution.method("map_node").unwrap();
    let lowered = lower_method(&fixture.catalog, method).unwrap();
    let text = render_method(&lowered, &RenderOptions::default());
    assert!(text.contains("let result = new NodeDto();"));
    assert!(text.contains("result.Value = source.Value;"));
    assert!(text.contains(
        "result.Parent = source.Parent == null ? null : Mapper.map_node(source.Parent);"
    ));
}
