//! Catalog fixtures shared by the engine's own tests and downstream
//! crates (enable the `testing` feature).

use mapgen_model::{Builtins, Member, TypeCatalog, TypeDescriptor, TypeRef};

/// A small domain model: `Person`/`Address` mapping onto flattened DTOs.
pub struct PersonFixture {
    pub catalog: TypeCatalog,
    pub builtins: Builtins,
    pub address: TypeRef,
    pub person: TypeRef,
    pub person_dto: TypeRef,
}

/// Build the person fixture. `PersonDto.AddressCity` only matches through
/// flattening, and `Person.Address` is nullable.
pub fn person_fixture() -> PersonFixture {
    let (mut catalog, builtins) = TypeCatalog::with_builtins();
    let string = TypeRef::non_null(builtins.string);
    let int = TypeRef::non_null(builtins.i32);

    let address = catalog
        .insert(
            TypeDescriptor::object("Address")
                .member(Member::new("City", string))
                .member(Member::new("Zip", string)),
        )
        .map(TypeRef::non_null)
        .expect("fixture names are unique");
    let person = catalog
        .insert(
            TypeDescriptor::object("Person")
                .member(Member::new("Name", string))
                .member(Member::new("Age", int))
                .member(Member::new("Address", address.as_nullable())),
        )
        .map(TypeRef::non_null)
        .expect("fixture names are unique");
    let person_dto = catalog
        .insert(
            TypeDescriptor::object("PersonDto")
                .member(Member::new("Name", string))
                .member(Member::new("Age", TypeRef::non_null(builtins.i64)))
                .member(Member::new("AddressCity", TypeRef::nullable(builtins.string))),
        )
        .map(TypeRef::non_null)
        .expect("fixture names are unique");

    PersonFixture {
        catalog,
        builtins,
        address,
        person,
        person_dto,
    }
}

/// A self-referential node graph: `Node.Parent` points back at `Node`.
pub struct NodeFixture {
    pub catalog: TypeCatalog,
    pub builtins: Builtins,
    pub node: TypeRef,
    pub node_dto: TypeRef,
}

pub fn node_fixture() -> NodeFixture {
    let (mut catalog, builtins) = TypeCatalog::with_builtins();
    let int = TypeRef::non_null(builtins.i32);

    let node = catalog
        .insert(TypeDescriptor::object("Node").member(Member::new("Value", int)))
        .expect("fixture names are unique");
    let node_dto = catalog
        .insert(TypeDescriptor::object("NodeDto").member(Member::new("Value", int)))
        .expect("fixture names are unique");
    // close the cycles now that both ids exist
    let parent = Member::new("Parent", TypeRef::nullable(node));
    let parent_dto = Member::new("Parent", TypeRef::nullable(node_dto));
    catalog.add_member(node, parent);
    catalog.add_member(node_dto, parent_dto);

    NodeFixture {
        catalog,
        builtins,
        node: TypeRef::non_null(node),
        node_dto: TypeRef::non_null(node_dto),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_well_formed() {
        let fixture = person_fixture();
        assert!(fixture.catalog.member(fixture.person.id, "Address").is_some());

        let nodes = node_fixture();
        let parent = nodes.catalog.member(nodes.node.id, "Parent").unwrap();
        assert_eq!(parent.ty.id, nodes.node.id);
        assert!(parent.ty.nullable);
    }
}
