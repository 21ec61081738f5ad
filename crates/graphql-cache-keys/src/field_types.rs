use std::collections::{HashMap, HashSet};

use graphql_parser::schema::{Definition, Document, Field, Type, TypeDefinition, TypeExtension};

use crate::Error;

const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// The innermost named type of a type reference, with all list and non-null wrappers removed:
/// `[Post!]!` resolves to `Post`.
pub fn named_type<'a>(ty: &Type<'a, &'a str>) -> &'a str {
    match ty {
        Type::NamedType(name) => *name,
        Type::ListType(inner) | Type::NonNullType(inner) => named_type(inner),
    }
}

/// How the walker resolves the type returned by a selected field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
pub enum Lookup {
    /// By field name alone. When two object types declare a field with the same name but
    /// different return types, the declaration that comes last in the schema wins everywhere.
    #[serde(rename = "field-name")]
    ByFieldName,
    /// By the enclosing type and field name, falling back to the field name alone when the
    /// enclosing type is unknown or does not declare the field.
    #[default]
    #[serde(rename = "parent-type")]
    ByParentType,
}

/// Names of the root operation types.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RootTypes {
    query: String,
    mutation: String,
    subscription: String,
}

impl Default for RootTypes {
    fn default() -> Self {
        Self {
            query: String::from("Query"),
            mutation: String::from("Mutation"),
            subscription: String::from("Subscription"),
        }
    }
}

/// The three kinds of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

/// Maps the fields declared on object types to the object type they return. Fields returning
/// built-in or custom scalars are left out: only object selections need key fields.
#[derive(Debug, Clone, Default)]
pub struct FieldTypeIndex {
    /// field name -> object type name
    by_field: HashMap<String, String>,
    /// parent type name -> field name -> object type name
    by_parent: HashMap<String, HashMap<String, String>>,
    roots: RootTypes,
    lookup: Lookup,
}

impl FieldTypeIndex {
    /// Parses the schema SDL and indexes it.
    pub fn from_sdl(sdl: &str) -> Result<Self, Error> {
        let document = graphql_parser::parse_schema::<&str>(sdl)?;

        Ok(Self::from_document(&document))
    }

    /// Indexes an already parsed schema.
    pub fn from_document<'a>(document: &Document<'a, &'a str>) -> Self {
        let mut index = Self::default();

        // Custom scalars can be declared after the types using them, so they are all collected
        // before any field is looked at.
        let mut scalars: HashSet<&str> = BUILTIN_SCALARS.into_iter().collect();

        for definition in &document.definitions {
            match definition {
                Definition::TypeDefinition(TypeDefinition::Scalar(scalar)) => {
                    scalars.insert(scalar.name);
                }
                Definition::TypeExtension(TypeExtension::Scalar(scalar)) => {
                    scalars.insert(scalar.name);
                }
                Definition::SchemaDefinition(schema) => {
                    if let Some(query) = schema.query {
                        index.roots.query = query.to_owned();
                    }
                    if let Some(mutation) = schema.mutation {
                        index.roots.mutation = mutation.to_owned();
                    }
                    if let Some(subscription) = schema.subscription {
                        index.roots.subscription = subscription.to_owned();
                    }
                }
                _ => (),
            }
        }

        for definition in &document.definitions {
            let (type_name, fields) = match definition {
                Definition::TypeDefinition(TypeDefinition::Object(object)) => (object.name, &object.fields),
                Definition::TypeExtension(TypeExtension::Object(extension)) => (extension.name, &extension.fields),
                _ => continue,
            };

            index.insert_fields(type_name, fields, &scalars);
        }

        tracing::debug!(
            scalars = scalars.len(),
            fields = index.by_field.len(),
            query = %index.roots.query,
            mutation = %index.roots.mutation,
            subscription = %index.roots.subscription,
            "indexed schema field types"
        );

        index
    }

    fn insert_fields<'a>(&mut self, type_name: &str, fields: &[Field<'a, &'a str>], scalars: &HashSet<&str>) {
        for field in fields {
            let field_type = named_type(&field.field_type);

            if scalars.contains(field_type) {
                continue;
            }

            self.by_field.insert(field.name.to_owned(), field_type.to_owned());
            self.by_parent
                .entry(type_name.to_owned())
                .or_default()
                .insert(field.name.to_owned(), field_type.to_owned());
        }
    }

    /// Sets the lookup strategy used by [`FieldTypeIndex::resolve`].
    #[must_use]
    pub fn with_lookup(mut self, lookup: Lookup) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn lookup(&self) -> Lookup {
        self.lookup
    }

    /// The object type returned by a field with this name, regardless of the type declaring it.
    pub fn get(&self, field_name: &str) -> Option<&str> {
        self.by_field.get(field_name).map(String::as_str)
    }

    /// The object type returned by `field_name` when selected on `parent_type`.
    pub fn get_on(&self, parent_type: &str, field_name: &str) -> Option<&str> {
        self.by_parent
            .get(parent_type)
            .and_then(|fields| fields.get(field_name))
            .map(String::as_str)
    }

    /// Resolves the object type of a selected field according to the lookup strategy.
    pub fn resolve(&self, parent_type: Option<&str>, field_name: &str) -> Option<&str> {
        match (self.lookup, parent_type) {
            (Lookup::ByParentType, Some(parent_type)) => self
                .get_on(parent_type, field_name)
                .or_else(|| self.get(field_name)),
            _ => self.get(field_name),
        }
    }

    pub fn root_type(&self, kind: OperationKind) -> &str {
        match kind {
            OperationKind::Query => &self.roots.query,
            OperationKind::Mutation => &self.roots.mutation,
            OperationKind::Subscription => &self.roots.subscription,
        }
    }

    /// Iterates over `(field name, object type name)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.by_field
            .iter()
            .map(|(field, field_type)| (field.as_str(), field_type.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use indoc::indoc;

    use super::*;

    fn index(sdl: &str) -> BTreeMap<String, String> {
        FieldTypeIndex::from_sdl(sdl)
            .unwrap()
            .iter()
            .map(|(field, field_type)| (field.to_owned(), field_type.to_owned()))
            .collect()
    }

    #[test]
    fn named_type_strips_wrappers() {
        let document = graphql_parser::parse_schema::<&str>("type T { a: [[Post!]]! b: User c: [ID] }").unwrap();
        let Definition::TypeDefinition(TypeDefinition::Object(object)) = &document.definitions[0] else {
            unreachable!()
        };

        let names: Vec<_> = object.fields.iter().map(|field| named_type(&field.field_type)).collect();

        assert_eq!(names, ["Post", "User", "ID"]);
    }

    #[test]
    fn field_type_mappings() {
        let schema = indoc! {r#"
            type User {
              id: ID!
              email: String!
              posts: [Post!]!
            }

            type Post {
              id: ID!
              author: User!
              comments: [Comment!]!
            }

            type Comment {
              id: ID!
              author: User!
            }
        "#};

        let expected = expect_test::expect![[r#"
            {
                "author": "User",
                "comments": "Comment",
                "posts": "Post",
            }
        "#]];

        expected.assert_debug_eq(&index(schema));
    }

    #[test]
    fn custom_scalars() {
        let schema = indoc! {r#"
            scalar DateTime
            scalar JSON
            scalar Upload

            type User {
              id: ID!
              createdAt: DateTime!
              metadata: JSON
              avatar: Upload
              posts: [Post!]!
            }

            type Post {
              id: ID!
              publishedAt: DateTime!
              author: User!
            }
        "#};

        let index = index(schema);

        assert_eq!(index.len(), 2);
        assert_eq!(index["posts"], "Post");
        assert_eq!(index["author"], "User");

        for field in ["createdAt", "metadata", "avatar", "publishedAt"] {
            assert!(!index.contains_key(field), "{field} should not be indexed");
        }
    }

    #[test]
    fn scalar_declaration_order_does_not_matter() {
        let scalars_first = indoc! {r#"
            scalar DateTime
            type Event { at: DateTime!, venue: Venue }
            type Venue { id: ID! }
        "#};
        let scalars_last = indoc! {r#"
            type Event { at: DateTime!, venue: Venue }
            type Venue { id: ID! }
            scalar DateTime
        "#};

        assert_eq!(index(scalars_first), index(scalars_last));
        assert!(!index(scalars_last).contains_key("at"));
    }

    #[test]
    fn last_declaration_wins_for_colliding_field_names() {
        let schema = indoc! {r#"
            type Project { owner: User }
            type Repository { owner: Team }
            type User { id: ID! }
            type Team { id: ID! }
        "#};

        let index = FieldTypeIndex::from_sdl(schema).unwrap();

        assert_eq!(index.get("owner"), Some("Team"));
        assert_eq!(index.get_on("Project", "owner"), Some("User"));
        assert_eq!(index.get_on("Repository", "owner"), Some("Team"));
    }

    #[test]
    fn resolve_follows_lookup_strategy() {
        let schema = indoc! {r#"
            type Project { owner: User }
            type Repository { owner: Team }
            type User { id: ID! }
            type Team { id: ID! }
        "#};

        let by_parent = FieldTypeIndex::from_sdl(schema).unwrap();
        assert_eq!(by_parent.resolve(Some("Project"), "owner"), Some("User"));
        assert_eq!(by_parent.resolve(Some("Unknown"), "owner"), Some("Team"));
        assert_eq!(by_parent.resolve(None, "owner"), Some("Team"));
        assert_eq!(by_parent.resolve(Some("Project"), "missing"), None);

        let by_field = by_parent.with_lookup(Lookup::ByFieldName);
        assert_eq!(by_field.resolve(Some("Project"), "owner"), Some("Team"));
    }

    #[test]
    fn object_extensions_and_enums_are_indexed() {
        let schema = indoc! {r#"
            enum Role { ADMIN MEMBER }
            type User { id: ID! role: Role }
            extend type User { manager: User }
        "#};

        let index = index(schema);

        assert_eq!(index["role"], "Role");
        assert_eq!(index["manager"], "User");
    }

    #[test]
    fn interfaces_and_inputs_contribute_no_fields() {
        let schema = indoc! {r#"
            interface Node { parent: Node }
            input Filter { author: AuthorFilter }
            input AuthorFilter { name: String }
        "#};

        assert!(index(schema).is_empty());
    }

    #[test]
    fn root_types_from_schema_definition() {
        let schema = indoc! {r#"
            schema { query: RootQuery mutation: RootMutation }
            type RootQuery { me: User }
            type RootMutation { rename: User }
            type User { id: ID! }
        "#};

        let index = FieldTypeIndex::from_sdl(schema).unwrap();

        assert_eq!(index.root_type(OperationKind::Query), "RootQuery");
        assert_eq!(index.root_type(OperationKind::Mutation), "RootMutation");
        assert_eq!(index.root_type(OperationKind::Subscription), "Subscription");
    }

    #[test]
    fn malformed_schema() {
        let error = FieldTypeIndex::from_sdl("type User { id: }").unwrap_err();

        assert!(matches!(error, Error::SchemaParse(_)));
    }
}
