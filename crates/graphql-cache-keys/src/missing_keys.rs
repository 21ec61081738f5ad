use std::{collections::HashMap, fmt};

use graphql_parser::{
    query::{Definition, Document, Field, FragmentDefinition, OperationDefinition, Selection, SelectionSet, TypeCondition},
    Pos,
};

use crate::{field_types::OperationKind, FieldTypeIndex, KeyFieldPolicies};

/// The field a normalized cache identifies objects by when no type policy says otherwise.
pub const IDENTITY_FIELD: &str = "id";

/// An object selection from which the cache cannot compute an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKeyFields {
    /// Field names from the operation root down to the selection, joined with `.`.
    pub path: String,
    /// The object type of the selection, when the schema knows it.
    pub type_name: Option<String>,
    /// Fields any one of which would have identified the object, `id` first.
    pub accepted: Vec<String>,
    /// Position of the field owning the selection set.
    pub position: Pos,
}

impl fmt::Display for MissingKeyFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;

        if let Some(type_name) = &self.type_name {
            write!(f, " ({type_name})")?;
        }

        write!(f, " at {}:{}", self.position.line, self.position.column)
    }
}

/// Returns the dotted paths of all object selections in the document that select neither `id`
/// nor any key field configured for their type, in document order.
pub fn find_missing_ids<'a>(
    document: &Document<'a, &'a str>,
    index: &FieldTypeIndex,
    policies: &KeyFieldPolicies,
) -> Vec<String> {
    find_missing_keys(document, index, policies)
        .into_iter()
        .map(|missing| missing.path)
        .collect()
}

/// Like [`find_missing_ids`], with the type, accepted key fields and position of each selection.
pub fn find_missing_keys<'a>(
    document: &Document<'a, &'a str>,
    index: &FieldTypeIndex,
    policies: &KeyFieldPolicies,
) -> Vec<MissingKeyFields> {
    let walker = Walker::new(document, index, policies);
    let mut missing = Vec::new();

    for definition in &document.definitions {
        let Definition::Operation(operation) = definition else {
            continue;
        };

        let (kind, selection_set) = match operation {
            OperationDefinition::SelectionSet(selection_set) => (OperationKind::Query, selection_set),
            OperationDefinition::Query(query) => (OperationKind::Query, &query.selection_set),
            OperationDefinition::Mutation(mutation) => (OperationKind::Mutation, &mutation.selection_set),
            OperationDefinition::Subscription(subscription) => {
                (OperationKind::Subscription, &subscription.selection_set)
            }
        };

        walker.walk_operation(index.root_type(kind), selection_set, &mut missing);
    }

    missing
}

/// A field selection after fragment expansion.
struct ExpandedField<'w, 'a> {
    field: &'w Field<'a, &'a str>,
    /// The type the field was selected on: the innermost type condition, or the type owning
    /// the selection set.
    parent_type: Option<&'w str>,
    /// Fragments spread on the way to this field, outermost first.
    fragments: Vec<&'w str>,
}

struct Walker<'w, 'a> {
    /// fragment name -> fragment
    fragments: HashMap<&'w str, &'w FragmentDefinition<'a, &'a str>>,
    index: &'w FieldTypeIndex,
    policies: &'w KeyFieldPolicies,
}

impl<'w, 'a> Walker<'w, 'a> {
    fn new(document: &'w Document<'a, &'a str>, index: &'w FieldTypeIndex, policies: &'w KeyFieldPolicies) -> Self {
        let fragments = document
            .definitions
            .iter()
            .filter_map(|definition| match definition {
                Definition::Fragment(fragment) => Some((fragment.name, fragment)),
                Definition::Operation(_) => None,
            })
            .collect();

        Self {
            fragments,
            index,
            policies,
        }
    }

    /// Root selection sets are never checked themselves, only the object fields below them.
    fn walk_operation(
        &self,
        root_type: &'w str,
        selection_set: &'w SelectionSet<'a, &'a str>,
        missing: &mut Vec<MissingKeyFields>,
    ) {
        for expanded in self.expand(selection_set, Some(root_type), &[]) {
            let field = expanded.field;

            if field.selection_set.items.is_empty() {
                continue;
            }

            let field_type = self.index.resolve(expanded.parent_type, field.name);

            self.walk_selection_set(
                &[field.name],
                field_type,
                field.position,
                &field.selection_set,
                &expanded.fragments,
                missing,
            );
        }
    }

    fn walk_selection_set(
        &self,
        path: &[&'w str],
        owner_type: Option<&'w str>,
        position: Pos,
        selection_set: &'w SelectionSet<'a, &'a str>,
        fragments: &[&'w str],
        missing: &mut Vec<MissingKeyFields>,
    ) {
        let fields = self.expand(selection_set, owner_type, fragments);
        let key_fields = owner_type
            .map(|type_name| self.policies.key_fields(type_name))
            .unwrap_or_default();

        let has_fields = !fields.is_empty();
        let has_identity = fields.iter().any(|expanded| expanded.field.name == IDENTITY_FIELD);
        let has_key_field = fields.iter().any(|expanded| {
            key_fields
                .iter()
                .any(|key_field| key_field.as_str() == expanded.field.name)
        });

        if has_fields && !has_identity && !has_key_field {
            missing.push(MissingKeyFields {
                path: path.join("."),
                type_name: owner_type.map(ToOwned::to_owned),
                accepted: std::iter::once(IDENTITY_FIELD)
                    .chain(key_fields.iter().map(String::as_str))
                    .map(ToOwned::to_owned)
                    .collect(),
                position,
            });
        }

        for expanded in &fields {
            let field = expanded.field;

            if field.selection_set.items.is_empty() {
                continue;
            }

            // Fields the index does not know are scalars or come from another schema. Either
            // way there is nothing to identify below them.
            let Some(field_type) = self.index.resolve(expanded.parent_type, field.name) else {
                tracing::trace!(field = field.name, "not descending into field of unknown type");
                continue;
            };

            let mut nested_path = path.to_vec();
            nested_path.push(field.name);

            self.walk_selection_set(
                &nested_path,
                Some(field_type),
                field.position,
                &field.selection_set,
                &expanded.fragments,
                missing,
            );
        }
    }

    /// Flattens a selection set into its field selections, replacing fragment spreads and inline
    /// fragments by the fields they contain.
    fn expand(
        &self,
        selection_set: &'w SelectionSet<'a, &'a str>,
        parent_type: Option<&'w str>,
        fragments: &[&'w str],
    ) -> Vec<ExpandedField<'w, 'a>> {
        let mut fields = Vec::new();
        self.expand_into(selection_set, parent_type, fragments, &mut fields);
        fields
    }

    fn expand_into(
        &self,
        selection_set: &'w SelectionSet<'a, &'a str>,
        parent_type: Option<&'w str>,
        fragments: &[&'w str],
        fields: &mut Vec<ExpandedField<'w, 'a>>,
    ) {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => fields.push(ExpandedField {
                    field,
                    parent_type,
                    fragments: fragments.to_vec(),
                }),
                Selection::FragmentSpread(spread) => {
                    let name = spread.fragment_name;

                    if fragments.contains(&name) {
                        tracing::warn!(fragment = name, "skipping cyclic fragment spread");
                        continue;
                    }

                    let Some(&fragment) = self.fragments.get(name) else {
                        tracing::debug!(fragment = name, "skipping spread of unknown fragment");
                        continue;
                    };

                    let TypeCondition::On(type_condition) = &fragment.type_condition;

                    let mut entered = fragments.to_vec();
                    entered.push(name);

                    self.expand_into(&fragment.selection_set, Some(*type_condition), &entered, fields);
                }
                Selection::InlineFragment(inline_fragment) => {
                    let parent_type = match &inline_fragment.type_condition {
                        Some(TypeCondition::On(type_condition)) => Some(*type_condition),
                        None => parent_type,
                    };

                    self.expand_into(&inline_fragment.selection_set, parent_type, fragments, fields);
                }
            }
        }
    }
}
