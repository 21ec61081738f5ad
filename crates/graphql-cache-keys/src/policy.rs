use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

/// Alternative key fields per object type, mirroring the `keyFields` type policies of the
/// client cache. A type without an entry can only be identified by its `id` field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFieldPolicies {
    key_fields: HashMap<String, Vec<String>>,
}

impl KeyFieldPolicies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the key fields of a type.
    pub fn insert<I, S>(&mut self, type_name: impl Into<String>, key_fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_fields
            .insert(type_name.into(), key_fields.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn with<I, S>(mut self, type_name: impl Into<String>, key_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(type_name, key_fields);
        self
    }

    /// The configured key fields of a type, empty when the type has no policy.
    pub fn key_fields(&self, type_name: &str) -> &[String] {
        self.key_fields.get(type_name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Merges `other` into `self`, replacing the entries of types present in both.
    pub fn extend(&mut self, other: KeyFieldPolicies) {
        self.key_fields.extend(other.key_fields);
    }

    pub fn len(&self) -> usize {
        self.key_fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_fields.is_empty()
    }
}

impl<K, I, S> FromIterator<(K, I)> for KeyFieldPolicies
where
    K: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut policies = Self::new();

        for (type_name, key_fields) in iter {
            policies.insert(type_name, key_fields);
        }

        policies
    }
}

/// Either bare key fields or a type policy object, which may carry `keyFields` next to other
/// settings such as `fields`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PolicyEntry {
    KeyFields(KeyFields),
    TypePolicy {
        #[serde(default, alias = "keyFields")]
        key_fields: Option<KeyFields>,
    },
}

/// `keyFields: false` turns normalization off for the type, which leaves no alternative key.
#[derive(Deserialize)]
#[serde(untagged)]
enum KeyFields {
    List(Vec<KeyFieldSpecifier>),
    #[allow(dead_code)]
    Disabled(bool),
}

/// `["title", "author", ["name"]]`: nested lists select subfields of the preceding field and
/// name no field of the type itself.
#[derive(Deserialize)]
#[serde(untagged)]
enum KeyFieldSpecifier {
    Field(String),
    #[allow(dead_code)]
    Nested(Vec<KeyFieldSpecifier>),
}

impl PolicyEntry {
    fn into_key_fields(self) -> Vec<String> {
        let specifiers = match self {
            PolicyEntry::KeyFields(KeyFields::List(specifiers))
            | PolicyEntry::TypePolicy {
                key_fields: Some(KeyFields::List(specifiers)),
            } => specifiers,
            PolicyEntry::KeyFields(KeyFields::Disabled(_))
            | PolicyEntry::TypePolicy {
                key_fields: Some(KeyFields::Disabled(_)) | None,
            } => Vec::new(),
        };

        specifiers
            .into_iter()
            .filter_map(|specifier| match specifier {
                KeyFieldSpecifier::Field(field) => Some(field),
                KeyFieldSpecifier::Nested(_) => None,
            })
            .collect()
    }
}

impl<'de> Deserialize<'de> for KeyFieldPolicies {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = HashMap::<String, PolicyEntry>::deserialize(deserializer)?;

        Ok(entries
            .into_iter()
            .map(|(type_name, entry)| (type_name, entry.into_key_fields()))
            .filter(|(_, key_fields)| !key_fields.is_empty())
            .collect())
    }
}
