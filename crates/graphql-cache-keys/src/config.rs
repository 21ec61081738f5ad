use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{Error, KeyFieldPolicies, Lookup};

/// The configuration file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "gqlkeys.toml";

/// Project configuration, usually read from `gqlkeys.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The schema SDL file, relative to the configuration file.
    #[serde(default)]
    pub schema: Option<PathBuf>,
    /// Glob patterns selecting the documents to check, relative to the configuration file.
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub lookup: Lookup,
    #[serde(default, alias = "typePolicies")]
    pub type_policies: KeyFieldPolicies,
    #[serde(skip)]
    root: PathBuf,
}

impl Config {
    /// A configuration with no file behind it, resolving paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_owned(),
            source,
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|source| Error::ParseConfig {
            path: path.to_owned(),
            source,
        })?;

        config.root = path.parent().map(Path::to_owned).unwrap_or_default();

        tracing::debug!(
            path = %path.display(),
            documents = config.documents.len(),
            type_policies = config.type_policies.len(),
            "loaded configuration"
        );

        Ok(config)
    }

    /// The directory paths in the configuration are relative to.
    pub fn root(&self) -> &Path {
        if self.root.as_os_str().is_empty() {
            Path::new(".")
        } else {
            &self.root
        }
    }

    pub fn schema_path(&self) -> Result<PathBuf, Error> {
        let schema = self.schema.as_deref().ok_or(Error::MissingSchema)?;

        Ok(self.root().join(schema))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use indoc::indoc;

    use super::*;

    #[test]
    fn load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let config = indoc! {r#"
            schema = "src/schema.gql"
            documents = ["src/app/**/*.gql", "!src/app/generated/**"]
            lookup = "field-name"

            [typePolicies]
            User = { keyFields = ["email"] }
            Post = ["slug"]
        "#};

        fs::write(&path, config).unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.root(), dir.path());
        assert_eq!(config.schema_path().unwrap(), dir.path().join("src/schema.gql"));
        assert_eq!(config.documents, ["src/app/**/*.gql", "!src/app/generated/**"]);
        assert_eq!(config.lookup, Lookup::ByFieldName);
        assert_eq!(config.type_policies.key_fields("User"), ["email"]);
        assert_eq!(config.type_policies.key_fields("Post"), ["slug"]);
    }

    #[test]
    fn defaults() {
        let config: Config = toml::from_str(r#"schema = "schema.graphql""#).unwrap();

        assert!(config.documents.is_empty());
        assert_eq!(config.lookup, Lookup::ByParentType);
        assert!(config.type_policies.is_empty());
        assert_eq!(config.schema_path().unwrap(), Path::new("./schema.graphql"));
    }

    #[test]
    fn missing_schema() {
        let config = Config::new("project");

        assert!(matches!(config.schema_path(), Err(Error::MissingSchema)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "schema = \"schema.graphql\"\ndocument = [\"*.graphql\"]\n").unwrap();

        let error = Config::load(&path).unwrap_err();

        assert!(matches!(error, Error::ParseConfig { .. }), "{error}");
    }

    #[test]
    fn unreadable_config() {
        let dir = tempfile::tempdir().unwrap();

        let error = Config::load(&dir.path().join("missing.toml")).unwrap_err();

        assert!(matches!(error, Error::ReadConfig { .. }));
    }
}
