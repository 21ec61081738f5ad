use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::{Parser, ValueEnum};
use graphql_cache_keys::{Config, KeyFieldPolicies, Lookup, DEFAULT_CONFIG_FILE};

use crate::errors::CliError;

#[derive(Debug, Parser)]
#[command(name = "gqlkeys", version)]
/// Checks that GraphQL documents select the fields a normalized cache identifies objects by
pub(crate) struct Args {
    /// Path to the TOML configuration file. Defaults to ./gqlkeys.toml when it exists.
    #[arg(long, short, env = "GQLKEYS_CONFIG")]
    pub config: Option<PathBuf>,
    /// Path to the schema SDL, overriding the configured one
    #[arg(long, short, env = "GQLKEYS_SCHEMA")]
    pub schema: Option<PathBuf>,
    /// Glob pattern selecting documents, relative to the configuration file. Replaces the
    /// configured patterns when given, prefix with ! to exclude.
    #[arg(long = "documents", short = 'd')]
    pub documents: Vec<String>,
    /// Key fields of a type, as TYPE=field1,field2. Replaces the configured policy of the type.
    #[arg(long = "key-fields", short = 'k')]
    pub key_fields: Vec<KeyFieldsArg>,
    /// How the type of a selected field is looked up in the schema
    #[arg(long, value_enum)]
    pub lookup: Option<LookupArg>,
    /// Set the report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
    /// Set the log filter, e.g. `debug` or `graphql_cache_keys=trace`
    #[arg(long = "log", env = "GQLKEYS_LOG")]
    pub log_filter: Option<String>,
}

impl Args {
    /// Loads the configuration file and applies the command line overrides on top of it.
    pub fn config(&self) -> Result<Config, CliError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Config::load(Path::new(DEFAULT_CONFIG_FILE))?,
            None => Config::new("."),
        };

        if let Some(schema) = &self.schema {
            let current_dir = std::env::current_dir().map_err(CliError::CurrentDirectory)?;
            config.schema = Some(current_dir.join(schema));
        }

        if !self.documents.is_empty() {
            config.documents.clone_from(&self.documents);
        }

        if let Some(lookup) = self.lookup {
            config.lookup = lookup.into();
        }

        config.type_policies.extend(
            self.key_fields
                .iter()
                .map(|arg| (arg.type_name.as_str(), arg.fields.iter().map(String::as_str)))
                .collect::<KeyFieldPolicies>(),
        );

        Ok(config)
    }
}

/// `User=email,handle`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyFieldsArg {
    pub type_name: String,
    pub fields: Vec<String>,
}

impl FromStr for KeyFieldsArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (type_name, fields) = s
            .split_once('=')
            .ok_or_else(|| format!("expected TYPE=field1,field2, got `{s}`"))?;

        let type_name = type_name.trim();

        if type_name.is_empty() {
            return Err(format!("missing the type name in `{s}`"));
        }

        let fields: Vec<String> = fields
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if fields.is_empty() {
            return Err(format!("no key fields given for `{type_name}`"));
        }

        Ok(Self {
            type_name: type_name.to_owned(),
            fields,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub(crate) enum LookupArg {
    /// Resolve fields through the type they are selected on
    ParentType,
    /// Resolve fields by name only, the last declaration in the schema wins
    FieldName,
}

impl From<LookupArg> for Lookup {
    fn from(lookup: LookupArg) -> Self {
        match lookup {
            LookupArg::ParentType => Lookup::ByParentType,
            LookupArg::FieldName => Lookup::ByFieldName,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// Human readable text
    Text,
    /// A JSON array with one object per document
    Json,
}

impl AsRef<str> for Format {
    fn as_ref(&self) -> &str {
        match self {
            Format::Text => "text",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use indoc::indoc;

    use super::*;

    #[test]
    fn key_fields_argument() {
        let arg: KeyFieldsArg = "User=email, handle".parse().unwrap();

        assert_eq!(arg.type_name, "User");
        assert_eq!(arg.fields, ["email", "handle"]);

        assert!("User".parse::<KeyFieldsArg>().is_err());
        assert!("=email".parse::<KeyFieldsArg>().is_err());
        assert!("User=".parse::<KeyFieldsArg>().is_err());
    }

    #[test]
    fn parse_flags() {
        let args = Args::try_parse_from([
            "gqlkeys",
            "--documents",
            "src/**/*.gql",
            "-d",
            "!src/generated/**",
            "--key-fields",
            "Post=slug",
            "--lookup",
            "field-name",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.documents, ["src/**/*.gql", "!src/generated/**"]);
        assert_eq!(args.key_fields[0].type_name, "Post");
        assert_eq!(args.lookup, Some(LookupArg::FieldName));
        assert_eq!(args.format, Format::Json);
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("gqlkeys.toml");

        let config = indoc! {r#"
            schema = "schema.graphql"
            documents = ["**/*.graphql"]

            [type_policies]
            User = ["email"]
            Post = ["slug"]
        "#};
        fs::write(&config_path, config).unwrap();

        let args = Args::try_parse_from([
            "gqlkeys",
            "--config",
            config_path.to_str().unwrap(),
            "--documents",
            "queries/*.graphql",
            "--key-fields",
            "User=handle",
            "--lookup",
            "field-name",
        ])
        .unwrap();

        let config = args.config().unwrap();

        assert_eq!(config.root(), dir.path());
        assert_eq!(config.schema_path().unwrap(), dir.path().join("schema.graphql"));
        assert_eq!(config.documents, ["queries/*.graphql"]);
        assert_eq!(config.lookup, Lookup::ByFieldName);
        assert_eq!(config.type_policies.key_fields("User"), ["handle"]);
        assert_eq!(config.type_policies.key_fields("Post"), ["slug"]);
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let args = Args::try_parse_from(["gqlkeys", "--config", path.to_str().unwrap()]).unwrap();

        assert!(matches!(
            args.config(),
            Err(CliError::Check(graphql_cache_keys::Error::ReadConfig { .. }))
        ));
    }
}
