use std::io;

use graphql_cache_keys::{Error as CheckError, DEFAULT_CONFIG_FILE};
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// wraps an error raised while loading or checking the project
    #[error(transparent)]
    Check(#[from] CheckError),
    /// returned if the --log filter does not parse
    #[error("invalid log filter\nCaused by: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
    /// returned if the current directory could not be read to resolve --schema
    #[error("could not read the current directory\nCaused by: {0}")]
    CurrentDirectory(io::Error),
    /// returned if the JSON report could not be serialized
    #[error("could not serialize the report\nCaused by: {0}")]
    SerializeReport(serde_json::Error),
}

impl CliError {
    /// returns the appropriate hint for a [`CliError`]
    pub fn to_hint(&self) -> Option<String> {
        match self {
            Self::Check(CheckError::MissingSchema) => Some(format!(
                "pass --schema or set `schema` in {DEFAULT_CONFIG_FILE}"
            )),
            Self::Check(CheckError::SchemaParse(_)) => Some("the schema file must contain GraphQL SDL".to_owned()),
            Self::Check(CheckError::InvalidGlob { .. }) => {
                Some("document patterns use the .gitignore syntax, e.g. `src/**/*.graphql`".to_owned())
            }
            _ => None,
        }
    }
}
