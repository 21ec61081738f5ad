use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while reading and parsing the inputs of a check. Missing key fields are not
/// errors, see [`MissingKeyFields`](crate::MissingKeyFields).
#[derive(Error, Debug)]
pub enum Error {
    /// The schema SDL does not parse.
    #[error(transparent)]
    SchemaParse(#[from] graphql_parser::schema::ParseError),
    /// An executable document does not parse.
    #[error(transparent)]
    DocumentParse(#[from] graphql_parser::query::ParseError),
    /// A schema or document file could not be read.
    #[error("could not read {}: {source}", path.display())]
    ReadFile {
        /// The file that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },
    /// The configuration file could not be read.
    #[error("could not read the configuration file {}: {source}", path.display())]
    ReadConfig {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },
    /// The configuration file is not valid TOML or has unknown keys.
    #[error("invalid configuration in {}: {source}", path.display())]
    ParseConfig {
        /// The configuration file path.
        path: PathBuf,
        /// The deserialization error.
        source: toml::de::Error,
    },
    /// Neither the configuration nor the command line named a schema.
    #[error("no schema file was configured")]
    MissingSchema,
    /// A document pattern is not a valid glob.
    #[error("invalid document pattern `{pattern}`: {source}")]
    InvalidGlob {
        /// The offending pattern.
        pattern: String,
        /// The glob compilation error.
        source: ignore::Error,
    },
    /// Walking the project directory failed.
    #[error("could not walk {}: {source}", root.display())]
    Walk {
        /// The directory being walked.
        root: PathBuf,
        /// The traversal error.
        source: ignore::Error,
    },
}
