//! Static checks that every nested object selection of a GraphQL document can be identified by a
//! normalized client cache. The intended workflow is the following:
//!
//! - Index the schema once with [FieldTypeIndex::from_sdl()].
//! - Describe the types identified by something other than `id` with [KeyFieldPolicies].
//! - Walk parsed documents with [find_missing_ids()] or [find_missing_keys()], or check whole
//!   files with [check_document()], [check_files()] and [check_project()].

#![cfg_attr(test, allow(unused_crate_dependencies))]

mod check;
mod config;
mod discovery;
mod error;
mod field_types;
mod missing_keys;
mod policy;

pub use check::{check_document, check_file, check_files, check_project, DocumentOutcome, DocumentReport};
pub use config::{Config, DEFAULT_CONFIG_FILE};
pub use discovery::discover_documents;
pub use error::Error;
pub use field_types::{named_type, FieldTypeIndex, Lookup, OperationKind};
pub use missing_keys::{find_missing_ids, find_missing_keys, MissingKeyFields, IDENTITY_FIELD};
pub use policy::KeyFieldPolicies;
