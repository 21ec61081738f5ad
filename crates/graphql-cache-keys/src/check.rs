use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::{discover_documents, find_missing_keys, Config, Error, FieldTypeIndex, KeyFieldPolicies, MissingKeyFields};

/// The result of checking one document.
#[derive(Debug)]
pub enum DocumentOutcome {
    /// Every object selection can be identified.
    Passed,
    /// Some object selections select neither `id` nor a key field.
    Failed(Vec<MissingKeyFields>),
    /// The document could not be read or parsed.
    Invalid(Error),
}

impl DocumentOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, DocumentOutcome::Passed)
    }

    /// The violations of a failed document, empty otherwise.
    pub fn missing(&self) -> &[MissingKeyFields] {
        match self {
            DocumentOutcome::Failed(missing) => missing,
            DocumentOutcome::Passed | DocumentOutcome::Invalid(_) => &[],
        }
    }
}

impl fmt::Display for DocumentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentOutcome::Passed => f.write_str("passed"),
            DocumentOutcome::Failed(missing) => {
                f.write_str("missing identity fields at: ")?;

                for (i, missing) in missing.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }

                    f.write_str(&missing.path)?;
                }

                Ok(())
            }
            DocumentOutcome::Invalid(error) => write!(f, "invalid document: {error}"),
        }
    }
}

/// The outcome of one document file.
#[derive(Debug)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub outcome: DocumentOutcome,
}

/// Parses an executable document and returns its object selections lacking identity fields.
pub fn check_document(
    text: &str,
    index: &FieldTypeIndex,
    policies: &KeyFieldPolicies,
) -> Result<Vec<MissingKeyFields>, Error> {
    let document = graphql_parser::parse_query::<&str>(text)?;

    Ok(find_missing_keys(&document, index, policies))
}

/// Reads and checks one document file.
pub fn check_file(path: &Path, index: &FieldTypeIndex, policies: &KeyFieldPolicies) -> DocumentOutcome {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(source) => {
            return DocumentOutcome::Invalid(Error::ReadFile {
                path: path.to_owned(),
                source,
            })
        }
    };

    match check_document(&text, index, policies) {
        Ok(missing) if missing.is_empty() => DocumentOutcome::Passed,
        Ok(missing) => DocumentOutcome::Failed(missing),
        Err(error) => DocumentOutcome::Invalid(error),
    }
}

/// Checks every file, returning one report per path in the given order.
pub fn check_files<P>(paths: &[P], index: &FieldTypeIndex, policies: &KeyFieldPolicies) -> Vec<DocumentReport>
where
    P: AsRef<Path>,
{
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let outcome = check_file(path, index, policies);

            match &outcome {
                DocumentOutcome::Passed => tracing::trace!(path = %path.display(), "document passed"),
                DocumentOutcome::Failed(missing) => {
                    tracing::debug!(path = %path.display(), missing = missing.len(), "document failed")
                }
                DocumentOutcome::Invalid(error) => {
                    tracing::debug!(path = %path.display(), %error, "invalid document")
                }
            }

            DocumentReport {
                path: path.to_owned(),
                outcome,
            }
        })
        .collect()
}

/// Indexes the configured schema, discovers the configured documents and checks them.
pub fn check_project(config: &Config) -> Result<Vec<DocumentReport>, Error> {
    let schema_path = config.schema_path()?;

    let sdl = fs::read_to_string(&schema_path).map_err(|source| Error::ReadFile {
        path: schema_path.clone(),
        source,
    })?;

    let index = FieldTypeIndex::from_sdl(&sdl)?.with_lookup(config.lookup);
    let documents = discover_documents(config.root(), &config.documents, Some(schema_path.as_path()))?;

    tracing::info!(
        schema = %schema_path.display(),
        documents = documents.len(),
        lookup = ?index.lookup(),
        "checking documents"
    );

    Ok(check_files(&documents, &index, &config.type_policies))
}
