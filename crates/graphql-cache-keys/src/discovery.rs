use std::path::{Path, PathBuf};

use ignore::{overrides::OverrideBuilder, WalkBuilder};

use crate::Error;

/// Finds the files under `root` matching any of the `patterns`, skipping the schema file. Paths
/// are sorted.
///
/// Patterns are globs relative to `root`: `*` stays within one directory, `**` crosses any
/// number of them and a leading `!` excludes. A leading `./` is ignored, and a pattern without
/// a `/` only matches files directly in `root`.
pub fn discover_documents<S>(root: &Path, patterns: &[S], schema: Option<&Path>) -> Result<Vec<PathBuf>, Error>
where
    S: AsRef<str>,
{
    if patterns.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = OverrideBuilder::new(root);

    for pattern in patterns {
        let pattern = pattern.as_ref();

        builder.add(&normalize_pattern(pattern)).map_err(|source| Error::InvalidGlob {
            pattern: pattern.to_owned(),
            source,
        })?;
    }

    let matcher = builder.build().map_err(|source| Error::InvalidGlob {
        pattern: patterns.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", "),
        source,
    })?;

    let schema = schema.and_then(|schema| schema.canonicalize().ok());
    let mut documents = Vec::new();

    for entry in WalkBuilder::new(root).build() {
        let entry = entry.map_err(|source| Error::Walk {
            root: root.to_owned(),
            source,
        })?;

        if !entry.file_type().is_some_and(|file_type| file_type.is_file()) {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);

        if !matcher.matched(relative, false).is_whitelist() {
            continue;
        }

        if schema.is_some() && path.canonicalize().ok() == schema {
            tracing::debug!(path = %path.display(), "skipping the schema file");
            continue;
        }

        documents.push(path.to_owned());
    }

    documents.sort();

    tracing::debug!(root = %root.display(), documents = documents.len(), "discovered documents");

    Ok(documents)
}

/// Rewrites a root-relative glob into the gitignore syntax of the override matcher, where a
/// pattern without a slash would match at any depth.
fn normalize_pattern(pattern: &str) -> String {
    let (negation, mut glob) = match pattern.strip_prefix('!') {
        Some(glob) => ("!", glob),
        None => ("", pattern),
    };

    while let Some(stripped) = glob.strip_prefix("./") {
        glob = stripped;
    }

    if glob.contains('/') {
        format!("{negation}{glob}")
    } else {
        format!("{negation}/{glob}")
    }
}
