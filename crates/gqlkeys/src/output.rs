pub(crate) mod report {
    use std::path::Path;

    use colored::Colorize;
    use graphql_cache_keys::{DocumentOutcome, DocumentReport, MissingKeyFields};
    use serde::Serialize;

    use crate::errors::CliError;

    /// reports an error to stderr
    pub fn error(error: &CliError) {
        eprintln!("{}", format!("error: {error}").bright_red());
        if let Some(hint) = error.to_hint() {
            eprintln!("{}", format!("hint: {hint}").bright_blue());
        }
    }

    /// reports the outcome of every document to stdout
    pub fn text(reports: &[DocumentReport]) {
        print!("{}", render_text(reports));
    }

    /// reports the outcome of every document to stdout as a JSON array
    pub fn json(reports: &[DocumentReport]) -> Result<(), CliError> {
        println!("{}", render_json(reports)?);
        Ok(())
    }

    pub(crate) fn render_text(reports: &[DocumentReport]) -> String {
        let mut output = String::new();
        let (mut passed, mut failed, mut invalid) = (0, 0, 0);

        for report in reports {
            let path = display_path(&report.path);

            match &report.outcome {
                DocumentOutcome::Passed => {
                    passed += 1;
                    output.push_str(&format!("{} {path}\n", "✓".bright_green()));
                }
                DocumentOutcome::Failed(missing) => {
                    failed += 1;
                    output.push_str(&format!("{} {path}\n", "✗".bright_red()));

                    for missing in missing {
                        output.push_str(&format!(
                            "    {missing}, select one of: {}\n",
                            missing.accepted.join(", ").bright_blue()
                        ));
                    }
                }
                DocumentOutcome::Invalid(error) => {
                    invalid += 1;
                    output.push_str(&format!("{} {path}\n", "!".bright_yellow()));
                    output.push_str(&format!("    {}\n", error.to_string().replace('\n', "\n    ")));
                }
            }
        }

        let summary = format!(
            "{} documents checked: {passed} passed, {failed} failed, {invalid} invalid",
            reports.len()
        );

        if failed + invalid == 0 {
            output.push_str(&format!("{}\n", summary.bright_green()));
        } else {
            output.push_str(&format!("{}\n", summary.bright_red()));
        }

        output
    }

    #[derive(Serialize)]
    #[serde(rename_all = "lowercase")]
    enum Status {
        Passed,
        Failed,
        Invalid,
    }

    #[derive(Serialize)]
    struct JsonReport<'a> {
        path: String,
        status: Status,
        missing: Vec<JsonMissingKeyFields<'a>>,
        error: Option<String>,
    }

    #[derive(Serialize)]
    struct JsonMissingKeyFields<'a> {
        path: &'a str,
        #[serde(rename = "type")]
        type_name: Option<&'a str>,
        accepted: &'a [String],
        line: usize,
        column: usize,
    }

    impl<'a> From<&'a MissingKeyFields> for JsonMissingKeyFields<'a> {
        fn from(missing: &'a MissingKeyFields) -> Self {
            Self {
                path: &missing.path,
                type_name: missing.type_name.as_deref(),
                accepted: &missing.accepted,
                line: missing.position.line,
                column: missing.position.column,
            }
        }
    }

    pub(crate) fn render_json(reports: &[DocumentReport]) -> Result<String, CliError> {
        let reports: Vec<_> = reports
            .iter()
            .map(|report| {
                let status = match &report.outcome {
                    DocumentOutcome::Passed => Status::Passed,
                    DocumentOutcome::Failed(_) => Status::Failed,
                    DocumentOutcome::Invalid(_) => Status::Invalid,
                };

                let error = match &report.outcome {
                    DocumentOutcome::Invalid(error) => Some(error.to_string()),
                    DocumentOutcome::Passed | DocumentOutcome::Failed(_) => None,
                };

                JsonReport {
                    path: display_path(&report.path),
                    status,
                    missing: report.outcome.missing().iter().map(Into::into).collect(),
                    error,
                }
            })
            .collect();

        serde_json::to_string_pretty(&reports).map_err(CliError::SerializeReport)
    }

    fn display_path(path: &Path) -> String {
        path.strip_prefix(".").unwrap_or(path).display().to_string()
    }

}
