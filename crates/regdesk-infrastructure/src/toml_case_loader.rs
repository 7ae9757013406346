//! TOML-backed loading of regulatory case fixtures.

use regdesk_core::case::{InMemoryCaseRegistry, RegulatoryCase, validate_cases};
use regdesk_core::config::FixtureConfig;
use regdesk_core::{RegdeskError, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Cases compiled into the binary.
pub const BUILTIN_CASES_TOML: &str = include_str!("../fixtures/cases.toml");

#[derive(Deserialize, Debug, Default)]
struct CaseFile {
    #[serde(rename = "case", default)]
    cases: Vec<RegulatoryCase>,
}

enum Source {
    Builtin,
    File(PathBuf),
}

/// Loads cases from TOML into an [`InMemoryCaseRegistry`].
///
/// Loading validates the summary invariants. In permissive mode (the
/// default) each issue is logged and the cases are kept as they are; in
/// strict mode any issue aborts the load.
pub struct TomlCaseLoader {
    source: Source,
    strict: bool,
}

impl TomlCaseLoader {
    /// Loader for the built-in fixtures.
    pub fn builtin() -> Self {
        Self {
            source: Source::Builtin,
            strict: false,
        }
    }

    /// Loader for a cases file on disk.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            source: Source::File(path),
            strict: false,
        }
    }

    /// Loader selected by configuration: the configured file if any, the
    /// built-in fixtures otherwise.
    pub fn from_config(config: &FixtureConfig) -> Self {
        let loader = match &config.path {
            Some(path) => Self::with_path(path.clone()),
            None => Self::builtin(),
        };
        loader.strict(config.strict)
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Reads, parses and validates the cases.
    ///
    /// # Errors
    ///
    /// - `Io` if the file cannot be read
    /// - `Serialization` if the TOML is malformed
    /// - `Fixture` if strict mode is on and validation finds problems
    pub fn load(&self) -> Result<InMemoryCaseRegistry> {
        let (content, origin) = match &self.source {
            Source::Builtin => (BUILTIN_CASES_TOML.to_string(), "built-in".to_string()),
            Source::File(path) => (fs::read_to_string(path)?, path.display().to_string()),
        };

        let registry = parse_cases(&content, self.strict)?;
        tracing::info!(origin = %origin, cases = registry.len(), "Loaded regulatory cases");
        Ok(registry)
    }
}

/// Parses a cases document and applies the validation policy.
pub fn parse_cases(content: &str, strict: bool) -> Result<InMemoryCaseRegistry> {
    let file: CaseFile = toml::from_str(content)?;

    let issues = validate_cases(&file.cases);
    if !issues.is_empty() {
        if strict {
            let joined = issues
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(RegdeskError::Fixture(joined));
        }
        for issue in &issues {
            tracing::warn!(
                case_id = %issue.case_id,
                field = issue.field,
                "Fixture issue: {}",
                issue.problem
            );
        }
    }

    Ok(InMemoryCaseRegistry::new(file.cases))
}
