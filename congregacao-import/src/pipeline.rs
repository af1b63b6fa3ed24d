//! Import dispatch: raw JSON → structural validation → cleaning → report
//!
//! Extraction (PDF → JSON) happens upstream and persistence downstream; this
//! module only routes a payload to the right schedule domain and packages
//! the outcome for the caller.

use crate::cleaners;
use crate::schedules::{Discursos, Limpeza, Mecanicas, Nvc};
use crate::types::{CleanResult, ScheduleDomain, SchemaReport};
use crate::validators;
use congregacao_common::{DateNormalizer, Error, NameMatcher};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Importable schedule domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportDomain {
    Nvc,
    Mecanicas,
    Limpeza,
    Discursos,
}

impl ImportDomain {
    pub const ALL: [ImportDomain; 4] = [
        ImportDomain::Nvc,
        ImportDomain::Mecanicas,
        ImportDomain::Limpeza,
        ImportDomain::Discursos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportDomain::Nvc => "nvc",
            ImportDomain::Mecanicas => "mecanicas",
            ImportDomain::Limpeza => "limpeza",
            ImportDomain::Discursos => "discursos",
        }
    }

    /// Name of the top-level array the domain expects
    pub fn root_field(&self) -> &'static str {
        match self {
            ImportDomain::Nvc => Nvc::ROOT_FIELD,
            ImportDomain::Mecanicas => Mecanicas::ROOT_FIELD,
            ImportDomain::Limpeza => Limpeza::ROOT_FIELD,
            ImportDomain::Discursos => Discursos::ROOT_FIELD,
        }
    }
}

impl fmt::Display for ImportDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportDomain {
    type Err = Error;

    /// Accepts the short name or the top-level field name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ImportDomain::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted || d.root_field() == wanted)
            .ok_or_else(|| Error::NotFound(format!("unknown import domain '{}'", s)))
    }
}

/// Outcome of one import, with cleaned records as JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub domain: ImportDomain,
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaned_data: Option<Value>,
}

impl ImportReport {
    fn from_clean<T: Serialize>(domain: ImportDomain, result: CleanResult<T>) -> Self {
        let mut errors = result.errors;
        let cleaned_data = match result.cleaned_data.map(|data| serde_json::to_value(data)) {
            Some(Ok(value)) => Some(value),
            Some(Err(e)) => {
                errors.push(format!("failed to serialize cleaned data: {}", e));
                None
            }
            None => None,
        };
        Self {
            domain,
            valid: errors.is_empty(),
            errors,
            warnings: result.warnings,
            cleaned_data,
        }
    }
}

/// Validate + clean imports against a shared roster
#[derive(Clone)]
pub struct Importer {
    matcher: Arc<dyn NameMatcher>,
    dates: DateNormalizer,
}

impl Importer {
    pub fn new(matcher: Arc<dyn NameMatcher>) -> Self {
        Self::with_dates(matcher, DateNormalizer::new())
    }

    pub fn with_dates(matcher: Arc<dyn NameMatcher>, dates: DateNormalizer) -> Self {
        Self { matcher, dates }
    }

    /// Structural validation only
    pub fn validate(&self, domain: ImportDomain, raw: &Value) -> SchemaReport {
        match domain {
            ImportDomain::Nvc => validators::validate_schema::<Nvc>(raw),
            ImportDomain::Mecanicas => validators::validate_schema::<Mecanicas>(raw),
            ImportDomain::Limpeza => validators::validate_schema::<Limpeza>(raw),
            ImportDomain::Discursos => validators::validate_schema::<Discursos>(raw),
        }
    }

    /// Full import pass for `domain`
    pub fn run(&self, domain: ImportDomain, raw: &Value) -> ImportReport {
        let report = match domain {
            ImportDomain::Nvc => self.clean::<Nvc>(domain, raw),
            ImportDomain::Mecanicas => self.clean::<Mecanicas>(domain, raw),
            ImportDomain::Limpeza => self.clean::<Limpeza>(domain, raw),
            ImportDomain::Discursos => self.clean::<Discursos>(domain, raw),
        };

        info!(
            domain = %domain,
            valid = report.valid,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Import processed"
        );
        report
    }

    fn clean<D: ScheduleDomain>(&self, domain: ImportDomain, raw: &Value) -> ImportReport {
        let result = cleaners::validate_and_clean::<D>(raw, self.matcher.as_ref(), self.dates);
        ImportReport::from_clean(domain, result)
    }
}
