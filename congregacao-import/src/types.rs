//! Core Types and Trait Definitions for congregacao-import
//!
//! Every schedule domain (weekly program, mechanics, cleaning, talks) is a
//! [`ScheduleDomain`]: it names the top-level array it reads, checks the
//! structure of one element, and cleans one element into its typed record.
//! The generic drivers in [`crate::validators`] and [`crate::cleaners`] do
//! the top-level shape check, per-element iteration and error scoping.

use crate::cleaners::CleanContext;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Common Types
// ============================================================================

/// Outcome of checking or cleaning one unit of input
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome<T> {
    /// Usable value
    Valid(T),
    /// Structural errors; the unit is excluded
    Invalid(Vec<String>),
}

impl<T> ValidationOutcome<T> {
    pub fn invalid(message: impl Into<String>) -> Self {
        ValidationOutcome::Invalid(vec![message.into()])
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }
}

/// Volunteer assignment slot
///
/// `id` is empty when the name could not be matched against the roster; the
/// persistence layer is expected to reconcile it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: String,
    pub nome: String,
}

impl PersonRef {
    pub fn new(id: impl Into<String>, nome: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nome: nome.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Result of structural validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub valid: bool,
    pub errors: Vec<String>,
    /// False when the top-level shape itself was wrong (cleaning must not run)
    #[serde(skip)]
    pub shape_ok: bool,
}

/// Result of validation + cleaning
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanResult<T> {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaned_data: Option<Vec<T>>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

// ============================================================================
// Domain trait
// ============================================================================

/// One importable schedule domain
pub trait ScheduleDomain {
    /// Cleaned, typed record
    type Record: Serialize + DeserializeOwned + Clone + PartialEq + std::fmt::Debug;

    /// Name of the top-level array field (e.g. `"discursos"`)
    const ROOT_FIELD: &'static str;

    /// Structural checks for one element; errors are pushed with `path` prefixed
    fn validate_record(record: &Map<String, Value>, path: &str, errors: &mut Vec<String>);

    /// Clean one element; `Invalid` excludes it from the cleaned output
    fn clean_record(
        record: &Map<String, Value>,
        path: &str,
        ctx: &mut CleanContext<'_>,
    ) -> ValidationOutcome<Self::Record>;
}
