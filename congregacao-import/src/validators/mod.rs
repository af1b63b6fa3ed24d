//! Structural validation layer
//!
//! Purely structural checks (types and required-vs-optional) over raw JSON
//! produced by the extraction service or uploaded by a user. No semantic
//! checks: a date only has to be a string here, the cleaners decide whether
//! it parses.
//!
//! # Error accumulation
//! - Top-level shape errors (not an object, missing or non-array root field)
//!   are terminal: nothing below is checked.
//! - Every element is checked independently; all errors across all elements
//!   are returned in one pass, each prefixed with the element path
//!   (`discursos[3].tema: ...`).

pub mod guards;

use crate::types::{ScheduleDomain, SchemaReport, ValidationOutcome};
use guards::type_name;
use serde_json::Value;
use tracing::debug;

/// Locate the domain's top-level array
pub fn root_elements<'a>(raw: &'a Value, field: &str) -> ValidationOutcome<&'a [Value]> {
    let Some(object) = raw.as_object() else {
        return ValidationOutcome::invalid(format!(
            "expected a JSON object at the top level, got {}",
            type_name(raw)
        ));
    };
    match object.get(field) {
        None => ValidationOutcome::invalid(format!("missing required array '{}'", field)),
        Some(Value::Array(elements)) => ValidationOutcome::Valid(elements.as_slice()),
        Some(other) => ValidationOutcome::invalid(format!(
            "'{}' must be an array, got {}",
            field,
            type_name(other)
        )),
    }
}

/// Validate the structure of a raw import payload for domain `D`
pub fn validate_schema<D: ScheduleDomain>(raw: &Value) -> SchemaReport {
    let elements = match root_elements(raw, D::ROOT_FIELD) {
        ValidationOutcome::Valid(elements) => elements,
        ValidationOutcome::Invalid(errors) => {
            debug!(domain = D::ROOT_FIELD, ?errors, "Top-level shape rejected");
            return SchemaReport {
                valid: false,
                errors,
                shape_ok: false,
            };
        }
    };

    let mut errors = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        let path = format!("{}[{}]", D::ROOT_FIELD, index);
        match element.as_object() {
            Some(record) => D::validate_record(record, &path, &mut errors),
            None => errors.push(format!("{}: expected object, got {}", path, type_name(element))),
        }
    }

    debug!(
        domain = D::ROOT_FIELD,
        elements = elements.len(),
        errors = errors.len(),
        "Schema validation complete"
    );

    SchemaReport {
        valid: errors.is_empty(),
        errors,
        shape_ok: true,
    }
}
