//! Cleaning / normalization layer
//!
//! Runs after the top-level shape has been accepted and coerces each element
//! into its canonical record:
//! - dates go through the Portuguese date normalizer
//! - person names are resolved to roster ids; unresolved names are kept as
//!   placeholders (`id == ""`) for the persistence layer to reconcile
//! - every automatic correction is reported as a warning
//!
//! An element that cannot be turned into a record at all is excluded and
//! reported as an error scoped to its index; the rest of the batch carries on.
//! Output order follows input order.
//!
//! Cleaning is idempotent: values that are already canonical (ISO dates,
//! persons carrying an id, roster ids in name lists) pass through untouched.
//! A record that cleaning leaves exactly as it came in was produced by an
//! earlier pass; its warnings were reported then and are not repeated.

use crate::types::{CleanResult, PersonRef, ScheduleDomain, ValidationOutcome};
use crate::validators::{guards::type_name, root_elements};
use congregacao_common::{split_family_names, DateNormalizer, NameMatcher};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Per-call cleaning state: collaborators plus the warning accumulator
pub struct CleanContext<'a> {
    matcher: &'a dyn NameMatcher,
    dates: DateNormalizer,
    warnings: Vec<String>,
}

impl<'a> CleanContext<'a> {
    pub fn new(matcher: &'a dyn NameMatcher, dates: DateNormalizer) -> Self {
        Self {
            matcher,
            dates,
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, path: &str, message: impl AsRef<str>) {
        self.warnings.push(format!("{}: {}", path, message.as_ref()));
    }

    pub fn dates(&self) -> &DateNormalizer {
        &self.dates
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    /// Number of warnings collected so far
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Drop every warning collected after `mark`, returning how many went
    pub fn discard_warnings_since(&mut self, mark: usize) -> usize {
        let dropped = self.warnings.len().saturating_sub(mark);
        self.warnings.truncate(mark);
        dropped
    }

    /// Normalize a date string, warning when it degraded to today
    pub fn date(&mut self, raw: &str, path: &str) -> String {
        let normalized = self.dates.normalize(raw);
        if normalized.fell_back {
            self.warn(
                path,
                format!("unparseable date \"{}\", using {}", raw, normalized.iso),
            );
        }
        normalized.iso
    }

    /// Required date field: missing or non-string excludes the element
    pub fn required_date(
        &mut self,
        obj: &Map<String, Value>,
        field: &str,
        path: &str,
    ) -> Result<String, String> {
        let field_path = format!("{}.{}", path, field);
        match obj.get(field) {
            Some(Value::String(raw)) => Ok(self.date(raw, &field_path)),
            Some(Value::Null) | None => Err(format!("{}: required date is missing", field_path)),
            Some(other) => Err(format!(
                "{}: expected date string, got {}",
                field_path,
                type_name(other)
            )),
        }
    }

    /// Optional free text: trimmed, empty becomes `None`
    pub fn text(&mut self, obj: &Map<String, Value>, field: &str, path: &str) -> Option<String> {
        match obj.get(field) {
            Some(Value::String(s)) => non_empty(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Null) | None => None,
            Some(other) => {
                self.warn(
                    &format!("{}.{}", path, field),
                    format!("ignored {} value, expected text", type_name(other)),
                );
                None
            }
        }
    }

    /// Required free text: missing or blank excludes the element
    pub fn required_text(
        &mut self,
        obj: &Map<String, Value>,
        field: &str,
        path: &str,
    ) -> Result<String, String> {
        self.text(obj, field, path)
            .ok_or_else(|| format!("{}.{}: required text is missing or empty", path, field))
    }

    /// Song number: digits extracted from text such as "Cântico 45"
    pub fn song_number(&mut self, obj: &Map<String, Value>, field: &str, path: &str) -> Option<String> {
        let text = self.text(obj, field, path)?;
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            Some(text)
        } else {
            Some(digits)
        }
    }

    /// Duration in minutes from a number or text such as "10 min"
    pub fn minutes(&mut self, obj: &Map<String, Value>, field: &str, path: &str) -> Option<u32> {
        let field_path = format!("{}.{}", path, field);
        let parsed = match obj.get(field) {
            Some(Value::Number(n)) => n.as_u64().and_then(|m| u32::try_from(m).ok()),
            Some(Value::String(s)) => {
                let digits: String = s
                    .trim()
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                digits.parse().ok()
            }
            Some(Value::Null) | None => return None,
            Some(_) => None,
        };
        if parsed.is_none() {
            self.warn(&field_path, "unreadable duration, left empty");
        }
        parsed
    }

    /// Resolve a person slot (`null`, name string or `{nome, id?}`)
    pub fn person(&mut self, obj: &Map<String, Value>, field: &str, path: &str) -> Option<PersonRef> {
        let field_path = format!("{}.{}", path, field);
        match obj.get(field) {
            Some(Value::Null) | None => None,
            Some(Value::String(nome)) => {
                let Some(nome) = non_empty(nome) else {
                    self.warn(&field_path, "empty name, slot left unassigned");
                    return None;
                };
                Some(self.resolve_name(&nome, &field_path))
            }
            Some(Value::Object(person)) => {
                let id = person.get("id").and_then(Value::as_str).and_then(non_empty);
                let nome = person.get("nome").and_then(Value::as_str).and_then(non_empty);
                match (id, nome) {
                    // Already resolved: never re-derived
                    (Some(id), Some(nome)) => Some(PersonRef::new(id, nome)),
                    (None, Some(nome)) => Some(self.resolve_name(&nome, &field_path)),
                    (Some(id), None) => {
                        let matcher = self.matcher;
                        match matcher.find_by_id(&id) {
                            Some(entry) => {
                                self.warn(&field_path, format!("name filled from roster id {}", id));
                                Some(PersonRef::new(entry.id.clone(), entry.nome.clone()))
                            }
                            None => {
                                self.warn(
                                    &field_path,
                                    format!("unknown id {} without a name, slot left unassigned", id),
                                );
                                None
                            }
                        }
                    }
                    (None, None) => {
                        self.warn(&field_path, "person without a name, slot left unassigned");
                        None
                    }
                }
            }
            Some(other) => {
                self.warn(
                    &field_path,
                    format!("ignored {} value, expected a person", type_name(other)),
                );
                None
            }
        }
    }

    /// Resolve a name against the roster, keeping it as a placeholder when unknown
    pub fn resolve_name(&mut self, nome: &str, path: &str) -> PersonRef {
        let matcher = self.matcher;
        match matcher.find_by_name(nome) {
            Some(entry) => {
                if entry.nome.trim().to_lowercase() != nome.trim().to_lowercase() {
                    self.warn(
                        path,
                        format!("\"{}\" matched roster entry \"{}\"", nome, entry.nome),
                    );
                }
                PersonRef::new(entry.id.clone(), entry.nome.clone())
            }
            None => {
                self.warn(
                    path,
                    format!("\"{}\" not found in roster, kept as placeholder", nome),
                );
                PersonRef::new("", nome)
            }
        }
    }

    /// Split a multi-name text and resolve each name (placeholders for unknown names)
    ///
    /// A value that already is a roster id passes through unchanged.
    pub fn resolve_names(&mut self, text: &str, path: &str) -> Vec<PersonRef> {
        let matcher = self.matcher;
        if let Some(entry) = matcher.find_by_id(text) {
            return vec![PersonRef::new(entry.id.clone(), entry.nome.clone())];
        }
        split_family_names(text)
            .into_iter()
            .map(|nome| self.resolve_name(&nome, path))
            .collect()
    }
}

/// True when `input` is exactly the serialized form of its own cleaned record
fn already_clean<T: Serialize>(record: &T, input: &Value) -> bool {
    serde_json::to_value(record).map_or(false, |value| value == *input)
}

/// Trimmed copy, `None` when blank
pub fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Validate the top-level shape, then clean every element of domain `D`
///
/// Element-level structural findings do not stop cleaning: each element is
/// re-derived here and either coerced (warning) or excluded (error).
pub fn validate_and_clean<D: ScheduleDomain>(
    raw: &Value,
    matcher: &dyn NameMatcher,
    dates: DateNormalizer,
) -> CleanResult<D::Record> {
    let elements = match root_elements(raw, D::ROOT_FIELD) {
        ValidationOutcome::Valid(elements) => elements,
        ValidationOutcome::Invalid(errors) => {
            return CleanResult {
                valid: false,
                cleaned_data: None,
                errors,
                warnings: Vec::new(),
            };
        }
    };

    let mut ctx = CleanContext::new(matcher, dates);
    let mut errors = Vec::new();
    let mut cleaned = Vec::with_capacity(elements.len());

    if elements.is_empty() {
        ctx.warn(D::ROOT_FIELD, "no records to import");
    }

    for (index, element) in elements.iter().enumerate() {
        let path = format!("{}[{}]", D::ROOT_FIELD, index);
        let Some(record) = element.as_object() else {
            errors.push(format!("{}: expected object, got {}", path, type_name(element)));
            continue;
        };
        let mark = ctx.warning_count();
        match D::clean_record(record, &path, &mut ctx) {
            ValidationOutcome::Valid(clean) => {
                if ctx.warning_count() > mark && already_clean(&clean, element) {
                    let repeated = ctx.discard_warnings_since(mark);
                    debug!(path = %path, repeated, "Record already in cleaned form");
                }
                cleaned.push(clean)
            }
            ValidationOutcome::Invalid(record_errors) => {
                debug!(path = %path, errors = record_errors.len(), "Record excluded");
                errors.extend(record_errors);
            }
        }
    }

    let warnings = ctx.into_warnings();
    info!(
        domain = D::ROOT_FIELD,
        input = elements.len(),
        cleaned = cleaned.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        "Cleaning complete"
    );

    CleanResult {
        valid: errors.is_empty(),
        cleaned_data: Some(cleaned),
        errors,
        warnings,
    }
}
