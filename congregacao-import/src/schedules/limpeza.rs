//! Kingdom Hall cleaning schedule ("escalas de limpeza")
//!
//! Input: `{ "escalas": [ { grupo_id, data_limpeza, publicadores?, familia?, observacoes? } ] }`
//!
//! Crew members arrive either as a list (`publicadores`) or as free text
//! (`familia: "Vilson, Loni e Isolde"`); both are split into names and
//! resolved to roster ids. Unknown names stay in the list as placeholders and
//! are also listed in `pendentes`, for the persistence layer to create roster
//! entries for them.

use crate::cleaners::{self, CleanContext};
use crate::types::{CleanResult, PersonRef, ScheduleDomain, SchemaReport, ValidationOutcome};
use crate::validators::{self, guards};
use congregacao_common::{DateNormalizer, NameMatcher};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One cleaning assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalaLimpeza {
    pub grupo_id: String,
    /// ISO date
    pub data_limpeza: String,
    /// Roster ids, or names that could not be resolved
    pub publicadores: Vec<String>,
    /// The unresolved names among `publicadores`
    #[serde(default)]
    pub pendentes: Vec<String>,
    pub observacoes: Option<String>,
}

/// Cleaning schedule domain
pub struct Limpeza;

impl ScheduleDomain for Limpeza {
    type Record = EscalaLimpeza;

    const ROOT_FIELD: &'static str = "escalas";

    fn validate_record(record: &Map<String, Value>, path: &str, errors: &mut Vec<String>) {
        guards::require_string(record, "grupo_id", path, errors);
        guards::require_string(record, "data_limpeza", path, errors);
        guards::optional_string_array(record, "publicadores", path, errors);
        guards::optional_string(record, "familia", path, errors);
        guards::optional_string_array(record, "pendentes", path, errors);
        guards::optional_string(record, "observacoes", path, errors);
    }

    fn clean_record(
        record: &Map<String, Value>,
        path: &str,
        ctx: &mut CleanContext<'_>,
    ) -> ValidationOutcome<EscalaLimpeza> {
        let data_limpeza = match ctx.required_date(record, "data_limpeza", path) {
            Ok(data) => data,
            Err(e) => return ValidationOutcome::invalid(e),
        };

        let grupo_id = ctx.text(record, "grupo_id", path).unwrap_or_else(|| {
            ctx.warn(&format!("{}.grupo_id", path), "empty group id");
            String::new()
        });

        let mut crew: Vec<PersonRef> = Vec::new();
        let list_path = format!("{}.publicadores", path);
        match record.get("publicadores") {
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", list_path, i);
                    match item.as_str() {
                        Some(text) => crew.extend(ctx.resolve_names(text, &item_path)),
                        None => ctx.warn(&item_path, "ignored non-text entry"),
                    }
                }
            }
            // A single string is treated like the free-text family field
            Some(Value::String(text)) => crew.extend(ctx.resolve_names(text, &list_path)),
            Some(Value::Null) | None => {}
            Some(_) => ctx.warn(&list_path, "ignored, expected a list of names"),
        }

        if let Some(familia) = ctx.text(record, "familia", path) {
            let familia_path = format!("{}.familia", path);
            crew.extend(ctx.resolve_names(&familia, &familia_path));
        }

        if crew.is_empty() {
            ctx.warn(path, "no publicadores assigned");
        } else if !crew.iter().any(PersonRef::is_resolved) {
            ctx.warn(path, "none of the publicadores matched the roster");
        }

        let pendentes = crew
            .iter()
            .filter(|person| !person.is_resolved())
            .map(|person| person.nome.clone())
            .collect();
        let publicadores = crew
            .into_iter()
            .map(|person| if person.is_resolved() { person.id } else { person.nome })
            .collect();

        ValidationOutcome::Valid(EscalaLimpeza {
            grupo_id,
            data_limpeza,
            publicadores,
            pendentes,
            observacoes: ctx.text(record, "observacoes", path),
        })
    }
}

/// Structural validation of a raw cleaning payload
pub fn validate_schema(raw: &Value) -> SchemaReport {
    validators::validate_schema::<Limpeza>(raw)
}

/// Validate and clean a raw cleaning payload
pub fn validate_and_clean(
    raw: &Value,
    matcher: &dyn NameMatcher,
    dates: DateNormalizer,
) -> CleanResult<EscalaLimpeza> {
    cleaners::validate_and_clean::<Limpeza>(raw, matcher, dates)
}
