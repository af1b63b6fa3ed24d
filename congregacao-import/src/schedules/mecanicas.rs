//! Meeting mechanics designations ("designações mecânicas")
//!
//! Input: `{ "designacoes_mecanicas": [ { id?, data, tipo_reuniao, <role>?... } ] }`
//!
//! `tipo_reuniao` is a closed set. The validator rejects anything else; the
//! cleaner coerces unknown values to `meio_semana` and warns.

use crate::cleaners::{self, CleanContext};
use crate::types::{CleanResult, PersonRef, ScheduleDomain, SchemaReport, ValidationOutcome};
use crate::validators::{self, guards};
use congregacao_common::{DateNormalizer, NameMatcher};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Meeting kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoReuniao {
    #[default]
    MeioSemana,
    FimSemana,
}

impl TipoReuniao {
    pub const ALLOWED: [&'static str; 2] = ["meio_semana", "fim_semana"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TipoReuniao::MeioSemana => "meio_semana",
            TipoReuniao::FimSemana => "fim_semana",
        }
    }

    /// Exact wire value only
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "meio_semana" => Some(TipoReuniao::MeioSemana),
            "fim_semana" => Some(TipoReuniao::FimSemana),
            _ => None,
        }
    }
}

/// Role slots, in display order
pub const ROLES: [&str; 7] = [
    "presidente",
    "leitor",
    "indicador_entrada",
    "indicador_auditorio",
    "audio_video",
    "volante",
    "palco",
];

/// Designations for one meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignacaoMecanica {
    pub id: String,
    /// ISO date
    pub data: String,
    pub tipo_reuniao: TipoReuniao,
    pub presidente: Option<PersonRef>,
    pub leitor: Option<PersonRef>,
    pub indicador_entrada: Option<PersonRef>,
    pub indicador_auditorio: Option<PersonRef>,
    pub audio_video: Option<PersonRef>,
    pub volante: Option<PersonRef>,
    pub palco: Option<PersonRef>,
}

impl DesignacaoMecanica {
    fn assigned_roles(&self) -> usize {
        [
            &self.presidente,
            &self.leitor,
            &self.indicador_entrada,
            &self.indicador_auditorio,
            &self.audio_video,
            &self.volante,
            &self.palco,
        ]
        .iter()
        .filter(|slot| slot.is_some())
        .count()
    }
}

/// Mechanics schedule domain
pub struct Mecanicas;

impl ScheduleDomain for Mecanicas {
    type Record = DesignacaoMecanica;

    const ROOT_FIELD: &'static str = "designacoes_mecanicas";

    fn validate_record(record: &Map<String, Value>, path: &str, errors: &mut Vec<String>) {
        guards::optional_string(record, "id", path, errors);
        guards::require_string(record, "data", path, errors);
        guards::require_enum(record, "tipo_reuniao", &TipoReuniao::ALLOWED, path, errors);
        for role in ROLES {
            guards::optional_person(record, role, path, errors);
        }
    }

    fn clean_record(
        record: &Map<String, Value>,
        path: &str,
        ctx: &mut CleanContext<'_>,
    ) -> ValidationOutcome<DesignacaoMecanica> {
        let data = match ctx.required_date(record, "data", path) {
            Ok(data) => data,
            Err(e) => return ValidationOutcome::invalid(e),
        };

        let id = match ctx.text(record, "id", path) {
            Some(id) => id,
            None => {
                let generated = Uuid::new_v4().to_string();
                ctx.warn(&format!("{}.id", path), format!("missing id, generated {}", generated));
                generated
            }
        };

        let tipo_path = format!("{}.tipo_reuniao", path);
        let tipo_reuniao = match record.get("tipo_reuniao").and_then(Value::as_str) {
            Some(raw) => TipoReuniao::parse(raw).unwrap_or_else(|| {
                ctx.warn(
                    &tipo_path,
                    format!("unrecognized value \"{}\", coerced to meio_semana", raw),
                );
                TipoReuniao::MeioSemana
            }),
            None => {
                ctx.warn(&tipo_path, "missing value, defaulted to meio_semana");
                TipoReuniao::MeioSemana
            }
        };

        let designacao = DesignacaoMecanica {
            id,
            data,
            tipo_reuniao,
            presidente: ctx.person(record, "presidente", path),
            leitor: ctx.person(record, "leitor", path),
            indicador_entrada: ctx.person(record, "indicador_entrada", path),
            indicador_auditorio: ctx.person(record, "indicador_auditorio", path),
            audio_video: ctx.person(record, "audio_video", path),
            volante: ctx.person(record, "volante", path),
            palco: ctx.person(record, "palco", path),
        };

        if designacao.assigned_roles() == 0 {
            ctx.warn(path, "no roles assigned");
        }

        ValidationOutcome::Valid(designacao)
    }
}

/// Structural validation of a raw mechanics payload
pub fn validate_schema(raw: &Value) -> SchemaReport {
    validators::validate_schema::<Mecanicas>(raw)
}

/// Validate and clean a raw mechanics payload
pub fn validate_and_clean(
    raw: &Value,
    matcher: &dyn NameMatcher,
    dates: DateNormalizer,
) -> CleanResult<DesignacaoMecanica> {
    cleaners::validate_and_clean::<Mecanicas>(raw, matcher, dates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use congregacao_common::{RosterEntry, RosterIndex};
    use serde_json::json;

    fn roster() -> RosterIndex {
        RosterIndex::new(vec![
            RosterEntry::new("p1", "Vilson Fernandes"),
            RosterEntry::new("p2", "Célio Horn"),
        ])
    }

    fn dates() -> DateNormalizer {
        DateNormalizer::with_today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    #[test]
    fn test_unknown_meeting_kind_is_schema_error() {
        let raw = json!({"designacoes_mecanicas": [
            {"id": "m1", "data": "2024-10-09", "tipo_reuniao": "outro_tipo", "palco": "Célio Horn"}
        ]});
        let report = validate_schema(&raw);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("designacoes_mecanicas[0].tipo_reuniao"));
    }

    #[test]
    fn test_unknown_meeting_kind_is_coerced_by_cleaner() {
        let raw = json!({"designacoes_mecanicas": [
            {"id": "m1", "data": "2024-10-09", "tipo_reuniao": "outro_tipo", "palco": "Célio Horn"}
        ]});
        let result = validate_and_clean(&raw, &roster(), dates());

        assert!(result.valid);
        let cleaned = result.cleaned_data.unwrap();
        assert_eq!(cleaned[0].tipo_reuniao, TipoReuniao::MeioSemana);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("coerced to meio_semana"));
    }

    #[test]
    fn test_roles_resolved_and_id_generated() {
        let raw = json!({"designacoes_mecanicas": [{
            "data": "sábado, 12 de outubro",
            "tipo_reuniao": "fim_semana",
            "presidente": "Vilson Fernandes",
            "leitor": {"nome": "Célio Horn"},
            "volante": "Isolde",
            "audio_video": null
        }]});
        let result = validate_and_clean(&raw, &roster(), dates());
        let designacao = &result.cleaned_data.unwrap()[0];

        assert_eq!(designacao.data, "2024-10-12");
        assert_eq!(designacao.tipo_reuniao, TipoReuniao::FimSemana);
        assert!(Uuid::parse_str(&designacao.id).is_ok());
        assert_eq!(designacao.presidente, Some(PersonRef::new("p1", "Vilson Fernandes")));
        assert_eq!(designacao.leitor, Some(PersonRef::new("p2", "Célio Horn")));
        assert_eq!(designacao.volante, Some(PersonRef::new("", "Isolde")));
        assert_eq!(designacao.audio_video, None);

        // generated id + unresolved placeholder
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].starts_with("designacoes_mecanicas[0].id: missing id"));
        assert!(result.warnings[1].starts_with("designacoes_mecanicas[0].volante"));
    }

    #[test]
    fn test_missing_date_excludes_record() {
        let raw = json!({"designacoes_mecanicas": [
            {"id": "m1", "tipo_reuniao": "meio_semana", "leitor": "Célio Horn"},
            {"id": "m2", "data": "2024-10-09", "tipo_reuniao": "meio_semana", "leitor": "Célio Horn"}
        ]});
        let result = validate_and_clean(&raw, &roster(), dates());
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["designacoes_mecanicas[0].data: required date is missing"]);
        let cleaned = result.cleaned_data.unwrap();
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].id, "m2");
    }

    #[test]
    fn test_empty_designation_warns() {
        let raw = json!({"designacoes_mecanicas": [
            {"id": "m1", "data": "2024-10-09", "tipo_reuniao": "meio_semana"}
        ]});
        let result = validate_and_clean(&raw, &roster(), dates());
        assert_eq!(result.warnings, vec!["designacoes_mecanicas[0]: no roles assigned"]);
    }

    #[test]
    fn test_cleaned_designation_is_not_rediagnosed() {
        let raw = json!({"designacoes_mecanicas": [
            {"id": "m1", "data": "2024-10-09", "tipo_reuniao": "meio_semana"},
            {"id": "m2", "data": "2024-10-12", "tipo_reuniao": "fim_semana", "palco": "Isolde"}
        ]});
        let first = validate_and_clean(&raw, &roster(), dates());
        assert_eq!(first.warnings.len(), 2);

        let cleaned = first.cleaned_data.unwrap();
        let again = json!({"designacoes_mecanicas": serde_json::to_value(&cleaned).unwrap()});
        let second = validate_and_clean(&again, &roster(), dates());
        assert!(second.warnings.is_empty(), "{:?}", second.warnings);
        assert_eq!(second.cleaned_data.unwrap(), cleaned);
    }

    #[test]
    fn test_serialized_meeting_kind() {
        let value = serde_json::to_value(TipoReuniao::FimSemana).unwrap();
        assert_eq!(value, json!("fim_semana"));
        assert_eq!(TipoReuniao::default().as_str(), "meio_semana");
    }
}
