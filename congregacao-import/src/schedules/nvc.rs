//! Weekly Christian Life and Ministry program ("Nossa Vida e Ministério Cristão")
//!
//! Input: `{ "nossa_vida_crista": [ Week, ... ] }`, one element per calendar week.
//!
//! # Week structure
//! - `periodo`, `leituraBiblica`, `presidente`
//! - `oracoes { inicial, final }`, `canticos { inicial, intermediario, final }`
//! - `tesourosPalavra { titulo, duracao, responsavel, joiasEspirituais?, leituraBiblica? }`
//! - `facaSeuMelhor`: 1 to 4 ministry parts
//! - `nossaVidaCrista`: 1 to 3 Christian living parts
//! - `eventoEspecial`, `semanaVisitaSuperintendente`, `diaTerca`
//!
//! # Special events
//! A week with a truthy `eventoEspecial` (assembly, Memorial, convention) has
//! no regular program: only the type of `eventoEspecial` is checked and no
//! other field is required. Truthy means any non-empty string, `true`, a
//! non-zero number, an array or an object. A special event without a usable
//! name is labelled [`EVENTO_SEM_NOME`] by the cleaner.
//!
//! # Circuit overseer visit
//! In a visit week the midweek meeting moves to Tuesday (`diaTerca`) and the
//! overseer's service talk takes the congregation Bible study slot. With
//! either flag set the study part is not expected; in every other regular
//! week it is.

use crate::cleaners::{self, CleanContext};
use crate::types::{CleanResult, PersonRef, ScheduleDomain, SchemaReport, ValidationOutcome};
use crate::validators::{self, guards};
use congregacao_common::{DateNormalizer, NameMatcher};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum "Faça seu melhor no ministério" parts per week
pub const MAX_PARTES_MINISTERIO: usize = 4;
/// Maximum "Nossa vida cristã" parts per week
pub const MAX_PARTES_VIDA_CRISTA: usize = 3;

/// Opening and closing prayers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oracoes {
    pub inicial: Option<PersonRef>,
    #[serde(rename = "final")]
    pub final_: Option<PersonRef>,
}

/// Song numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canticos {
    pub inicial: Option<String>,
    pub intermediario: Option<String>,
    #[serde(rename = "final")]
    pub final_: Option<String>,
}

/// Sub-part of "Tesouros da Palavra de Deus"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubParte {
    pub duracao: Option<u32>,
    /// Scripture range (Bible reading only)
    pub texto: Option<String>,
    pub responsavel: Option<PersonRef>,
}

/// "Tesouros da Palavra de Deus"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TesourosPalavra {
    pub titulo: Option<String>,
    pub duracao: Option<u32>,
    pub responsavel: Option<PersonRef>,
    pub joias_espirituais: Option<SubParte>,
    pub leitura_biblica: Option<SubParte>,
}

/// "Faça seu melhor no ministério" part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParteMinisterio {
    pub tipo: String,
    pub duracao: Option<u32>,
    pub descricao: Option<String>,
    pub responsavel: Option<PersonRef>,
    pub ajudante: Option<PersonRef>,
}

/// "Nossa vida cristã" part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParteVidaCrista {
    pub tipo: String,
    pub duracao: Option<u32>,
    pub titulo: Option<String>,
    pub responsavel: Option<PersonRef>,
    /// Reader for the congregation Bible study
    pub leitor: Option<PersonRef>,
}

impl ParteVidaCrista {
    /// Congregation Bible study ("Estudo bíblico de congregação")
    pub fn is_estudo_biblico(&self) -> bool {
        self.tipo.to_lowercase().contains("estudo")
    }
}

/// One program week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanaNvc {
    pub periodo: String,
    /// ISO date of the first day, derived from `periodo`
    pub data_inicio: Option<String>,
    pub leitura_biblica: Option<String>,
    pub presidente: Option<PersonRef>,
    pub oracoes: Option<Oracoes>,
    pub canticos: Option<Canticos>,
    pub tesouros_palavra: Option<TesourosPalavra>,
    pub faca_seu_melhor: Option<Vec<ParteMinisterio>>,
    pub nossa_vida_crista: Option<Vec<ParteVidaCrista>>,
    pub evento_especial: Option<String>,
    pub semana_visita_superintendente: bool,
    pub dia_terca: bool,
}

/// Label for a special event that arrived without a name
pub const EVENTO_SEM_NOME: &str = "Evento especial";

/// True when `eventoEspecial` cancels the regular program
fn has_special_event(record: &Map<String, Value>) -> bool {
    match record.get("eventoEspecial") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Name of the special event, if the week has one
fn clean_special_event(
    record: &Map<String, Value>,
    path: &str,
    ctx: &mut CleanContext<'_>,
) -> Option<String> {
    if !has_special_event(record) {
        return None;
    }
    let field_path = format!("{}.eventoEspecial", path);
    match record.get("eventoEspecial") {
        Some(Value::String(s)) => match cleaners::non_empty(s) {
            Some(name) => Some(name),
            None => {
                ctx.warn(&field_path, format!("blank special event, labelled \"{}\"", EVENTO_SEM_NOME));
                Some(EVENTO_SEM_NOME.to_string())
            }
        },
        other => {
            let kind = other.map_or("null", guards::type_name);
            ctx.warn(
                &field_path,
                format!("{} value instead of a name, labelled \"{}\"", kind, EVENTO_SEM_NOME),
            );
            Some(EVENTO_SEM_NOME.to_string())
        }
    }
}

// ============================================================================
// Structural validation
// ============================================================================

fn validate_tesouros(tesouros: &Map<String, Value>, path: &str, errors: &mut Vec<String>) {
    guards::optional_string(tesouros, "titulo", path, errors);
    guards::optional_text_or_number(tesouros, "duracao", path, errors);
    guards::optional_person(tesouros, "responsavel", path, errors);

    let joias_path = format!("{}.joiasEspirituais", path);
    if let Some(joias) = guards::optional_object(tesouros, "joiasEspirituais", path, errors) {
        guards::optional_text_or_number(joias, "duracao", &joias_path, errors);
        guards::optional_person(joias, "responsavel", &joias_path, errors);
    }

    let leitura_path = format!("{}.leituraBiblica", path);
    if let Some(leitura) = guards::optional_object(tesouros, "leituraBiblica", path, errors) {
        guards::optional_text_or_number(leitura, "duracao", &leitura_path, errors);
        guards::optional_string(leitura, "texto", &leitura_path, errors);
        guards::optional_person(leitura, "responsavel", &leitura_path, errors);
    }
}

fn validate_parts(
    parts: &[Value],
    path: &str,
    people: &[&str],
    errors: &mut Vec<String>,
) {
    for (i, part) in parts.iter().enumerate() {
        let part_path = format!("{}[{}]", path, i);
        let Some(part) = part.as_object() else {
            errors.push(format!(
                "{}: expected object, got {}",
                part_path,
                guards::type_name(part)
            ));
            continue;
        };
        guards::require_string(part, "tipo", &part_path, errors);
        guards::optional_text_or_number(part, "duracao", &part_path, errors);
        guards::optional_string(part, "descricao", &part_path, errors);
        guards::optional_string(part, "titulo", &part_path, errors);
        for field in people {
            guards::optional_person(part, field, &part_path, errors);
        }
    }
}

// ============================================================================
// Cleaning
// ============================================================================

fn clean_oracoes(record: &Map<String, Value>, path: &str, ctx: &mut CleanContext<'_>) -> Option<Oracoes> {
    let oracoes = record.get("oracoes")?.as_object()?;
    let path = format!("{}.oracoes", path);
    Some(Oracoes {
        inicial: ctx.person(oracoes, "inicial", &path),
        final_: ctx.person(oracoes, "final", &path),
    })
}

fn clean_canticos(record: &Map<String, Value>, path: &str, ctx: &mut CleanContext<'_>) -> Option<Canticos> {
    let canticos = record.get("canticos")?.as_object()?;
    let path = format!("{}.canticos", path);
    Some(Canticos {
        inicial: ctx.song_number(canticos, "inicial", &path),
        intermediario: ctx.song_number(canticos, "intermediario", &path),
        final_: ctx.song_number(canticos, "final", &path),
    })
}

fn clean_sub_parte(
    parent: &Map<String, Value>,
    field: &str,
    path: &str,
    ctx: &mut CleanContext<'_>,
) -> Option<SubParte> {
    let sub = parent.get(field)?.as_object()?;
    let path = format!("{}.{}", path, field);
    Some(SubParte {
        duracao: ctx.minutes(sub, "duracao", &path),
        texto: ctx.text(sub, "texto", &path),
        responsavel: ctx.person(sub, "responsavel", &path),
    })
}

fn clean_tesouros(
    record: &Map<String, Value>,
    path: &str,
    ctx: &mut CleanContext<'_>,
) -> Option<TesourosPalavra> {
    let tesouros = record.get("tesourosPalavra")?.as_object()?;
    let path = format!("{}.tesourosPalavra", path);
    Some(TesourosPalavra {
        titulo: ctx.text(tesouros, "titulo", &path),
        duracao: ctx.minutes(tesouros, "duracao", &path),
        responsavel: ctx.person(tesouros, "responsavel", &path),
        joias_espirituais: clean_sub_parte(tesouros, "joiasEspirituais", &path, ctx),
        leitura_biblica: clean_sub_parte(tesouros, "leituraBiblica", &path, ctx),
    })
}

/// Shared list handling: drop non-objects, truncate to `max`, empty → None
fn clean_part_list<T>(
    record: &Map<String, Value>,
    field: &str,
    max: usize,
    path: &str,
    ctx: &mut CleanContext<'_>,
    mut clean_part: impl FnMut(&Map<String, Value>, String, &str, &mut CleanContext<'_>) -> T,
) -> Option<Vec<T>> {
    let items = record.get(field)?.as_array()?;
    let list_path = format!("{}.{}", path, field);
    let mut parts = Vec::new();

    for (i, item) in items.iter().enumerate() {
        let part_path = format!("{}[{}]", list_path, i);
        if parts.len() == max {
            ctx.warn(&part_path, format!("more than {} parts, extra part dropped", max));
            continue;
        }
        let Some(part) = item.as_object() else {
            ctx.warn(&part_path, "ignored, expected a part object");
            continue;
        };
        let Some(tipo) = part.get("tipo").and_then(Value::as_str).and_then(cleaners::non_empty)
        else {
            ctx.warn(&part_path, "part without tipo dropped");
            continue;
        };
        parts.push(clean_part(part, tipo, &part_path, ctx));
    }

    if parts.is_empty() {
        ctx.warn(&list_path, "no usable parts, left empty");
        None
    } else {
        Some(parts)
    }
}

fn clean_required_bool(
    record: &Map<String, Value>,
    field: &str,
    path: &str,
    special: bool,
    ctx: &mut CleanContext<'_>,
) -> Result<bool, String> {
    match record.get(field) {
        Some(Value::Bool(flag)) => Ok(*flag),
        _ if special => {
            ctx.warn(&format!("{}.{}", path, field), "missing flag, defaulted to false");
            Ok(false)
        }
        Some(Value::Null) | None => Err(format!("{}.{}: required boolean is missing", path, field)),
        Some(other) => Err(format!(
            "{}.{}: expected boolean, got {}",
            path,
            field,
            guards::type_name(other)
        )),
    }
}

/// Weekly program domain
pub struct Nvc;

impl ScheduleDomain for Nvc {
    type Record = SemanaNvc;

    const ROOT_FIELD: &'static str = "nossa_vida_crista";

    fn validate_record(record: &Map<String, Value>, path: &str, errors: &mut Vec<String>) {
        guards::optional_string(record, "eventoEspecial", path, errors);
        if has_special_event(record) {
            return;
        }

        guards::require_string(record, "periodo", path, errors);
        guards::require_bool(record, "semanaVisitaSuperintendente", path, errors);
        guards::require_bool(record, "diaTerca", path, errors);
        guards::optional_string(record, "leituraBiblica", path, errors);
        guards::optional_person(record, "presidente", path, errors);

        let oracoes_path = format!("{}.oracoes", path);
        if let Some(oracoes) = guards::optional_object(record, "oracoes", path, errors) {
            guards::optional_person(oracoes, "inicial", &oracoes_path, errors);
            guards::optional_person(oracoes, "final", &oracoes_path, errors);
        }

        let canticos_path = format!("{}.canticos", path);
        if let Some(canticos) = guards::optional_object(record, "canticos", path, errors) {
            for field in ["inicial", "intermediario", "final"] {
                guards::optional_text_or_number(canticos, field, &canticos_path, errors);
            }
        }

        let tesouros_path = format!("{}.tesourosPalavra", path);
        if let Some(tesouros) = guards::optional_object(record, "tesourosPalavra", path, errors) {
            validate_tesouros(tesouros, &tesouros_path, errors);
        }

        if let Some(parts) = guards::optional_array(
            record,
            "facaSeuMelhor",
            1..=MAX_PARTES_MINISTERIO,
            path,
            errors,
        ) {
            let parts_path = format!("{}.facaSeuMelhor", path);
            validate_parts(parts, &parts_path, &["responsavel", "ajudante"], errors);
        }

        if let Some(parts) = guards::optional_array(
            record,
            "nossaVidaCrista",
            1..=MAX_PARTES_VIDA_CRISTA,
            path,
            errors,
        ) {
            let parts_path = format!("{}.nossaVidaCrista", path);
            validate_parts(parts, &parts_path, &["responsavel", "leitor"], errors);
        }
    }

    fn clean_record(
        record: &Map<String, Value>,
        path: &str,
        ctx: &mut CleanContext<'_>,
    ) -> ValidationOutcome<SemanaNvc> {
        let evento_especial = clean_special_event(record, path, ctx);
        let special = evento_especial.is_some();

        let periodo = match ctx.text(record, "periodo", path) {
            Some(periodo) => Ok(periodo),
            None if special => Ok(String::new()),
            None => Err(format!("{}.periodo: required text is missing or empty", path)),
        };
        let visita = clean_required_bool(record, "semanaVisitaSuperintendente", path, special, ctx);
        let dia_terca = clean_required_bool(record, "diaTerca", path, special, ctx);

        let (periodo, visita, dia_terca) = match (periodo, visita, dia_terca) {
            (Ok(p), Ok(v), Ok(d)) => (p, v, d),
            (p, v, d) => {
                return ValidationOutcome::Invalid(
                    [p.err(), v.err(), d.err()].into_iter().flatten().collect(),
                )
            }
        };

        let data_inicio = if periodo.is_empty() {
            None
        } else {
            match ctx.dates().parse_week_start(&periodo) {
                Some(date) => Some(date.format("%Y-%m-%d").to_string()),
                None => {
                    ctx.warn(
                        &format!("{}.periodo", path),
                        format!("could not derive the week start from \"{}\"", periodo),
                    );
                    None
                }
            }
        };

        let semana = SemanaNvc {
            periodo,
            data_inicio,
            leitura_biblica: ctx.text(record, "leituraBiblica", path),
            presidente: ctx.person(record, "presidente", path),
            oracoes: clean_oracoes(record, path, ctx),
            canticos: clean_canticos(record, path, ctx),
            tesouros_palavra: clean_tesouros(record, path, ctx),
            faca_seu_melhor: clean_part_list(
                record,
                "facaSeuMelhor",
                MAX_PARTES_MINISTERIO,
                path,
                ctx,
                |part, tipo, part_path, ctx| ParteMinisterio {
                    tipo,
                    duracao: ctx.minutes(part, "duracao", part_path),
                    descricao: ctx.text(part, "descricao", part_path),
                    responsavel: ctx.person(part, "responsavel", part_path),
                    ajudante: ctx.person(part, "ajudante", part_path),
                },
            ),
            nossa_vida_crista: clean_part_list(
                record,
                "nossaVidaCrista",
                MAX_PARTES_VIDA_CRISTA,
                path,
                ctx,
                |part, tipo, part_path, ctx| ParteVidaCrista {
                    tipo,
                    duracao: ctx.minutes(part, "duracao", part_path),
                    titulo: ctx.text(part, "titulo", part_path),
                    responsavel: ctx.person(part, "responsavel", part_path),
                    leitor: ctx.person(part, "leitor", part_path),
                },
            ),
            evento_especial,
            semana_visita_superintendente: visita,
            dia_terca,
        };

        if !special {
            check_bible_study_slot(&semana, path, ctx);
        }

        ValidationOutcome::Valid(semana)
    }
}

/// The study slot depends on the overseer visit and Tuesday meeting flags
fn check_bible_study_slot(semana: &SemanaNvc, path: &str, ctx: &mut CleanContext<'_>) {
    let Some(parts) = &semana.nossa_vida_crista else {
        return;
    };
    let estudo = parts.iter().position(ParteVidaCrista::is_estudo_biblico);
    let parts_path = format!("{}.nossaVidaCrista", path);
    let replaced = semana.semana_visita_superintendente || semana.dia_terca;

    match (replaced, estudo) {
        (true, Some(i)) if semana.semana_visita_superintendente => ctx.warn(
            &format!("{}[{}]", parts_path, i),
            "congregation Bible study listed in a circuit overseer visit week",
        ),
        (true, Some(i)) => ctx.warn(
            &format!("{}[{}]", parts_path, i),
            "congregation Bible study listed in a Tuesday meeting week",
        ),
        (false, None) => ctx.warn(&parts_path, "congregation Bible study is missing"),
        (false, Some(i)) if parts[i].leitor.is_none() => ctx.warn(
            &format!("{}[{}].leitor", parts_path, i),
            "congregation Bible study has no reader",
        ),
        _ => {}
    }
}

/// Structural validation of a raw weekly program payload
pub fn validate_schema(raw: &Value) -> SchemaReport {
    validators::validate_schema::<Nvc>(raw)
}

/// Validate and clean a raw weekly program payload
pub fn validate_and_clean(
    raw: &Value,
    matcher: &dyn NameMatcher,
    dates: DateNormalizer,
) -> CleanResult<SemanaNvc> {
    cleaners::validate_and_clean::<Nvc>(raw, matcher, dates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use congregacao_common::{RosterEntry, RosterIndex};
    use serde_json::json;

    fn roster() -> RosterIndex {
        RosterIndex::new(vec![
            RosterEntry::new("p1", "Célio Horn"),
            RosterEntry::new("p2", "Vilson Fernandes"),
            RosterEntry::new("p3", "Loni Fernandes"),
            RosterEntry::new("p4", "Paulo Souza"),
        ])
    }

    fn dates() -> DateNormalizer {
        DateNormalizer::with_today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    fn full_week() -> Value {
        json!({
            "periodo": "6-12 de outubro",
            "leituraBiblica": "Isaías 58-59",
            "presidente": "Célio Horn",
            "oracoes": {"inicial": "Vilson Fernandes", "final": {"nome": "Paulo Souza"}},
            "canticos": {"inicial": "Cântico 45", "intermediario": 12, "final": "150"},
            "tesourosPalavra": {
                "titulo": "Proclame a liberdade",
                "duracao": "10 min",
                "responsavel": "Paulo Souza",
                "joiasEspirituais": {"duracao": 10, "responsavel": "Célio Horn"},
                "leituraBiblica": {"duracao": 4, "texto": "Is 58:1-14", "responsavel": "Vilson Fernandes"}
            },
            "facaSeuMelhor": [
                {"tipo": "iniciando_conversas", "duracao": 3, "responsavel": "Loni Fernandes", "ajudante": "Maria Souza"}
            ],
            "nossaVidaCrista": [
                {"tipo": "parte_local", "duracao": 15, "titulo": "Necessidades locais", "responsavel": "Célio Horn"},
                {"tipo": "estudo_biblico_congregacao", "duracao": 30, "responsavel": "Paulo Souza", "leitor": "Vilson Fernandes"}
            ],
            "eventoEspecial": null,
            "semanaVisitaSuperintendente": false,
            "diaTerca": false
        })
    }

    #[test]
    fn test_full_week_validates() {
        let report = validate_schema(&json!({"nossa_vida_crista": [full_week()]}));
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn test_full_week_cleans() {
        let raw = json!({"nossa_vida_crista": [full_week()]});
        let result = validate_and_clean(&raw, &roster(), dates());
        assert!(result.valid);

        // only the helper is unknown
        assert_eq!(
            result.warnings,
            vec!["nossa_vida_crista[0].facaSeuMelhor[0].ajudante: \"Maria Souza\" not found in roster, kept as placeholder"]
        );

        let semana = &result.cleaned_data.unwrap()[0];
        assert_eq!(semana.data_inicio.as_deref(), Some("2024-10-06"));
        assert_eq!(semana.presidente, Some(PersonRef::new("p1", "Célio Horn")));
        let oracoes = semana.oracoes.as_ref().unwrap();
        assert_eq!(oracoes.final_, Some(PersonRef::new("p4", "Paulo Souza")));
        let canticos = semana.canticos.as_ref().unwrap();
        assert_eq!(canticos.inicial.as_deref(), Some("45"));
        assert_eq!(canticos.intermediario.as_deref(), Some("12"));
        let tesouros = semana.tesouros_palavra.as_ref().unwrap();
        assert_eq!(tesouros.duracao, Some(10));
        assert_eq!(
            tesouros.leitura_biblica.as_ref().unwrap().responsavel,
            Some(PersonRef::new("p2", "Vilson Fernandes"))
        );
        let ministerio = semana.faca_seu_melhor.as_ref().unwrap();
        assert_eq!(ministerio[0].ajudante, Some(PersonRef::new("", "Maria Souza")));
        let vida = semana.nossa_vida_crista.as_ref().unwrap();
        assert_eq!(vida[1].leitor, Some(PersonRef::new("p2", "Vilson Fernandes")));
    }

    #[test]
    fn test_special_event_short_circuit() {
        let special = json!({"nossa_vida_crista": [{
            "eventoEspecial": "Assembleia de circuito",
            "periodo": null, "presidente": null, "oracoes": null, "canticos": null,
            "tesourosPalavra": null, "facaSeuMelhor": null, "nossaVidaCrista": null,
            "semanaVisitaSuperintendente": null, "diaTerca": null
        }]});
        assert!(validate_schema(&special).valid);

        let regular = json!({"nossa_vida_crista": [{
            "periodo": null, "presidente": null, "oracoes": null, "canticos": null,
            "tesourosPalavra": null, "facaSeuMelhor": null, "nossaVidaCrista": null,
            "semanaVisitaSuperintendente": null, "diaTerca": null
        }]});
        let report = validate_schema(&regular);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors[0].starts_with("nossa_vida_crista[0].periodo"));
    }

    #[test]
    fn test_special_event_wrong_type() {
        let raw = json!({"nossa_vida_crista": [{"eventoEspecial": 5}]});
        let report = validate_schema(&raw);
        assert_eq!(
            report.errors,
            vec!["nossa_vida_crista[0].eventoEspecial: expected string or null, got number"]
        );

        let raw = json!({"nossa_vida_crista": [{"eventoEspecial": true}]});
        assert_eq!(validate_schema(&raw).errors.len(), 1);
    }

    #[test]
    fn test_falsy_special_event_keeps_regular_rules() {
        for evento in [json!(false), json!(0), json!("")] {
            let raw = json!({"nossa_vida_crista": [{"eventoEspecial": evento}]});
            let report = validate_schema(&raw);
            assert!(
                report.errors.iter().any(|e| e.contains(".periodo")),
                "{:?}",
                report.errors
            );
        }
    }

    #[test]
    fn test_blank_special_event_still_short_circuits() {
        let raw = json!({"nossa_vida_crista": [{"eventoEspecial": "   "}]});
        let report = validate_schema(&raw);
        assert!(report.valid, "{:?}", report.errors);

        let result = validate_and_clean(&raw, &roster(), dates());
        assert!(result.valid, "{:?}", result.errors);
        let semana = &result.cleaned_data.unwrap()[0];
        assert_eq!(semana.evento_especial.as_deref(), Some(EVENTO_SEM_NOME));
        assert_eq!(semana.periodo, "");
        assert_eq!(
            result.warnings[0],
            "nossa_vida_crista[0].eventoEspecial: blank special event, labelled \"Evento especial\""
        );
    }

    #[test]
    fn test_non_text_special_event_is_labelled() {
        let raw = json!({"nossa_vida_crista": [{"eventoEspecial": true}]});
        let result = validate_and_clean(&raw, &roster(), dates());
        assert!(result.valid, "{:?}", result.errors);
        let semana = &result.cleaned_data.unwrap()[0];
        assert_eq!(semana.evento_especial.as_deref(), Some(EVENTO_SEM_NOME));
        assert!(result.warnings[0].contains("boolean value instead of a name"));
    }

    #[test]
    fn test_special_event_cleans_with_defaults() {
        let raw = json!({"nossa_vida_crista": [{"eventoEspecial": " Celebração ", "periodo": "14-20 de abril"}]});
        let result = validate_and_clean(&raw, &roster(), dates());
        assert!(result.valid, "{:?}", result.errors);
        let semana = &result.cleaned_data.unwrap()[0];
        assert_eq!(semana.evento_especial.as_deref(), Some("Celebração"));
        assert_eq!(semana.data_inicio.as_deref(), Some("2024-04-14"));
        assert!(!semana.semana_visita_superintendente);
        assert!(semana.nossa_vida_crista.is_none());
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_regular_week_missing_flags_excluded() {
        let raw = json!({"nossa_vida_crista": [
            {"periodo": "6-12 de outubro", "diaTerca": "sim"},
            full_week()
        ]});
        let result = validate_and_clean(&raw, &roster(), dates());
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                "nossa_vida_crista[0].semanaVisitaSuperintendente: required boolean is missing",
                "nossa_vida_crista[0].diaTerca: expected boolean, got string",
            ]
        );
        assert_eq!(result.cleaned_data.unwrap().len(), 1);
    }

    #[test]
    fn test_part_list_bounds() {
        let mut week = full_week();
        week["facaSeuMelhor"] = json!([
            {"tipo": "a"}, {"tipo": "b"}, {"tipo": "c"}, {"tipo": "d"}, {"tipo": "e"}
        ]);
        week["nossaVidaCrista"] = json!([]);
        let raw = json!({"nossa_vida_crista": [week]});

        let report = validate_schema(&raw);
        assert_eq!(
            report.errors,
            vec![
                "nossa_vida_crista[0].facaSeuMelhor: expected 1 to 4 items, got 5",
                "nossa_vida_crista[0].nossaVidaCrista: expected 1 to 3 items, got 0",
            ]
        );

        let result = validate_and_clean(&raw, &roster(), dates());
        let semana = &result.cleaned_data.unwrap()[0];
        assert_eq!(semana.faca_seu_melhor.as_ref().unwrap().len(), 4);
        assert!(semana.nossa_vida_crista.is_none());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.starts_with("nossa_vida_crista[0].facaSeuMelhor[4]")));
    }

    #[test]
    fn test_nested_optional_objects_validated_only_when_present() {
        let mut week = full_week();
        week["tesourosPalavra"] = json!({"titulo": "T", "joiasEspirituais": null, "leituraBiblica": {"responsavel": 3}});
        let report = validate_schema(&json!({"nossa_vida_crista": [week]}));
        assert_eq!(
            report.errors,
            vec!["nossa_vida_crista[0].tesourosPalavra.leituraBiblica.responsavel: expected person (string or object), got number"]
        );
    }

    #[test]
    fn test_overseer_visit_week_study_slot() {
        let mut week = full_week();
        week["semanaVisitaSuperintendente"] = json!(true);
        week["diaTerca"] = json!(true);
        let result = validate_and_clean(&json!({"nossa_vida_crista": [week]}), &roster(), dates());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("circuit overseer visit week")));

        let mut week = full_week();
        week["nossaVidaCrista"] = json!([{"tipo": "parte_local", "responsavel": "Célio Horn"}]);
        let result = validate_and_clean(&json!({"nossa_vida_crista": [week]}), &roster(), dates());
        assert!(result
            .warnings
            .iter()
            .any(|w| w == "nossa_vida_crista[0].nossaVidaCrista: congregation Bible study is missing"));
    }

    #[test]
    fn test_tuesday_meeting_replaces_study_slot() {
        let mut week = full_week();
        week["diaTerca"] = json!(true);
        week["nossaVidaCrista"] = json!([{"tipo": "parte_local", "responsavel": "Célio Horn"}]);
        let result = validate_and_clean(&json!({"nossa_vida_crista": [week]}), &roster(), dates());
        assert!(
            !result.warnings.iter().any(|w| w.contains("Bible study")),
            "{:?}",
            result.warnings
        );

        let mut week = full_week();
        week["diaTerca"] = json!(true);
        let result = validate_and_clean(&json!({"nossa_vida_crista": [week]}), &roster(), dates());
        assert!(result
            .warnings
            .iter()
            .any(|w| w == "nossa_vida_crista[0].nossaVidaCrista[1]: congregation Bible study listed in a Tuesday meeting week"));
    }

    #[test]
    fn test_cleaned_week_is_not_rediagnosed() {
        let raw = json!({"nossa_vida_crista": [{
            "periodo": "Semana especial",
            "semanaVisitaSuperintendente": false,
            "diaTerca": false,
            "nossaVidaCrista": [{"tipo": "parte_local", "responsavel": "Ana"}]
        }]});
        let first = validate_and_clean(&raw, &roster(), dates());
        assert_eq!(first.warnings.len(), 3, "{:?}", first.warnings);

        let cleaned = first.cleaned_data.unwrap();
        let again = json!({"nossa_vida_crista": serde_json::to_value(&cleaned).unwrap()});
        let second = validate_and_clean(&again, &roster(), dates());
        assert!(second.warnings.is_empty(), "{:?}", second.warnings);
        assert_eq!(second.cleaned_data.unwrap(), cleaned);
    }
}
