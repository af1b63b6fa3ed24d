//! Public talks ("discursos")
//!
//! Input: `{ "discursos": [ { data, orador, tema, cantico?, hospitalidade?, congregacao? } ] }`
//!
//! `orador`, `tema` and `data` are mandatory. Visiting speakers are usually
//! not on the local roster, so names here are kept as given.

use crate::cleaners::{self, CleanContext};
use crate::types::{CleanResult, ScheduleDomain, SchemaReport, ValidationOutcome};
use crate::validators::{self, guards};
use congregacao_common::{DateNormalizer, NameMatcher};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One scheduled public talk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discurso {
    /// ISO date
    pub data: String,
    pub orador: String,
    pub tema: String,
    pub cantico: Option<String>,
    /// Family hosting the speaker
    pub hospitalidade: Option<String>,
    /// Speaker's home congregation
    pub congregacao: Option<String>,
}

/// Talks schedule domain
pub struct Discursos;

impl ScheduleDomain for Discursos {
    type Record = Discurso;

    const ROOT_FIELD: &'static str = "discursos";

    fn validate_record(record: &Map<String, Value>, path: &str, errors: &mut Vec<String>) {
        guards::require_string(record, "data", path, errors);
        guards::require_string(record, "orador", path, errors);
        guards::require_string(record, "tema", path, errors);
        guards::optional_text_or_number(record, "cantico", path, errors);
        guards::optional_string(record, "hospitalidade", path, errors);
        guards::optional_string(record, "congregacao", path, errors);
    }

    fn clean_record(
        record: &Map<String, Value>,
        path: &str,
        ctx: &mut CleanContext<'_>,
    ) -> ValidationOutcome<Discurso> {
        let data = ctx.required_date(record, "data", path);
        let orador = ctx.required_text(record, "orador", path);
        let tema = ctx.required_text(record, "tema", path);

        match (data, orador, tema) {
            (Ok(data), Ok(orador), Ok(tema)) => ValidationOutcome::Valid(Discurso {
                data,
                orador,
                tema,
                cantico: ctx.song_number(record, "cantico", path),
                hospitalidade: ctx.text(record, "hospitalidade", path),
                congregacao: ctx.text(record, "congregacao", path),
            }),
            (data, orador, tema) => ValidationOutcome::Invalid(
                [data.err(), orador.err(), tema.err()]
                    .into_iter()
                    .flatten()
                    .collect(),
            ),
        }
    }
}

/// Structural validation of a raw talks payload
pub fn validate_schema(raw: &Value) -> SchemaReport {
    validators::validate_schema::<Discursos>(raw)
}

/// Validate and clean a raw talks payload
pub fn validate_and_clean(
    raw: &Value,
    matcher: &dyn NameMatcher,
    dates: DateNormalizer,
) -> CleanResult<Discurso> {
    cleaners::validate_and_clean::<Discursos>(raw, matcher, dates)
}
