//! Import API handlers
//!
//! POST /import/:dominio        validate + clean, returns `ImportReport`
//! POST /import/:dominio/schema structural validation only

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::post,
    Json, Router,
};
use serde_json::Value;

use crate::{
    error::{ApiError, ApiResult},
    pipeline::{ImportDomain, ImportReport},
    types::SchemaReport,
    AppState,
};

/// POST /import/:dominio
///
/// Always 200 once the domain is known: blocking problems are listed in
/// `errors`, informational ones in `warnings`.
pub async fn import_schedule(
    State(state): State<AppState>,
    Path(dominio): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ImportReport>> {
    let domain: ImportDomain = dominio.parse()?;
    let raw = json_body(body)?;

    tracing::debug!(domain = %domain, "Import request received");

    let importer = state.importer.clone();
    Ok(Json(importer.run(domain, &raw)))
}

/// POST /import/:dominio/schema
pub async fn validate_schedule(
    State(state): State<AppState>,
    Path(dominio): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SchemaReport>> {
    let domain: ImportDomain = dominio.parse()?;
    let raw = json_body(body)?;
    Ok(Json(state.importer.validate(domain, &raw)))
}

/// Unreadable bodies become a 400 with the standard error envelope
fn json_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    body.map(|Json(raw)| raw)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/import/:dominio", post(import_schedule))
        .route("/import/:dominio/schema", post(validate_schedule))
}
