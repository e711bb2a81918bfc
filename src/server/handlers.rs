use super::extract::JsonBody;
use super::types::{
    HealthResponse, MolfileRequest, RecognizeStructureRequest, StructureResponse,
    ValidateSmilesRequest, ValidateSmilesResponse,
};
use crate::{
    Error,
    config::ServerConfig,
    service::{SmilesValidation, StructureService},
};
use axum::{extract::State, response::Json, response::Response};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub service: StructureService,
    pub expose_internal_errors: bool,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(service: StructureService) -> Self {
        Self::with_config(service, &ServerConfig::default())
    }

    pub fn with_config(service: StructureService, config: &ServerConfig) -> Self {
        Self {
            service,
            expose_internal_errors: config.expose_internal_errors,
            max_body_bytes: config.max_body_bytes,
        }
    }

    fn reject(&self, operation: &str, err: Error) -> Response {
        if err.kind().is_client_error() {
            warn!("Rejected {} request: {}", operation, err);
        } else {
            error!("Error in {}: {}", operation, err);
        }
        err.to_response(self.expose_internal_errors)
    }
}

type HandlerResult<T> = Result<Json<T>, Response>;

/// Returns the field value unless it is absent or blank.
fn required(field: Option<String>, missing: &str) -> Result<String, Error> {
    field
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| Error::validation(missing))
}

pub async fn validate_smiles(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ValidateSmilesRequest>,
) -> HandlerResult<ValidateSmilesResponse> {
    const OP: &str = "validate_smiles";

    let smiles = required(request.smiles, "No SMILES provided").map_err(|e| state.reject(OP, e))?;

    match state.service.validate_smiles(&smiles).await {
        Ok(SmilesValidation::Valid(record)) => {
            info!("Successfully validated SMILES and generated structure data");
            Ok(Json(ValidateSmilesResponse::valid(record)))
        }
        Ok(SmilesValidation::Invalid) => Ok(Json(ValidateSmilesResponse::invalid())),
        Err(e) => Err(state.reject(OP, e)),
    }
}

pub async fn recognize_structure(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RecognizeStructureRequest>,
) -> HandlerResult<StructureResponse> {
    const OP: &str = "recognize_structure";

    let image = required(request.image, "No image provided").map_err(|e| state.reject(OP, e))?;

    let record = state
        .service
        .recognize_structure(&image)
        .await
        .map_err(|e| state.reject(OP, e))?;

    info!("Successfully generated structure data from recognized image");
    Ok(Json(record.into()))
}

pub async fn molfile_to_structure(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<MolfileRequest>,
) -> HandlerResult<StructureResponse> {
    const OP: &str = "molfile_to_structure";

    let molfile =
        required(request.molfile, "No molfile provided").map_err(|e| state.reject(OP, e))?;

    let record = state
        .service
        .molfile_to_structure(&molfile)
        .await
        .map_err(|e| state.reject(OP, e))?;

    Ok(Json(StructureResponse::without_molblock(record)))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
