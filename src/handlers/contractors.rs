use super::common::{
    created_response, map_service_error, success_response, validate_input, PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::contractors::{CreateContractorRequest, UpdateContractorRequest},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use tracing::info;
use uuid::Uuid;

/// Register a contractor
async fn create_contractor(
    State(state): State<AppState>,
    Json(payload): Json<CreateContractorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let contractor = state
        .services
        .contractors
        .create_contractor(payload)
        .await
        .map_err(map_service_error)?;

    info!("Contractor created: {}", contractor.id);

    Ok(created_response(contractor))
}

/// Get a contractor by ID
async fn get_contractor(
    State(state): State<AppState>,
    Path(contractor_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let contractor = state
        .services
        .contractors
        .get_contractor(contractor_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Contractor {} not found", contractor_id)))?;

    Ok(success_response(contractor))
}

/// Snapshot of a contractor's derived aggregate statistics
async fn get_contractor_summary(
    State(state): State<AppState>,
    Path(contractor_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let contractor = state
        .services
        .contractors
        .get_contractor(contractor_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Contractor {} not found", contractor_id)))?;

    Ok(success_response(serde_json::json!({
        "id": contractor.id,
        "name": contractor.name,
        "total_contracts": contractor.total_contracts,
        "total_contract_value": contractor.total_contract_value,
        "completed_contracts": contractor.completed_contracts,
        "ongoing_contracts": contractor.ongoing_contracts,
        "overall_rating": contractor.overall_rating,
    })))
}

/// List contractors
async fn list_contractors(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let contractors = state
        .services
        .contractors
        .list_contractors(pagination.per_page, pagination.offset())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(contractors))
}

/// Update a contractor's registry fields (aggregates are derived, never patched)
async fn update_contractor(
    State(state): State<AppState>,
    Path(contractor_id): Path<Uuid>,
    Json(payload): Json<UpdateContractorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let contractor = state
        .services
        .contractors
        .update_contractor(contractor_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(contractor))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_contractor))
        .route("/", get(list_contractors))
        .route("/:id", get(get_contractor))
        .route("/:id", put(update_contractor))
        .route("/:id/summary", get(get_contractor_summary))
}
