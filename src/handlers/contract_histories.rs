use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::contract_histories::{CreateContractHistoryRequest, UpdateContractHistoryRequest},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct HistoryListQuery {
    contractor_id: Option<Uuid>,
    page: Option<u64>,
    per_page: Option<u64>,
}

impl HistoryListQuery {
    fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Record a contract for a contractor
async fn create_contract_history(
    State(state): State<AppState>,
    Json(payload): Json<CreateContractHistoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let history = state
        .services
        .contract_histories
        .create_contract_history(payload)
        .await
        .map_err(map_service_error)?;

    info!("Contract history created: {}", history.id);

    Ok(created_response(history))
}

/// Get a contract record by ID
async fn get_contract_history(
    State(state): State<AppState>,
    Path(history_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state
        .services
        .contract_histories
        .get_contract_history(history_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Contract history {} not found", history_id)))?;

    Ok(success_response(history))
}

/// List contract records, optionally filtered by contractor
async fn list_contract_histories(
    State(state): State<AppState>,
    Query(query): Query<HistoryListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let histories = state
        .services
        .contract_histories
        .list_contract_histories(
            query.contractor_id,
            query.pagination().per_page,
            query.pagination().offset(),
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(histories))
}

/// Update a contract record; the contractor's aggregates are recomputed
async fn update_contract_history(
    State(state): State<AppState>,
    Path(history_id): Path<Uuid>,
    Json(payload): Json<UpdateContractHistoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let history = state
        .services
        .contract_histories
        .update_contract_history(history_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(history))
}

/// Delete a contract record; the contractor's aggregates are recomputed
async fn delete_contract_history(
    State(state): State<AppState>,
    Path(history_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .contract_histories
        .delete_contract_history(history_id)
        .await
        .map_err(map_service_error)?;

    info!("Contract history deleted: {}", history_id);

    Ok(no_content_response())
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_contract_history))
        .route("/", get(list_contract_histories))
        .route("/:id", get(get_contract_history))
        .route("/:id", put(update_contract_history))
        .route("/:id", delete(delete_contract_history))
}
