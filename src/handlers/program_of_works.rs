use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::program_of_works::{CreatePowRequest, UpdatePowRequest},
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
struct PowListQuery {
    fiscal_year: Option<i32>,
    page: Option<u64>,
    per_page: Option<u64>,
}

/// Create a program of work
async fn create_pow(
    State(state): State<AppState>,
    Json(payload): Json<CreatePowRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let pow = state
        .services
        .program_of_works
        .create_pow(payload)
        .await
        .map_err(map_service_error)?;

    info!("Program of work created: {} ({})", pow.id, pow.pow_number);

    Ok(created_response(pow))
}

/// Get a program of work by ID
async fn get_pow(
    State(state): State<AppState>,
    Path(pow_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pow = state
        .services
        .program_of_works
        .get_pow(pow_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Program of work {} not found", pow_id)))?;

    Ok(success_response(pow))
}

/// List programs of work, optionally narrowed to one fiscal year
async fn list_pows(
    State(state): State<AppState>,
    Query(query): Query<PowListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(fiscal_year) = query.fiscal_year {
        let pows = state
            .services
            .program_of_works
            .list_pows_by_fiscal_year(fiscal_year)
            .await
            .map_err(map_service_error)?;
        return Ok(success_response(pows));
    }

    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };
    let pows = state
        .services
        .program_of_works
        .list_pows(pagination.per_page, pagination.offset())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(pows))
}

/// Update a program of work
async fn update_pow(
    State(state): State<AppState>,
    Path(pow_id): Path<Uuid>,
    Json(payload): Json<UpdatePowRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let pow = state
        .services
        .program_of_works
        .update_pow(pow_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(pow))
}

/// Delete a program of work, releasing its budget allocation
async fn delete_pow(
    State(state): State<AppState>,
    Path(pow_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .program_of_works
        .delete_pow(pow_id)
        .await
        .map_err(map_service_error)?;

    info!("Program of work deleted: {}", pow_id);

    Ok(no_content_response())
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_pow))
        .route("/", get(list_pows))
        .route("/:id", get(get_pow))
        .route("/:id", put(update_pow))
        .route("/:id", delete(delete_pow))
}
