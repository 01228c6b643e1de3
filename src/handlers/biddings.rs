use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::biddings::{CreateBiddingRequest, UpdateBiddingRequest},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use tracing::info;
use uuid::Uuid;

/// Open a bidding for procurement
async fn create_bidding(
    State(state): State<AppState>,
    Json(payload): Json<CreateBiddingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let bidding = state
        .services
        .biddings
        .create_bidding(payload)
        .await
        .map_err(map_service_error)?;

    info!("Bidding created: {} ({})", bidding.id, bidding.bidding_number);

    Ok(created_response(bidding))
}

/// Get a bidding by ID
async fn get_bidding(
    State(state): State<AppState>,
    Path(bidding_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let bidding = state
        .services
        .biddings
        .get_bidding(bidding_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Bidding {} not found", bidding_id)))?;

    Ok(success_response(bidding))
}

/// List biddings
async fn list_biddings(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let biddings = state
        .services
        .biddings
        .list_biddings(pagination.per_page, pagination.offset())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(biddings))
}

/// Update a bidding; awarding propagates to the linked program of work
async fn update_bidding(
    State(state): State<AppState>,
    Path(bidding_id): Path<Uuid>,
    Json(payload): Json<UpdateBiddingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let bidding = state
        .services
        .biddings
        .update_bidding(bidding_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(bidding))
}

/// Delete a bidding, reverting the linked program of work to Approved
async fn delete_bidding(
    State(state): State<AppState>,
    Path(bidding_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .biddings
        .delete_bidding(bidding_id)
        .await
        .map_err(map_service_error)?;

    info!("Bidding deleted: {}", bidding_id);

    Ok(no_content_response())
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_bidding))
        .route("/", get(list_biddings))
        .route("/:id", get(get_bidding))
        .route("/:id", put(update_bidding))
        .route("/:id", delete(delete_bidding))
}
