use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::performance_ratings::{
        CreatePerformanceRatingRequest, UpdatePerformanceRatingRequest,
    },
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
struct RatingListQuery {
    contractor_id: Option<Uuid>,
    page: Option<u64>,
    per_page: Option<u64>,
}

impl RatingListQuery {
    fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Record a performance evaluation for a contractor
async fn create_performance_rating(
    State(state): State<AppState>,
    Json(payload): Json<CreatePerformanceRatingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let rating = state
        .services
        .performance_ratings
        .create_performance_rating(payload)
        .await
        .map_err(map_service_error)?;

    info!("Performance rating created: {}", rating.id);

    Ok(created_response(rating))
}

/// Get an evaluation by ID
async fn get_performance_rating(
    State(state): State<AppState>,
    Path(rating_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rating = state
        .services
        .performance_ratings
        .get_performance_rating(rating_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Performance rating {} not found", rating_id)))?;

    Ok(success_response(rating))
}

/// List evaluations, optionally filtered by contractor
async fn list_performance_ratings(
    State(state): State<AppState>,
    Query(query): Query<RatingListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ratings = state
        .services
        .performance_ratings
        .list_performance_ratings(
            query.contractor_id,
            query.pagination().per_page,
            query.pagination().offset(),
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ratings))
}

/// Re-derive an evaluation with new sub-scores merged over stored ones
async fn update_performance_rating(
    State(state): State<AppState>,
    Path(rating_id): Path<Uuid>,
    Json(payload): Json<UpdatePerformanceRatingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let rating = state
        .services
        .performance_ratings
        .update_performance_rating(rating_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(rating))
}

/// Delete an evaluation; the contractor's rating aggregate is recomputed
async fn delete_performance_rating(
    State(state): State<AppState>,
    Path(rating_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .performance_ratings
        .delete_performance_rating(rating_id)
        .await
        .map_err(map_service_error)?;

    info!("Performance rating deleted: {}", rating_id);

    Ok(no_content_response())
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_performance_rating))
        .route("/", get(list_performance_ratings))
        .route("/:id", get(get_performance_rating))
        .route("/:id", put(update_performance_rating))
        .route("/:id", delete(delete_performance_rating))
}
