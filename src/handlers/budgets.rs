use super::common::{
    created_response, map_service_error, success_response, validate_input, PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::budgets::CreateBudgetRequest,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct BudgetListQuery {
    fiscal_year: Option<i32>,
    page: Option<u64>,
    per_page: Option<u64>,
}

/// Create an annual budget
async fn create_budget(
    State(state): State<AppState>,
    Json(payload): Json<CreateBudgetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let budget = state
        .services
        .budgets
        .create_budget(payload)
        .await
        .map_err(map_service_error)?;

    info!("Annual budget created: {}", budget.id);

    Ok(created_response(budget))
}

/// Get a budget by ID
async fn get_budget(
    State(state): State<AppState>,
    Path(budget_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let budget = state
        .services
        .budgets
        .get_budget(budget_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Budget {} not found", budget_id)))?;

    Ok(success_response(budget))
}

/// List budgets, optionally narrowed to one fiscal year
async fn list_budgets(
    State(state): State<AppState>,
    Query(query): Query<BudgetListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(fiscal_year) = query.fiscal_year {
        let budgets: Vec<_> = state
            .services
            .budgets
            .get_budget_by_fiscal_year(fiscal_year)
            .await
            .map_err(map_service_error)?
            .into_iter()
            .collect();
        return Ok(success_response(budgets));
    }

    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };
    let budgets = state
        .services
        .budgets
        .list_budgets(pagination.per_page, pagination.offset())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(budgets))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_budget))
        .route("/", get(list_budgets))
        .route("/:id", get(get_budget))
}
