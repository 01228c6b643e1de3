use crate::{
    db::DbPool,
    entities::annual_budget::{
        self, ActiveModel as BudgetActiveModel, BudgetStatus, Entity as BudgetEntity,
        Model as BudgetModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveEnum, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateBudgetRequest {
    #[validate(range(min = 2000, max = 2100, message = "Fiscal year out of range"))]
    pub fiscal_year: i32,
    pub total_budget: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BudgetResponse {
    pub id: Uuid,
    pub fiscal_year: i32,
    pub total_budget: Decimal,
    pub allocated_amount: Decimal,
    pub remaining_amount: Decimal,
    pub status: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<BudgetModel> for BudgetResponse {
    fn from(model: BudgetModel) -> Self {
        Self {
            id: model.id,
            fiscal_year: model.fiscal_year,
            total_budget: model.total_budget,
            allocated_amount: model.allocated_amount,
            remaining_amount: model.remaining_amount,
            status: model.status.to_value(),
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Budget ledger: owns the allocated/remaining balance of each annual budget.
#[derive(Clone)]
pub struct BudgetService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl BudgetService {
    /// Creates a new budget service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates an annual budget with nothing allocated yet
    #[instrument(skip(self, request), fields(fiscal_year = request.fiscal_year))]
    pub async fn create_budget(
        &self,
        request: CreateBudgetRequest,
    ) -> Result<BudgetResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let budget_id = Uuid::new_v4();

        let budget = BudgetActiveModel {
            id: Set(budget_id),
            fiscal_year: Set(request.fiscal_year),
            total_budget: Set(request.total_budget),
            allocated_amount: Set(Decimal::ZERO),
            remaining_amount: Set(request.total_budget),
            status: Set(BudgetStatus::Draft),
            description: Set(request.description),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = budget.insert(db).await.map_err(|e| {
            error!(error = %e, budget_id = %budget_id, "Failed to create annual budget");
            ServiceError::DatabaseError(e)
        })?;

        info!(budget_id = %budget_id, fiscal_year = request.fiscal_year, "Annual budget created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::BudgetCreated(budget_id)).await {
                warn!(error = %e, budget_id = %budget_id, "Failed to send budget created event");
            }
        }

        Ok(model.into())
    }

    /// Gets a budget by ID
    #[instrument(skip(self))]
    pub async fn get_budget(&self, budget_id: Uuid) -> Result<Option<BudgetResponse>, ServiceError> {
        let db = &*self.db_pool;
        let budget = BudgetEntity::find_by_id(budget_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(budget.map(Into::into))
    }

    /// Gets the budget for a fiscal year, if one exists
    #[instrument(skip(self))]
    pub async fn get_budget_by_fiscal_year(
        &self,
        fiscal_year: i32,
    ) -> Result<Option<BudgetResponse>, ServiceError> {
        let db = &*self.db_pool;
        let budget = BudgetEntity::find()
            .filter(annual_budget::Column::FiscalYear.eq(fiscal_year))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(budget.map(Into::into))
    }

    /// Lists budgets, newest fiscal year first
    #[instrument(skip(self))]
    pub async fn list_budgets(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<BudgetResponse>, ServiceError> {
        let db = &*self.db_pool;
        let budgets = BudgetEntity::find()
            .order_by_desc(annual_budget::Column::FiscalYear)
            .limit(limit)
            .offset(offset)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(budgets.into_iter().map(Into::into).collect())
    }
}

/// Reserves `amount` against a budget and recomputes the remaining balance.
///
/// A `budget_id` that does not resolve is a silent skip: the budget link on a
/// POW is optional, so the caller's operation proceeds without a ledger entry.
/// Over-allocation is not rejected here; `remaining_amount` may go negative.
pub(crate) async fn allocate<C: ConnectionTrait>(
    conn: &C,
    budget_id: Uuid,
    amount: Decimal,
) -> Result<(), ServiceError> {
    let Some(budget) = BudgetEntity::find_by_id(budget_id)
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
    else {
        debug!(budget_id = %budget_id, "Budget not found; skipping allocation");
        return Ok(());
    };

    let allocated = budget.allocated_amount + amount;
    let remaining = budget.total_budget - allocated;

    let mut active: BudgetActiveModel = budget.into();
    active.allocated_amount = Set(allocated);
    active.remaining_amount = Set(remaining);
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn).await.map_err(ServiceError::DatabaseError)?;

    debug!(budget_id = %budget_id, %amount, %allocated, %remaining, "Budget allocation recorded");
    Ok(())
}

/// Releases `amount` from a budget, clamped so the allocation never goes
/// below zero, then recomputes the remaining balance.
pub(crate) async fn deallocate<C: ConnectionTrait>(
    conn: &C,
    budget_id: Uuid,
    amount: Decimal,
) -> Result<(), ServiceError> {
    let Some(budget) = BudgetEntity::find_by_id(budget_id)
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
    else {
        debug!(budget_id = %budget_id, "Budget not found; skipping deallocation");
        return Ok(());
    };

    let allocated = (budget.allocated_amount - amount).max(Decimal::ZERO);
    let remaining = budget.total_budget - allocated;

    let mut active: BudgetActiveModel = budget.into();
    active.allocated_amount = Set(allocated);
    active.remaining_amount = Set(remaining);
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn).await.map_err(ServiceError::DatabaseError)?;

    debug!(budget_id = %budget_id, %amount, %allocated, %remaining, "Budget deallocation recorded");
    Ok(())
}
