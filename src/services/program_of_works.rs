use crate::{
    db::DbPool,
    entities::program_of_work::{
        self, ActiveModel as PowActiveModel, Entity as PowEntity, Model as PowModel, PowStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{budgets, sequences},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePowRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    pub estimated_cost: Decimal,
    #[validate(range(min = 2000, max = 2100, message = "Fiscal year out of range"))]
    pub fiscal_year: i32,
    pub budget_id: Option<Uuid>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePowRequest {
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub estimated_cost: Option<Decimal>,
    pub status: Option<PowStatus>,
    pub project_id: Option<Uuid>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PowResponse {
    pub id: Uuid,
    pub pow_number: String,
    pub title: String,
    pub budget_id: Option<Uuid>,
    pub estimated_cost: Decimal,
    pub fiscal_year: i32,
    pub status: String,
    pub bidding_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<PowModel> for PowResponse {
    fn from(model: PowModel) -> Self {
        Self {
            id: model.id,
            pow_number: model.pow_number,
            title: model.title,
            budget_id: model.budget_id,
            estimated_cost: model.estimated_cost,
            fiscal_year: model.fiscal_year,
            status: model.status.to_value(),
            bidding_id: model.bidding_id,
            project_id: model.project_id,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Program-of-work lifecycle: numbering, budget debits and the status flips
/// driven by the linked bidding.
#[derive(Clone)]
pub struct ProgramOfWorkService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ProgramOfWorkService {
    /// Creates a new program-of-work service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a program of work and, when budget-linked, debits the ledger.
    ///
    /// Number draw, insert and allocation run on one transaction.
    #[instrument(skip(self, request), fields(fiscal_year = request.fiscal_year))]
    pub async fn create_pow(&self, request: CreatePowRequest) -> Result<PowResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let pow_id = Uuid::new_v4();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for POW creation");
            ServiceError::DatabaseError(e)
        })?;

        let seq = sequences::next_value(&txn, &sequences::pow_scope(request.fiscal_year)).await?;
        let pow_number = sequences::format_pow_number(request.fiscal_year, seq);

        let pow = PowActiveModel {
            id: Set(pow_id),
            pow_number: Set(pow_number.clone()),
            title: Set(request.title),
            budget_id: Set(request.budget_id),
            estimated_cost: Set(request.estimated_cost),
            fiscal_year: Set(request.fiscal_year),
            status: Set(PowStatus::Draft),
            bidding_id: Set(None),
            project_id: Set(None),
            description: Set(request.description),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = pow.insert(&txn).await.map_err(|e| {
            error!(error = %e, pow_id = %pow_id, "Failed to create program of work");
            ServiceError::DatabaseError(e)
        })?;

        if let Some(budget_id) = request.budget_id {
            budgets::allocate(&txn, budget_id, request.estimated_cost).await?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, pow_id = %pow_id, "Failed to commit POW creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(pow_id = %pow_id, pow_number = %pow_number, "Program of work created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::PowCreated(pow_id)).await {
                warn!(error = %e, pow_id = %pow_id, "Failed to send POW created event");
            }
        }

        Ok(model.into())
    }

    /// Applies a field patch to a program of work.
    ///
    /// Changing `estimated_cost` does NOT re-adjust a linked budget's
    /// allocation; the ledger reflects the cost at creation time until the
    /// POW is deleted. Flagged with a warning so the drift is visible.
    #[instrument(skip(self, request))]
    pub async fn update_pow(
        &self,
        pow_id: Uuid,
        request: UpdatePowRequest,
    ) -> Result<PowResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let pow = PowEntity::find_by_id(pow_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Program of work {} not found", pow_id))
            })?;

        if let (Some(new_cost), Some(budget_id)) = (request.estimated_cost, pow.budget_id) {
            if new_cost != pow.estimated_cost {
                warn!(
                    pow_id = %pow_id,
                    budget_id = %budget_id,
                    old_cost = %pow.estimated_cost,
                    new_cost = %new_cost,
                    "Estimated cost changed on a budget-linked POW; ledger allocation is not re-adjusted"
                );
            }
        }

        let mut active: PowActiveModel = pow.into();
        if let Some(title) = request.title {
            active.title = Set(title);
        }
        if let Some(cost) = request.estimated_cost {
            active.estimated_cost = Set(cost);
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if let Some(project_id) = request.project_id {
            active.project_id = Set(Some(project_id));
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Some(Utc::now()));

        let model = active.update(db).await.map_err(|e| {
            error!(error = %e, pow_id = %pow_id, "Failed to update program of work");
            ServiceError::DatabaseError(e)
        })?;

        info!(pow_id = %pow_id, "Program of work updated");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::PowUpdated(pow_id)).await {
                warn!(error = %e, pow_id = %pow_id, "Failed to send POW updated event");
            }
        }

        Ok(model.into())
    }

    /// Deletes a program of work, releasing its budget allocation first.
    ///
    /// The deallocation uses the stored `estimated_cost`, so a create/delete
    /// pair returns the ledger to its pre-creation balance.
    #[instrument(skip(self))]
    pub async fn delete_pow(&self, pow_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, pow_id = %pow_id, "Failed to start transaction for POW deletion");
            ServiceError::DatabaseError(e)
        })?;

        let pow = PowEntity::find_by_id(pow_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Program of work {} not found", pow_id))
            })?;

        if let Some(budget_id) = pow.budget_id {
            budgets::deallocate(&txn, budget_id, pow.estimated_cost).await?;
        }

        pow.delete(&txn).await.map_err(|e| {
            error!(error = %e, pow_id = %pow_id, "Failed to delete program of work");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, pow_id = %pow_id, "Failed to commit POW deletion transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(pow_id = %pow_id, "Program of work deleted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::PowDeleted(pow_id)).await {
                warn!(error = %e, pow_id = %pow_id, "Failed to send POW deleted event");
            }
        }

        Ok(())
    }

    /// Gets a program of work by ID
    #[instrument(skip(self))]
    pub async fn get_pow(&self, pow_id: Uuid) -> Result<Option<PowResponse>, ServiceError> {
        let db = &*self.db_pool;
        let pow = PowEntity::find_by_id(pow_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(pow.map(Into::into))
    }

    /// Lists programs of work, newest first
    #[instrument(skip(self))]
    pub async fn list_pows(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PowResponse>, ServiceError> {
        let db = &*self.db_pool;
        let pows = PowEntity::find()
            .order_by_desc(program_of_work::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(pows.into_iter().map(Into::into).collect())
    }

    /// Lists programs of work for one fiscal year
    #[instrument(skip(self))]
    pub async fn list_pows_by_fiscal_year(
        &self,
        fiscal_year: i32,
    ) -> Result<Vec<PowResponse>, ServiceError> {
        let db = &*self.db_pool;
        let pows = PowEntity::find()
            .filter(program_of_work::Column::FiscalYear.eq(fiscal_year))
            .order_by_asc(program_of_work::Column::PowNumber)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(pows.into_iter().map(Into::into).collect())
    }
}

/// Forces a POW into `For Bidding` and records the bidding that owns it.
///
/// Invoked by the bidding service on its own transaction. A missing or
/// dangling `pow_id` is a silent skip since the reference is optional.
pub(crate) async fn attach_bidding<C: ConnectionTrait>(
    conn: &C,
    pow_id: Uuid,
    bidding_id: Uuid,
) -> Result<(), ServiceError> {
    let Some(pow) = PowEntity::find_by_id(pow_id)
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
    else {
        debug!(pow_id = %pow_id, "POW not found; skipping bidding attach");
        return Ok(());
    };

    let mut active: PowActiveModel = pow.into();
    active.status = Set(PowStatus::ForBidding);
    active.bidding_id = Set(Some(bidding_id));
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn).await.map_err(ServiceError::DatabaseError)?;

    debug!(pow_id = %pow_id, bidding_id = %bidding_id, "POW moved to For Bidding");
    Ok(())
}

/// Forces a POW into `Awarded` when its bidding is awarded.
pub(crate) async fn mark_awarded<C: ConnectionTrait>(
    conn: &C,
    pow_id: Uuid,
) -> Result<(), ServiceError> {
    let Some(pow) = PowEntity::find_by_id(pow_id)
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
    else {
        debug!(pow_id = %pow_id, "POW not found; skipping award flip");
        return Ok(());
    };

    let mut active: PowActiveModel = pow.into();
    active.status = Set(PowStatus::Awarded);
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn).await.map_err(ServiceError::DatabaseError)?;

    debug!(pow_id = %pow_id, "POW marked Awarded");
    Ok(())
}

/// Reverts a POW to `Approved` and clears its bidding link when the bidding
/// is deleted.
pub(crate) async fn detach_bidding<C: ConnectionTrait>(
    conn: &C,
    pow_id: Uuid,
) -> Result<(), ServiceError> {
    let Some(pow) = PowEntity::find_by_id(pow_id)
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
    else {
        debug!(pow_id = %pow_id, "POW not found; skipping bidding detach");
        return Ok(());
    };

    let mut active: PowActiveModel = pow.into();
    active.status = Set(PowStatus::Approved);
    active.bidding_id = Set(None);
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn).await.map_err(ServiceError::DatabaseError)?;

    debug!(pow_id = %pow_id, "POW reverted to Approved");
    Ok(())
}
