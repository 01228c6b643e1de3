use crate::{
    db::DbPool,
    entities::bidding::{
        self, ActiveModel as BiddingActiveModel, BiddingStatus, Entity as BiddingEntity,
        Model as BiddingModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{program_of_works, sequences},
};
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateBiddingRequest {
    pub pow_id: Option<Uuid>,
    /// Approved Budget for the Contract, the ceiling price
    pub abc: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateBiddingRequest {
    pub status: Option<BiddingStatus>,
    pub abc: Option<Decimal>,
    pub contract_cost: Option<Decimal>,
    #[validate(length(min = 1, max = 255, message = "Winning bidder must not be empty"))]
    pub winning_bidder: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BiddingResponse {
    pub id: Uuid,
    pub bidding_number: String,
    pub pow_id: Option<Uuid>,
    pub abc: Decimal,
    pub status: String,
    pub contract_cost: Option<Decimal>,
    pub winning_bidder: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<BiddingModel> for BiddingResponse {
    fn from(model: BiddingModel) -> Self {
        Self {
            id: model.id,
            bidding_number: model.bidding_number,
            pow_id: model.pow_id,
            abc: model.abc,
            status: model.status.to_value(),
            contract_cost: model.contract_cost,
            winning_bidder: model.winning_bidder,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Bidding lifecycle: numbering, award propagation and POW reconciliation.
#[derive(Clone)]
pub struct BiddingService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl BiddingService {
    /// Creates a new bidding service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Opens a bidding, flipping the linked POW to `For Bidding`.
    ///
    /// Biddings draw from one global sequence; only the formatted prefix
    /// carries the current calendar year.
    #[instrument(skip(self, request))]
    pub async fn create_bidding(
        &self,
        request: CreateBiddingRequest,
    ) -> Result<BiddingResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let bidding_id = Uuid::new_v4();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for bidding creation");
            ServiceError::DatabaseError(e)
        })?;

        let seq = sequences::next_value(&txn, sequences::BIDDING_SCOPE).await?;
        let bidding_number = sequences::format_bidding_number(now.year(), seq);

        let bidding = BiddingActiveModel {
            id: Set(bidding_id),
            bidding_number: Set(bidding_number.clone()),
            pow_id: Set(request.pow_id),
            abc: Set(request.abc),
            status: Set(BiddingStatus::PreProcurement),
            contract_cost: Set(None),
            winning_bidder: Set(None),
            description: Set(request.description),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = bidding.insert(&txn).await.map_err(|e| {
            error!(error = %e, bidding_id = %bidding_id, "Failed to create bidding");
            ServiceError::DatabaseError(e)
        })?;

        if let Some(pow_id) = request.pow_id {
            program_of_works::attach_bidding(&txn, pow_id, bidding_id).await?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, bidding_id = %bidding_id, "Failed to commit bidding creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(bidding_id = %bidding_id, bidding_number = %bidding_number, "Bidding created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::BiddingCreated(bidding_id)).await {
                warn!(error = %e, bidding_id = %bidding_id, "Failed to send bidding created event");
            }
        }

        Ok(model.into())
    }

    /// Applies a field patch to a bidding.
    ///
    /// A patch that sets the status to `Awarded` also forces the linked POW
    /// to `Awarded` as part of the same transaction.
    #[instrument(skip(self, request))]
    pub async fn update_bidding(
        &self,
        bidding_id: Uuid,
        request: UpdateBiddingRequest,
    ) -> Result<BiddingResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, bidding_id = %bidding_id, "Failed to start transaction for bidding update");
            ServiceError::DatabaseError(e)
        })?;

        let bidding = BiddingEntity::find_by_id(bidding_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Bidding {} not found", bidding_id)))?;

        let pow_id = bidding.pow_id;
        let awarding = matches!(request.status, Some(BiddingStatus::Awarded));

        let mut active: BiddingActiveModel = bidding.into();
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if let Some(abc) = request.abc {
            active.abc = Set(abc);
        }
        if let Some(contract_cost) = request.contract_cost {
            active.contract_cost = Set(Some(contract_cost));
        }
        if let Some(winning_bidder) = request.winning_bidder {
            active.winning_bidder = Set(Some(winning_bidder));
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Some(Utc::now()));

        let model = active.update(&txn).await.map_err(|e| {
            error!(error = %e, bidding_id = %bidding_id, "Failed to update bidding");
            ServiceError::DatabaseError(e)
        })?;

        if awarding {
            if let Some(pow_id) = pow_id {
                program_of_works::mark_awarded(&txn, pow_id).await?;
            }
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, bidding_id = %bidding_id, "Failed to commit bidding update transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(bidding_id = %bidding_id, awarded = awarding, "Bidding updated");

        if let Some(event_sender) = &self.event_sender {
            let event = if awarding {
                Event::BiddingAwarded { bidding_id, pow_id }
            } else {
                Event::BiddingUpdated(bidding_id)
            };
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, bidding_id = %bidding_id, "Failed to send bidding updated event");
            }
        }

        Ok(model.into())
    }

    /// Deletes a bidding, reverting the linked POW to `Approved` first.
    #[instrument(skip(self))]
    pub async fn delete_bidding(&self, bidding_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, bidding_id = %bidding_id, "Failed to start transaction for bidding deletion");
            ServiceError::DatabaseError(e)
        })?;

        let bidding = BiddingEntity::find_by_id(bidding_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Bidding {} not found", bidding_id)))?;

        if let Some(pow_id) = bidding.pow_id {
            program_of_works::detach_bidding(&txn, pow_id).await?;
        }

        bidding.delete(&txn).await.map_err(|e| {
            error!(error = %e, bidding_id = %bidding_id, "Failed to delete bidding");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, bidding_id = %bidding_id, "Failed to commit bidding deletion transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(bidding_id = %bidding_id, "Bidding deleted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::BiddingDeleted(bidding_id)).await {
                warn!(error = %e, bidding_id = %bidding_id, "Failed to send bidding deleted event");
            }
        }

        Ok(())
    }

    /// Gets a bidding by ID
    #[instrument(skip(self))]
    pub async fn get_bidding(
        &self,
        bidding_id: Uuid,
    ) -> Result<Option<BiddingResponse>, ServiceError> {
        let db = &*self.db_pool;
        let bidding = BiddingEntity::find_by_id(bidding_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(bidding.map(Into::into))
    }

    /// Lists biddings, newest first
    #[instrument(skip(self))]
    pub async fn list_biddings(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<BiddingResponse>, ServiceError> {
        let db = &*self.db_pool;
        let biddings = BiddingEntity::find()
            .order_by_desc(bidding::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(biddings.into_iter().map(Into::into).collect())
    }
}
