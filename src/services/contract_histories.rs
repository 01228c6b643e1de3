use crate::{
    db::DbPool,
    entities::{
        contract_history::{
            self, ActiveModel as HistoryActiveModel, ContractStatus, Entity as HistoryEntity,
            Model as HistoryModel,
        },
        contractor::Entity as ContractorEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::contractors,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateContractHistoryRequest {
    pub contractor_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Project name must not be empty"))]
    pub project_name: Option<String>,
    pub contract_amount: Option<Decimal>,
    pub status: Option<ContractStatus>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateContractHistoryRequest {
    #[validate(length(min = 1, max = 255, message = "Project name must not be empty"))]
    pub project_name: Option<String>,
    pub contract_amount: Option<Decimal>,
    pub status: Option<ContractStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContractHistoryResponse {
    pub id: Uuid,
    pub contractor_id: Uuid,
    pub project_name: Option<String>,
    pub contract_amount: Option<Decimal>,
    pub status: String,
    pub performance_rating: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<HistoryModel> for ContractHistoryResponse {
    fn from(model: HistoryModel) -> Self {
        Self {
            id: model.id,
            contractor_id: model.contractor_id,
            project_name: model.project_name,
            contract_amount: model.contract_amount,
            status: model.status.to_value(),
            performance_rating: model.performance_rating,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Contract-history records. Every mutation triggers a full recompute of the
/// owning contractor's contract aggregates on the same transaction.
#[derive(Clone)]
pub struct ContractHistoryService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ContractHistoryService {
    /// Creates a new contract-history service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Records a contract for a contractor.
    ///
    /// The contractor reference is required: an unresolvable `contractor_id`
    /// is rejected before any write.
    #[instrument(skip(self, request), fields(contractor_id = %request.contractor_id))]
    pub async fn create_contract_history(
        &self,
        request: CreateContractHistoryRequest,
    ) -> Result<ContractHistoryResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let history_id = Uuid::new_v4();
        let contractor_id = request.contractor_id;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for contract history creation");
            ServiceError::DatabaseError(e)
        })?;

        let contractor_exists = ContractorEntity::find_by_id(contractor_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .is_some();
        if !contractor_exists {
            return Err(ServiceError::ValidationError(format!(
                "Contractor {} does not exist",
                contractor_id
            )));
        }

        let history = HistoryActiveModel {
            id: Set(history_id),
            contractor_id: Set(contractor_id),
            project_name: Set(request.project_name),
            contract_amount: Set(request.contract_amount),
            status: Set(request.status.unwrap_or(ContractStatus::Ongoing)),
            performance_rating: Set(None),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = history.insert(&txn).await.map_err(|e| {
            error!(error = %e, history_id = %history_id, "Failed to create contract history");
            ServiceError::DatabaseError(e)
        })?;

        contractors::recompute_history_aggregates(&txn, contractor_id).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, history_id = %history_id, "Failed to commit contract history creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(history_id = %history_id, contractor_id = %contractor_id, "Contract history created");
        self.notify(contractor_id).await;

        Ok(model.into())
    }

    /// Applies a field patch to a contract record, then recomputes the
    /// contractor's aggregates.
    #[instrument(skip(self, request))]
    pub async fn update_contract_history(
        &self,
        history_id: Uuid,
        request: UpdateContractHistoryRequest,
    ) -> Result<ContractHistoryResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, history_id = %history_id, "Failed to start transaction for contract history update");
            ServiceError::DatabaseError(e)
        })?;

        let history = HistoryEntity::find_by_id(history_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Contract history {} not found", history_id))
            })?;

        let contractor_id = history.contractor_id;

        let mut active: HistoryActiveModel = history.into();
        if let Some(project_name) = request.project_name {
            active.project_name = Set(Some(project_name));
        }
        if let Some(amount) = request.contract_amount {
            active.contract_amount = Set(Some(amount));
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Some(Utc::now()));

        let model = active.update(&txn).await.map_err(|e| {
            error!(error = %e, history_id = %history_id, "Failed to update contract history");
            ServiceError::DatabaseError(e)
        })?;

        contractors::recompute_history_aggregates(&txn, contractor_id).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, history_id = %history_id, "Failed to commit contract history update");
            ServiceError::DatabaseError(e)
        })?;

        info!(history_id = %history_id, "Contract history updated");
        self.notify(contractor_id).await;

        Ok(model.into())
    }

    /// Deletes a contract record, then recomputes the contractor's
    /// aggregates from the remaining rows.
    #[instrument(skip(self))]
    pub async fn delete_contract_history(&self, history_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, history_id = %history_id, "Failed to start transaction for contract history deletion");
            ServiceError::DatabaseError(e)
        })?;

        let history = HistoryEntity::find_by_id(history_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Contract history {} not found", history_id))
            })?;

        let contractor_id = history.contractor_id;

        history.delete(&txn).await.map_err(|e| {
            error!(error = %e, history_id = %history_id, "Failed to delete contract history");
            ServiceError::DatabaseError(e)
        })?;

        contractors::recompute_history_aggregates(&txn, contractor_id).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, history_id = %history_id, "Failed to commit contract history deletion");
            ServiceError::DatabaseError(e)
        })?;

        info!(history_id = %history_id, "Contract history deleted");
        self.notify(contractor_id).await;

        Ok(())
    }

    /// Gets a contract record by ID
    #[instrument(skip(self))]
    pub async fn get_contract_history(
        &self,
        history_id: Uuid,
    ) -> Result<Option<ContractHistoryResponse>, ServiceError> {
        let db = &*self.db_pool;
        let history = HistoryEntity::find_by_id(history_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(history.map(Into::into))
    }

    /// Lists contract records, optionally scoped to one contractor
    #[instrument(skip(self))]
    pub async fn list_contract_histories(
        &self,
        contractor_id: Option<Uuid>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ContractHistoryResponse>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = HistoryEntity::find();
        if let Some(contractor_id) = contractor_id {
            query = query.filter(contract_history::Column::ContractorId.eq(contractor_id));
        }
        let histories = query
            .order_by_desc(contract_history::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(histories.into_iter().map(Into::into).collect())
    }

    async fn notify(&self, contractor_id: Uuid) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ContractorAggregatesRecomputed(contractor_id))
                .await
            {
                warn!(error = %e, contractor_id = %contractor_id, "Failed to send aggregate recompute event");
            }
        }
    }
}
