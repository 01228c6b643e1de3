use crate::{
    db::DbPool,
    entities::{
        contract_history::{self, ContractStatus},
        contractor::{
            self, ActiveModel as ContractorActiveModel, ContractorStatus,
            Entity as ContractorEntity, Model as ContractorModel,
        },
        performance_rating,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateContractorRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub tin: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateContractorRequest {
    #[validate(length(min = 1, max = 255, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub tin: Option<String>,
    pub status: Option<ContractorStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContractorResponse {
    pub id: Uuid,
    pub name: String,
    pub tin: Option<String>,
    pub status: String,
    pub total_contracts: i32,
    pub total_contract_value: Decimal,
    pub completed_contracts: i32,
    pub ongoing_contracts: i32,
    pub overall_rating: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ContractorModel> for ContractorResponse {
    fn from(model: ContractorModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            tin: model.tin,
            status: model.status.to_value(),
            total_contracts: model.total_contracts,
            total_contract_value: model.total_contract_value,
            completed_contracts: model.completed_contracts,
            ongoing_contracts: model.ongoing_contracts,
            overall_rating: model.overall_rating,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Contract-count and value summary derived from a set of history rows.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct HistorySummary {
    pub total_contracts: i32,
    pub total_contract_value: Decimal,
    pub completed_contracts: i32,
    pub ongoing_contracts: i32,
}

/// Derives the contract summary from scratch.
///
/// Full recomputation rather than incremental patching: the result is a pure
/// function of the current rows, idempotent under replay and immune to
/// double-counting from partial updates. Null contract amounts count as 0.
pub(crate) fn summarize_history(rows: &[contract_history::Model]) -> HistorySummary {
    HistorySummary {
        total_contracts: rows.len() as i32,
        total_contract_value: rows
            .iter()
            .map(|r| r.contract_amount.unwrap_or(Decimal::ZERO))
            .sum(),
        completed_contracts: rows
            .iter()
            .filter(|r| r.status == ContractStatus::Completed)
            .count() as i32,
        ongoing_contracts: rows
            .iter()
            .filter(|r| r.status == ContractStatus::Ongoing)
            .count() as i32,
    }
}

/// Averages the stored overall ratings of a contractor's evaluations.
///
/// 0 when no evaluations exist; rounded to 2 decimal places.
pub(crate) fn average_rating(rows: &[performance_rating::Model]) -> Decimal {
    if rows.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = rows.iter().map(|r| r.overall_rating).sum();
    (sum / Decimal::from(rows.len() as i64)).round_dp(2)
}

/// Contractor registry and aggregate engine.
///
/// The aggregate columns on `contractors` are written only by the recompute
/// functions below; contractor CRUD never touches them.
#[derive(Clone)]
pub struct ContractorService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ContractorService {
    /// Creates a new contractor service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Registers a contractor with empty aggregates
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_contractor(
        &self,
        request: CreateContractorRequest,
    ) -> Result<ContractorResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let contractor_id = Uuid::new_v4();

        let contractor = ContractorActiveModel {
            id: Set(contractor_id),
            name: Set(request.name),
            tin: Set(request.tin),
            status: Set(ContractorStatus::Active),
            total_contracts: Set(0),
            total_contract_value: Set(Decimal::ZERO),
            completed_contracts: Set(0),
            ongoing_contracts: Set(0),
            overall_rating: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = contractor.insert(db).await.map_err(|e| {
            error!(error = %e, contractor_id = %contractor_id, "Failed to create contractor");
            ServiceError::DatabaseError(e)
        })?;

        info!(contractor_id = %contractor_id, "Contractor created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::ContractorCreated(contractor_id)).await {
                warn!(error = %e, contractor_id = %contractor_id, "Failed to send contractor created event");
            }
        }

        Ok(model.into())
    }

    /// Applies a field patch to a contractor. Aggregate columns are not
    /// patchable; they only change through recomputation.
    #[instrument(skip(self, request))]
    pub async fn update_contractor(
        &self,
        contractor_id: Uuid,
        request: UpdateContractorRequest,
    ) -> Result<ContractorResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let contractor = ContractorEntity::find_by_id(contractor_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Contractor {} not found", contractor_id))
            })?;

        let mut active: ContractorActiveModel = contractor.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(tin) = request.tin {
            active.tin = Set(Some(tin));
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Some(Utc::now()));

        let model = active.update(db).await.map_err(|e| {
            error!(error = %e, contractor_id = %contractor_id, "Failed to update contractor");
            ServiceError::DatabaseError(e)
        })?;

        info!(contractor_id = %contractor_id, "Contractor updated");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::ContractorUpdated(contractor_id)).await {
                warn!(error = %e, contractor_id = %contractor_id, "Failed to send contractor updated event");
            }
        }

        Ok(model.into())
    }

    /// Gets a contractor by ID
    #[instrument(skip(self))]
    pub async fn get_contractor(
        &self,
        contractor_id: Uuid,
    ) -> Result<Option<ContractorResponse>, ServiceError> {
        let db = &*self.db_pool;
        let contractor = ContractorEntity::find_by_id(contractor_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(contractor.map(Into::into))
    }

    /// Lists contractors by name
    #[instrument(skip(self))]
    pub async fn list_contractors(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ContractorResponse>, ServiceError> {
        let db = &*self.db_pool;
        let contractors = ContractorEntity::find()
            .order_by_asc(contractor::Column::Name)
            .limit(limit)
            .offset(offset)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(contractors.into_iter().map(Into::into).collect())
    }
}

/// Recomputes a contractor's contract-count aggregates from all of its
/// history rows, on the caller's transaction.
///
/// `overall_rating` is NOT touched here: the performance-rating average is
/// the canonical rating source (see `recompute_overall_rating`).
pub(crate) async fn recompute_history_aggregates<C: ConnectionTrait>(
    conn: &C,
    contractor_id: Uuid,
) -> Result<(), ServiceError> {
    let rows = contract_history::Entity::find()
        .filter(contract_history::Column::ContractorId.eq(contractor_id))
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;

    let summary = summarize_history(&rows);

    let Some(contractor) = ContractorEntity::find_by_id(contractor_id)
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
    else {
        debug!(contractor_id = %contractor_id, "Contractor not found; skipping aggregate recompute");
        return Ok(());
    };

    let mut active: ContractorActiveModel = contractor.into();
    active.total_contracts = Set(summary.total_contracts);
    active.total_contract_value = Set(summary.total_contract_value);
    active.completed_contracts = Set(summary.completed_contracts);
    active.ongoing_contracts = Set(summary.ongoing_contracts);
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn).await.map_err(ServiceError::DatabaseError)?;

    debug!(
        contractor_id = %contractor_id,
        total = summary.total_contracts,
        "Contractor history aggregates recomputed"
    );
    Ok(())
}

/// Recomputes a contractor's overall rating as the average of its
/// performance-rating evaluations, on the caller's transaction.
pub(crate) async fn recompute_overall_rating<C: ConnectionTrait>(
    conn: &C,
    contractor_id: Uuid,
) -> Result<(), ServiceError> {
    let rows = performance_rating::Entity::find()
        .filter(performance_rating::Column::ContractorId.eq(contractor_id))
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;

    let rating = average_rating(&rows);

    let Some(contractor) = ContractorEntity::find_by_id(contractor_id)
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
    else {
        debug!(contractor_id = %contractor_id, "Contractor not found; skipping rating recompute");
        return Ok(());
    };

    let mut active: ContractorActiveModel = contractor.into();
    active.overall_rating = Set(rating);
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn).await.map_err(ServiceError::DatabaseError)?;

    debug!(contractor_id = %contractor_id, %rating, "Contractor overall rating recomputed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn history_row(amount: Option<Decimal>, status: ContractStatus) -> contract_history::Model {
        contract_history::Model {
            id: Uuid::new_v4(),
            contractor_id: Uuid::new_v4(),
            project_name: None,
            contract_amount: amount,
            status,
            performance_rating: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn rating_row(overall: Decimal) -> performance_rating::Model {
        performance_rating::Model {
            id: Uuid::new_v4(),
            contractor_id: Uuid::new_v4(),
            contract_history_id: None,
            quality_rating: None,
            timeliness_rating: None,
            safety_rating: None,
            resource_rating: None,
            communication_rating: None,
            overall_rating: overall,
            evaluated_by: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn empty_history_summarizes_to_zero() {
        let summary = summarize_history(&[]);
        assert_eq!(summary.total_contracts, 0);
        assert_eq!(summary.total_contract_value, Decimal::ZERO);
        assert_eq!(summary.completed_contracts, 0);
        assert_eq!(summary.ongoing_contracts, 0);
    }

    #[test]
    fn null_amounts_count_as_zero() {
        let rows = vec![
            history_row(Some(dec!(1000)), ContractStatus::Completed),
            history_row(None, ContractStatus::Ongoing),
        ];
        let summary = summarize_history(&rows);
        assert_eq!(summary.total_contracts, 2);
        assert_eq!(summary.total_contract_value, dec!(1000));
        assert_eq!(summary.completed_contracts, 1);
        assert_eq!(summary.ongoing_contracts, 1);
    }

    #[test]
    fn terminated_contracts_count_toward_total_only() {
        let rows = vec![
            history_row(Some(dec!(500)), ContractStatus::Terminated),
            history_row(Some(dec!(250)), ContractStatus::Suspended),
        ];
        let summary = summarize_history(&rows);
        assert_eq!(summary.total_contracts, 2);
        assert_eq!(summary.completed_contracts, 0);
        assert_eq!(summary.ongoing_contracts, 0);
    }

    #[test]
    fn average_rating_of_no_rows_is_zero() {
        assert_eq!(average_rating(&[]), Decimal::ZERO);
    }

    #[test]
    fn average_rating_rounds_to_two_decimals() {
        let rows = vec![rating_row(dec!(5)), rating_row(dec!(4)), rating_row(dec!(4))];
        assert_eq!(average_rating(&rows), dec!(4.33));
    }

    proptest! {
        #[test]
        fn summary_is_consistent(
            amounts in proptest::collection::vec((0u32..1_000_000, 0u8..4), 0..32)
        ) {
            let rows: Vec<_> = amounts
                .iter()
                .map(|(amount, status)| {
                    let status = match status {
                        0 => ContractStatus::Ongoing,
                        1 => ContractStatus::Completed,
                        2 => ContractStatus::Terminated,
                        _ => ContractStatus::Suspended,
                    };
                    history_row(Some(Decimal::from(*amount)), status)
                })
                .collect();

            let summary = summarize_history(&rows);
            prop_assert_eq!(summary.total_contracts as usize, rows.len());
            prop_assert!(summary.completed_contracts + summary.ongoing_contracts <= summary.total_contracts);
            let expected: Decimal = amounts.iter().map(|(a, _)| Decimal::from(*a)).sum();
            prop_assert_eq!(summary.total_contract_value, expected);

            // Pure function of the rows: recomputing yields identical values
            let again = summarize_history(&rows);
            prop_assert_eq!(summary, again);
        }
    }
}
