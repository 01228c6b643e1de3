use crate::{
    db::DbPool,
    entities::{
        contract_history::{self, ActiveModel as HistoryActiveModel},
        contractor::Entity as ContractorEntity,
        performance_rating::{
            self, ActiveModel as RatingActiveModel, Entity as RatingEntity, Model as RatingModel,
        },
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::contractors,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePerformanceRatingRequest {
    pub contractor_id: Uuid,
    pub contract_history_id: Option<Uuid>,
    pub quality_rating: Option<Decimal>,
    pub timeliness_rating: Option<Decimal>,
    pub safety_rating: Option<Decimal>,
    pub resource_rating: Option<Decimal>,
    pub communication_rating: Option<Decimal>,
    #[validate(length(min = 1, max = 255, message = "Evaluator must not be empty"))]
    pub evaluated_by: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePerformanceRatingRequest {
    pub quality_rating: Option<Decimal>,
    pub timeliness_rating: Option<Decimal>,
    pub safety_rating: Option<Decimal>,
    pub resource_rating: Option<Decimal>,
    pub communication_rating: Option<Decimal>,
    #[validate(length(min = 1, max = 255, message = "Evaluator must not be empty"))]
    pub evaluated_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PerformanceRatingResponse {
    pub id: Uuid,
    pub contractor_id: Uuid,
    pub contract_history_id: Option<Uuid>,
    pub quality_rating: Option<Decimal>,
    pub timeliness_rating: Option<Decimal>,
    pub safety_rating: Option<Decimal>,
    pub resource_rating: Option<Decimal>,
    pub communication_rating: Option<Decimal>,
    pub overall_rating: Decimal,
    pub evaluated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<RatingModel> for PerformanceRatingResponse {
    fn from(model: RatingModel) -> Self {
        Self {
            id: model.id,
            contractor_id: model.contractor_id,
            contract_history_id: model.contract_history_id,
            quality_rating: model.quality_rating,
            timeliness_rating: model.timeliness_rating,
            safety_rating: model.safety_rating,
            resource_rating: model.resource_rating,
            communication_rating: model.communication_rating,
            overall_rating: model.overall_rating,
            evaluated_by: model.evaluated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Derives the overall rating from the five sub-scores.
///
/// Only sub-scores that are present and strictly greater than 0 participate
/// in the average; when none qualify the rating is 0. Rounded to 2 decimals.
pub fn derive_overall_rating(sub_scores: &[Option<Decimal>]) -> Decimal {
    let qualifying: Vec<Decimal> = sub_scores
        .iter()
        .filter_map(|s| *s)
        .filter(|s| *s > Decimal::ZERO)
        .collect();

    if qualifying.is_empty() {
        return Decimal::ZERO;
    }

    let sum: Decimal = qualifying.iter().sum();
    (sum / Decimal::from(qualifying.len() as i64)).round_dp(2)
}

fn ensure_score_range(name: &str, score: Option<Decimal>) -> Result<(), ServiceError> {
    if let Some(score) = score {
        if score < Decimal::ZERO || score > Decimal::from(5) {
            return Err(ServiceError::ValidationError(format!(
                "{} must be between 0 and 5, got {}",
                name, score
            )));
        }
    }
    Ok(())
}

/// Performance-rating aggregator: per-row overall-rating derivation plus the
/// two propagations (the linked contract record and the contractor's rating
/// aggregate), all inside one transaction per mutation.
#[derive(Clone)]
pub struct PerformanceRatingService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PerformanceRatingService {
    /// Creates a new performance-rating service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Records an evaluation: derives the overall rating, writes it into the
    /// linked contract record when one is named, and recomputes the
    /// contractor's rating aggregate.
    #[instrument(skip(self, request), fields(contractor_id = %request.contractor_id))]
    pub async fn create_performance_rating(
        &self,
        request: CreatePerformanceRatingRequest,
    ) -> Result<PerformanceRatingResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        validate_sub_scores(&[
            ("quality_rating", request.quality_rating),
            ("timeliness_rating", request.timeliness_rating),
            ("safety_rating", request.safety_rating),
            ("resource_rating", request.resource_rating),
            ("communication_rating", request.communication_rating),
        ])?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let rating_id = Uuid::new_v4();
        let contractor_id = request.contractor_id;

        let overall = derive_overall_rating(&[
            request.quality_rating,
            request.timeliness_rating,
            request.safety_rating,
            request.resource_rating,
            request.communication_rating,
        ]);

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for performance rating creation");
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

        let rating = RatingActiveModel {
            id: Set(rating_id),
            contractor_id: Set(contractor_id),
            contract_history_id: Set(request.contract_history_id),
            quality_rating: Set(request.quality_rating),
            timeliness_rating: Set(request.timeliness_rating),
            safety_rating: Set(request.safety_rating),
            resource_rating: Set(request.resource_rating),
            communication_rating: Set(request.communication_rating),
            overall_rating: Set(overall),
            evaluated_by: Set(request.evaluated_by),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = rating.insert(&txn).await.map_err(|e| {
            error!(error = %e, rating_id = %rating_id, "Failed to create performance rating");
            ServiceError::DatabaseError(e)
        })?;

        if let Some(history_id) = request.contract_history_id {
            propagate_to_history(&txn, history_id, overall).await?;
        }
        contractors::recompute_overall_rating(&txn, contractor_id).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, rating_id = %rating_id, "Failed to commit performance rating creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(rating_id = %rating_id, contractor_id = %contractor_id, %overall, "Performance rating created");
        self.notify(contractor_id).await;

        Ok(model.into())
    }

    /// Re-derives an evaluation with the patch merged over the stored
    /// sub-scores: a sub-score omitted from the patch keeps its prior value.
    #[instrument(skip(self, request))]
    pub async fn update_performance_rating(
        &self,
        rating_id: Uuid,
        request: UpdatePerformanceRatingRequest,
    ) -> Result<PerformanceRatingResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        validate_sub_scores(&[
            ("quality_rating", request.quality_rating),
            ("timeliness_rating", request.timeliness_rating),
            ("safety_rating", request.safety_rating),
            ("resource_rating", request.resource_rating),
            ("communication_rating", request.communication_rating),
        ])?;

        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, rating_id = %rating_id, "Failed to start transaction for performance rating update");
            ServiceError::DatabaseError(e)
        })?;

        let rating = RatingEntity::find_by_id(rating_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Performance rating {} not found", rating_id))
            })?;

        let contractor_id = rating.contractor_id;
        let history_id = rating.contract_history_id;

        let quality = request.quality_rating.or(rating.quality_rating);
        let timeliness = request.timeliness_rating.or(rating.timeliness_rating);
        let safety = request.safety_rating.or(rating.safety_rating);
        let resource = request.resource_rating.or(rating.resource_rating);
        let communication = request.communication_rating.or(rating.communication_rating);

        let overall =
            derive_overall_rating(&[quality, timeliness, safety, resource, communication]);

        let mut active: RatingActiveModel = rating.into();
        active.quality_rating = Set(quality);
        active.timeliness_rating = Set(timeliness);
        active.safety_rating = Set(safety);
        active.resource_rating = Set(resource);
        active.communication_rating = Set(communication);
        active.overall_rating = Set(overall);
        if let Some(evaluated_by) = request.evaluated_by {
            active.evaluated_by = Set(Some(evaluated_by));
        }
        active.updated_at = Set(Some(Utc::now()));

        let model = active.update(&txn).await.map_err(|e| {
            error!(error = %e, rating_id = %rating_id, "Failed to update performance rating");
            ServiceError::DatabaseError(e)
        })?;

        if let Some(history_id) = history_id {
            propagate_to_history(&txn, history_id, overall).await?;
        }
        contractors::recompute_overall_rating(&txn, contractor_id).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, rating_id = %rating_id, "Failed to commit performance rating update");
            ServiceError::DatabaseError(e)
        })?;

        info!(rating_id = %rating_id, %overall, "Performance rating updated");
        self.notify(contractor_id).await;

        Ok(model.into())
    }

    /// Removes an evaluation and recomputes the contractor's rating
    /// aggregate from the remaining rows.
    ///
    /// The linked contract record's `performance_rating` stays as last
    /// written; a deleted evaluation is not retracted from it.
    #[instrument(skip(self))]
    pub async fn delete_performance_rating(&self, rating_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, rating_id = %rating_id, "Failed to start transaction for performance rating deletion");
            ServiceError::DatabaseError(e)
        })?;

        let rating = RatingEntity::find_by_id(rating_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Performance rating {} not found", rating_id))
            })?;

        let contractor_id = rating.contractor_id;

        rating.delete(&txn).await.map_err(|e| {
            error!(error = %e, rating_id = %rating_id, "Failed to delete performance rating");
            ServiceError::DatabaseError(e)
        })?;

        contractors::recompute_overall_rating(&txn, contractor_id).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, rating_id = %rating_id, "Failed to commit performance rating deletion");
            ServiceError::DatabaseError(e)
        })?;

        info!(rating_id = %rating_id, "Performance rating deleted");
        self.notify(contractor_id).await;

        Ok(())
    }

    /// Gets an evaluation by ID
    #[instrument(skip(self))]
    pub async fn get_performance_rating(
        &self,
        rating_id: Uuid,
    ) -> Result<Option<PerformanceRatingResponse>, ServiceError> {
        let db = &*self.db_pool;
        let rating = RatingEntity::find_by_id(rating_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(rating.map(Into::into))
    }

    /// Lists evaluations, optionally scoped to one contractor
    #[instrument(skip(self))]
    pub async fn list_performance_ratings(
        &self,
        contractor_id: Option<Uuid>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PerformanceRatingResponse>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = RatingEntity::find();
        if let Some(contractor_id) = contractor_id {
            query = query.filter(performance_rating::Column::ContractorId.eq(contractor_id));
        }
        let ratings = query
            .order_by_desc(performance_rating::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(ratings.into_iter().map(Into::into).collect())
    }

    async fn notify(&self, contractor_id: Uuid) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ContractorRatingRecomputed(contractor_id))
                .await
            {
                warn!(error = %e, contractor_id = %contractor_id, "Failed to send rating recompute event");
            }
        }
    }
}

fn validate_sub_scores(scores: &[(&str, Option<Decimal>)]) -> Result<(), ServiceError> {
    for (name, score) in scores {
        ensure_score_range(name, *score)?;
    }
    Ok(())
}

/// Writes a derived overall rating into the named contract record.
///
/// A dangling `contract_history_id` is a silent skip since the reference is
/// optional.
async fn propagate_to_history<C: ConnectionTrait>(
    conn: &C,
    history_id: Uuid,
    overall: Decimal,
) -> Result<(), ServiceError> {
    let Some(history) = contract_history::Entity::find_by_id(history_id)
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
    else {
        debug!(history_id = %history_id, "Contract history not found; skipping rating propagation");
        return Ok(());
    };

    let mut active: HistoryActiveModel = history.into();
    active.performance_rating = Set(Some(overall));
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn).await.map_err(ServiceError::DatabaseError)?;

    debug!(history_id = %history_id, %overall, "Rating propagated to contract history");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    #[test]
    fn full_sub_scores_average_exactly() {
        let overall = derive_overall_rating(&[
            Some(dec!(5.0)),
            Some(dec!(4.0)),
            Some(dec!(4.0)),
            Some(dec!(4.0)),
            Some(dec!(3.0)),
        ]);
        assert_eq!(overall, dec!(4.00));
    }

    #[test]
    fn zero_and_absent_sub_scores_are_excluded() {
        let overall =
            derive_overall_rating(&[Some(dec!(0)), Some(dec!(4.0)), None, Some(dec!(5.0)), None]);
        assert_eq!(overall, dec!(4.50));
    }

    #[test]
    fn all_absent_sub_scores_yield_zero() {
        assert_eq!(derive_overall_rating(&[None, None, None, None, None]), Decimal::ZERO);
    }

    #[test]
    fn all_zero_sub_scores_yield_zero() {
        let overall = derive_overall_rating(&[
            Some(Decimal::ZERO),
            Some(Decimal::ZERO),
            Some(Decimal::ZERO),
            Some(Decimal::ZERO),
            Some(Decimal::ZERO),
        ]);
        assert_eq!(overall, Decimal::ZERO);
    }

    #[test]
    fn repeating_decimal_rounds_to_two_places() {
        let overall = derive_overall_rating(&[Some(dec!(5)), Some(dec!(4)), Some(dec!(4))]);
        assert_eq!(overall, dec!(4.33));
    }

    #[test_case(dec!(-0.5), false; "negative rejected")]
    #[test_case(dec!(5.5), false; "above five rejected")]
    #[test_case(dec!(0), true; "zero allowed")]
    #[test_case(dec!(5), true; "five allowed")]
    fn sub_score_bounds(score: Decimal, ok: bool) {
        let result = ensure_score_range("quality_rating", Some(score));
        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn absent_sub_score_passes_range_check() {
        assert!(ensure_score_range("safety_rating", None).is_ok());
    }
}
