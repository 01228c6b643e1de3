use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Performance evaluation of a contractor, optionally tied to one contract.
///
/// `overall_rating` is derived from the five sub-scores; sub-scores that are
/// absent or zero do not participate in the average.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "performance_ratings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contractor::Entity",
        from = "Column::ContractorId",
        to = "super::contractor::Column::Id"
    )]
    Contractor,
}

impl Related<super::contractor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contractor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
