use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Contractor standing
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ContractorStatus {
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Blacklisted")]
    Blacklisted,
    #[sea_orm(string_value = "Suspended")]
    Suspended,
    #[sea_orm(string_value = "Inactive")]
    Inactive,
}

/// Contractor with derived aggregate statistics.
///
/// The aggregate columns (`total_contracts` through `overall_rating`) are
/// entirely derived from contract-history and performance-rating rows and are
/// written only by the aggregate recompute methods, never by client requests.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contractors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,
    pub tin: Option<String>,
    pub status: ContractorStatus,
    pub total_contracts: i32,
    pub total_contract_value: Decimal,
    pub completed_contracts: i32,
    pub ongoing_contracts: i32,
    pub overall_rating: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::contract_history::Entity")]
    ContractHistory,
    #[sea_orm(has_many = "super::performance_rating::Entity")]
    PerformanceRating,
}

impl Related<super::contract_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContractHistory.def()
    }
}

impl Related<super::performance_rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PerformanceRating.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
