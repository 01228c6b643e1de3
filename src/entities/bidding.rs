use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Bidding procurement status
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum BiddingStatus {
    #[sea_orm(string_value = "Pre-Procurement")]
    #[serde(rename = "Pre-Procurement")]
    PreProcurement,
    #[sea_orm(string_value = "Advertisement")]
    Advertisement,
    #[sea_orm(string_value = "Bid Evaluation")]
    #[serde(rename = "Bid Evaluation")]
    BidEvaluation,
    #[sea_orm(string_value = "Post-Qualification")]
    #[serde(rename = "Post-Qualification")]
    PostQualification,
    #[sea_orm(string_value = "Awarded")]
    Awarded,
    #[sea_orm(string_value = "Failed")]
    Failed,
}

/// Bidding: the procurement process for a program of work.
///
/// `abc` is the Approved Budget for the Contract, the ceiling price.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "biddings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub bidding_number: String,
    pub pow_id: Option<Uuid>,
    pub abc: Decimal,
    pub status: BiddingStatus,
    pub contract_cost: Option<Decimal>,
    pub winning_bidder: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
