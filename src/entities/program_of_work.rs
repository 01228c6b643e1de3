use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Program-of-work lifecycle status
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PowStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "For Review")]
    #[serde(rename = "For Review")]
    ForReview,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "For Bidding")]
    #[serde(rename = "For Bidding")]
    ForBidding,
    #[sea_orm(string_value = "Awarded")]
    Awarded,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

/// Program of work: a planned infrastructure project awaiting budget and
/// bidding before construction starts.
///
/// `budget_id` and `bidding_id` are optional references; deleting the
/// referenced row never cascades back here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "program_of_works")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub pow_number: String,
    pub title: String,
    pub budget_id: Option<Uuid>,
    pub estimated_cost: Decimal,
    pub fiscal_year: i32,
    pub status: PowStatus,
    pub bidding_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
