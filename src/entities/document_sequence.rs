use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Monotonic counter backing document-number generation.
///
/// One row per scope (`pow-<fiscalYear>`, `bidding`); incremented atomically
/// inside the creating transaction so concurrent creators never observe the
/// same value.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document_sequences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub scope: String,

    pub value: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
