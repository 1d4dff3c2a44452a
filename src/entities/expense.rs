//! Expense entity - A single cost line inside an estimate.
//!
//! `order` is dense and zero-based within the parent estimate; see
//! [`crate::core::ordering`] for how it is maintained.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the estimate that owns this line
    pub estimate_id: i64,
    /// Name of the expense (e.g., "Food")
    pub name: String,
    /// Annual cost in dollars
    pub cost: f64,
    /// Display position within the estimate
    pub order: i32,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each expense belongs to one estimate
    #[sea_orm(
        belongs_to = "super::estimate::Entity",
        from = "Column::EstimateId",
        to = "super::estimate::Column::Id"
    )]
    Estimate,
}

impl Related<super::estimate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Estimate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
