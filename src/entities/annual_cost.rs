//! Annual cost entity - Yearly cost of one catalog expense for a life stage and lifestyle.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Annual cost database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "annual_costs")]
pub struct Model {
    /// Unique identifier for the rate row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Life stage this rate applies to
    pub life_stage_id: i64,
    /// Catalog expense this rate prices
    pub expense_id: i64,
    /// `"Indoor"` or `"Outdoor"`
    pub lifestyle: String,
    /// Annual cost in dollars
    pub cost: f64,
    /// Year the rate was published; the latest year wins
    pub year: i32,
}

/// Defines relationships between `AnnualCost` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each rate belongs to one life stage
    #[sea_orm(
        belongs_to = "super::life_stage::Entity",
        from = "Column::LifeStageId",
        to = "super::life_stage::Column::Id"
    )]
    LifeStage,
    /// Each rate belongs to one catalog expense
    #[sea_orm(
        belongs_to = "super::catalog_expense::Entity",
        from = "Column::ExpenseId",
        to = "super::catalog_expense::Column::Id"
    )]
    CatalogExpense,
}

impl Related<super::life_stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LifeStage.def()
    }
}

impl Related<super::catalog_expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CatalogExpense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
