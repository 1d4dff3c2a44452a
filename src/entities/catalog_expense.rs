//! Catalog expense entity - The kinds of expenses a breakdown can contain.
//!
//! Each catalog entry has a name and an optional tooltip. The tooltip is stored
//! as JSON in the canonical list shape (`[{ "text": ..., "link": ... }]`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense catalog database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_catalog")]
pub struct Model {
    /// Unique identifier; also the display order of breakdown lines
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the expense (e.g., "Food", "Insurance program (basic)")
    #[sea_orm(unique)]
    pub name: String,
    /// Help text shown next to the line, if any
    pub tooltip: Option<Json>,
}

/// Defines relationships between `CatalogExpense` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One catalog entry has many annual cost rows
    #[sea_orm(has_many = "super::annual_cost::Entity")]
    AnnualCosts,
}

impl Related<super::annual_cost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnnualCosts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
