//! Estimate entity - A named, owned collection of expense lines.
//!
//! `updated_at` is refreshed whenever one of the estimate's expenses is created,
//! edited, reordered or deleted, so listing by it shows the most recently
//! touched estimate first.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Estimate header database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_estimates")]
pub struct Model {
    /// Unique identifier for the estimate
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier of the user who owns the estimate
    pub owner_id: String,
    /// Human-readable name (e.g., "Male Indoor Kitten with Insurance")
    pub name: String,
    /// When the estimate was created
    pub created_at: DateTimeUtc,
    /// When the estimate or one of its expenses was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Estimate and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One estimate has many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
