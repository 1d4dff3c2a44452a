//! Life stage entity - Kitten, Adult or Senior.
//!
//! The life stage is the primary key of nearly every cost lookup.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Life stage database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "life_stages")]
pub struct Model {
    /// Unique identifier for the life stage
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, matched exactly by lookups (e.g., "Kitten")
    #[sea_orm(unique)]
    pub name: String,
}

/// Defines relationships between `LifeStage` and the rate tables
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One life stage has many annual cost rows
    #[sea_orm(has_many = "super::annual_cost::Entity")]
    AnnualCosts,
    /// One life stage has many sterilization cost rows
    #[sea_orm(has_many = "super::sterilization_cost::Entity")]
    SterilizationCosts,
}

impl Related<super::annual_cost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnnualCosts.def()
    }
}

impl Related<super::sterilization_cost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SterilizationCosts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
