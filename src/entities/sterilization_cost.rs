//! Sterilization cost entity - One-time sterilization cost by life stage and sex.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sterilization cost database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sterilization_costs")]
pub struct Model {
    /// Unique identifier for the rate row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Life stage this cost applies to
    pub life_stage_id: i64,
    /// `"Male"` or `"Female"`
    pub sex: String,
    /// Cost in dollars
    pub cost: f64,
    /// Year the rate was published; the latest year wins
    pub year: i32,
}

/// Defines relationships between `SterilizationCost` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each cost belongs to one life stage
    #[sea_orm(
        belongs_to = "super::life_stage::Entity",
        from = "Column::LifeStageId",
        to = "super::life_stage::Column::Id"
    )]
    LifeStage,
}

impl Related<super::life_stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LifeStage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
