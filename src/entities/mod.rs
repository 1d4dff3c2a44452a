//! Entity module - Contains all SeaORM entity definitions for the database.
//! The first four tables hold read-only reference rates; the last two hold
//! the estimates and expense lines owned by users.

pub mod annual_cost;
pub mod catalog_expense;
pub mod estimate;
pub mod expense;
pub mod life_stage;
pub mod sterilization_cost;

// Re-export specific types to avoid conflicts
pub use annual_cost::{Column as AnnualCostColumn, Entity as AnnualCost, Model as AnnualCostModel};
pub use catalog_expense::{
    Column as CatalogExpenseColumn, Entity as CatalogExpense, Model as CatalogExpenseModel,
};
pub use estimate::{Column as EstimateColumn, Entity as Estimate, Model as EstimateModel};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use life_stage::{Column as LifeStageColumn, Entity as LifeStage, Model as LifeStageModel};
pub use sterilization_cost::{
    Column as SterilizationCostColumn, Entity as SterilizationCost,
    Model as SterilizationCostModel,
};
