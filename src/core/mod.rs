//! Core business logic - framework-agnostic rate lookups, breakdown
//! calculation and estimate management.

/// Annual cost breakdown calculation
pub mod breakdown;
/// Owner-scoped estimate operations
pub mod estimate;
/// Expense line operations
pub mod expense;
/// Dense ordering of expense lines
pub mod ordering;
/// Rate table lookups and seeding
pub mod rates;
/// In-memory staging of computed breakdowns
pub mod staging;
