//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Estimate commands: compute, save, list and delete
pub mod estimate;

/// Expense line management commands
pub mod expense;

/// General utility commands
pub mod general;

// Export commands
pub use estimate::*;
pub use expense::*;
pub use general::*;
