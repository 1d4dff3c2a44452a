//! Shared test utilities for the cat cost estimator.
//!
//! This module provides common helper functions for setting up test databases,
//! a small rate table, and estimates and expenses with sensible defaults.

use crate::{
    config::rates::{AnnualRateConfig, CatalogEntryConfig, RateConfig, SterilizationRateConfig},
    core::{
        breakdown::{LifeStage, Lifestyle, RawTooltip, Sex},
        estimate,
        expense::{self, NewExpense},
        rates,
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Owner id used by the helpers below.
pub const TEST_OWNER: &str = "test_user";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

fn annual(life_stage: LifeStage, lifestyle: Lifestyle, cost: f64) -> AnnualRateConfig {
    AnnualRateConfig {
        life_stage: life_stage.as_str().to_string(),
        lifestyle,
        cost,
    }
}

/// A small 2025 rate table.
///
/// # Contents
/// * Food: every life stage and lifestyle, one tooltip line (Kitten Indoor 300)
/// * Litter: every life stage, indoor and outdoor (Kitten Indoor 100)
/// * Sterilization: Kitten only (Male 150, Female 250)
/// * Insurance program (basic): every combination except Senior Outdoor
///   (Kitten Indoor 200, Adult Outdoor 260)
#[must_use]
pub fn test_rate_config() -> RateConfig {
    use LifeStage::{Adult, Kitten, Senior};
    use Lifestyle::{Indoor, Outdoor};

    RateConfig {
        year: 2025,
        life_stages: LifeStage::ALL
            .iter()
            .map(|stage| stage.as_str().to_string())
            .collect(),
        catalog: vec![
            CatalogEntryConfig {
                name: "Food".to_string(),
                tooltip: Some(RawTooltip::Text("Dry and wet food".to_string())),
                costs: vec![
                    annual(Kitten, Indoor, 300.0),
                    annual(Kitten, Outdoor, 320.0),
                    annual(Adult, Indoor, 400.0),
                    annual(Adult, Outdoor, 430.0),
                    annual(Senior, Indoor, 420.0),
                    annual(Senior, Outdoor, 440.0),
                ],
            },
            CatalogEntryConfig {
                name: "Litter".to_string(),
                tooltip: None,
                costs: vec![
                    annual(Kitten, Indoor, 100.0),
                    annual(Kitten, Outdoor, 60.0),
                    annual(Adult, Indoor, 150.0),
                    annual(Adult, Outdoor, 90.0),
                    annual(Senior, Indoor, 160.0),
                    annual(Senior, Outdoor, 100.0),
                ],
            },
            CatalogEntryConfig {
                name: "Sterilization".to_string(),
                tooltip: None,
                costs: Vec::new(),
            },
            CatalogEntryConfig {
                name: "Insurance program (basic)".to_string(),
                tooltip: None,
                costs: vec![
                    annual(Kitten, Indoor, 200.0),
                    annual(Kitten, Outdoor, 220.0),
                    annual(Adult, Indoor, 240.0),
                    annual(Adult, Outdoor, 260.0),
                    annual(Senior, Indoor, 300.0),
                ],
            },
        ],
        sterilization: vec![
            SterilizationRateConfig {
                life_stage: Kitten.as_str().to_string(),
                sex: Sex::Male,
                cost: 150.0,
            },
            SterilizationRateConfig {
                life_stage: Kitten.as_str().to_string(),
                sex: Sex::Female,
                cost: 250.0,
            },
        ],
    }
}

/// Creates a test database seeded with [`test_rate_config`].
pub async fn setup_rated_db() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    rates::seed_rate_table(&db, &test_rate_config()).await?;
    Ok(db)
}

/// Creates an empty estimate owned by [`TEST_OWNER`].
pub async fn create_test_estimate(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::estimate::Model> {
    estimate::create_estimate(db, Some(TEST_OWNER), name).await
}

/// Sets up a complete test environment with an empty estimate.
/// Returns (db, estimate) for common test scenarios.
pub async fn setup_with_estimate() -> Result<(DatabaseConnection, entities::estimate::Model)> {
    let db = setup_test_db().await?;
    let estimate = create_test_estimate(&db, "Test Estimate").await?;
    Ok((db, estimate))
}

/// Adds a line to an estimate owned by [`TEST_OWNER`].
pub async fn create_test_expense(
    db: &DatabaseConnection,
    estimate_id: i64,
    name: &str,
    cost: f64,
) -> Result<entities::expense::Model> {
    expense::create_expense(
        db,
        Some(TEST_OWNER),
        estimate_id,
        NewExpense {
            name: name.to_string(),
            cost,
        },
    )
    .await
}
