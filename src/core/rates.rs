//! Rate table lookups and seeding.
//!
//! The rate table is read-only reference data: life stages, the expense
//! catalog, annual costs per (life stage, lifestyle, expense) and sterilization
//! costs per (life stage, sex). When the same key exists for several years the
//! most recent year is used. Seeding from [`RateConfig`] is idempotent and runs
//! in a single transaction.

use crate::{
    config::rates::RateConfig,
    core::breakdown::{Lifestyle, Sex, TooltipLine, tooltip_from_json},
    entities::{
        AnnualCost, CatalogExpense, LifeStage, SterilizationCost, annual_cost, catalog_expense,
        life_stage, sterilization_cost,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// A catalog entry with its tooltip already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Catalog id, used as the expense key of annual cost rows
    pub id: i64,
    /// Expense name
    pub name: String,
    /// Tooltip lines (may be empty)
    pub tooltip: Vec<TooltipLine>,
}

/// Resolves a life stage name to its id.
///
/// # Errors
/// Returns `LifeStageNotFound` if no life stage has this exact name.
pub async fn get_life_stage_id<C>(db: &C, name: &str) -> Result<i64>
where
    C: ConnectionTrait,
{
    LifeStage::find()
        .filter(life_stage::Column::Name.eq(name))
        .one(db)
        .await?
        .map(|stage| stage.id)
        .ok_or_else(|| Error::LifeStageNotFound {
            name: name.to_string(),
        })
}

/// Looks up the sterilization cost for a life stage and sex.
///
/// # Errors
/// Returns `RateNotFound` if the table has no row for this combination.
pub async fn get_sterilization_cost<C>(db: &C, life_stage_id: i64, sex: Sex) -> Result<f64>
where
    C: ConnectionTrait,
{
    SterilizationCost::find()
        .filter(sterilization_cost::Column::LifeStageId.eq(life_stage_id))
        .filter(sterilization_cost::Column::Sex.eq(sex.as_str()))
        .order_by_desc(sterilization_cost::Column::Year)
        .one(db)
        .await?
        .map(|row| row.cost)
        .ok_or_else(|| Error::RateNotFound {
            what: format!("sterilization cost for {sex} (life stage #{life_stage_id})"),
        })
}

/// Looks up the annual cost of a catalog expense, or `None` when there is no row.
pub async fn get_annual_cost<C>(
    db: &C,
    life_stage_id: i64,
    lifestyle: Lifestyle,
    expense_id: i64,
) -> Result<Option<f64>>
where
    C: ConnectionTrait,
{
    Ok(AnnualCost::find()
        .filter(annual_cost::Column::LifeStageId.eq(life_stage_id))
        .filter(annual_cost::Column::ExpenseId.eq(expense_id))
        .filter(annual_cost::Column::Lifestyle.eq(lifestyle.as_str()))
        .order_by_desc(annual_cost::Column::Year)
        .one(db)
        .await?
        .map(|row| row.cost))
}

/// Lists the expense catalog in catalog (id) order.
///
/// # Errors
/// Returns an error if the query fails or a stored tooltip cannot be decoded.
pub async fn list_expense_catalog<C>(db: &C) -> Result<Vec<CatalogEntry>>
where
    C: ConnectionTrait,
{
    CatalogExpense::find()
        .order_by_asc(catalog_expense::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|row| {
            Ok(CatalogEntry {
                id: row.id,
                name: row.name,
                tooltip: tooltip_from_json(row.tooltip)?,
            })
        })
        .collect()
}

/// Seeds the rate table from configuration.
///
/// Life stages and catalog entries are matched by name and created if missing
/// (catalog tooltips are refreshed). Catalog entries missing from the
/// configuration are removed together with their annual rows of every year.
/// Annual and sterilization rows for the configured year are replaced; rows of
/// other years are left alone.
///
/// # Errors
/// Returns an error if the configuration is invalid or any write fails. On
/// failure nothing is committed.
#[instrument(skip(db, config), fields(year = config.year))]
pub async fn seed_rate_table(db: &DatabaseConnection, config: &RateConfig) -> Result<()> {
    config.validate()?;
    info!(
        "Seeding rate table: {} life stages, {} catalog entries",
        config.life_stages.len(),
        config.catalog.len()
    );

    let txn = db.begin().await?;

    let mut stage_ids: HashMap<&str, i64> = HashMap::new();
    for name in &config.life_stages {
        let id = upsert_life_stage(&txn, name).await?;
        stage_ids.insert(name.as_str(), id);
    }
    let stage_id = |name: &str| {
        stage_ids.get(name).copied().ok_or_else(|| Error::Config {
            message: format!("Unknown life stage '{name}' in rate table"),
        })
    };

    for entry in &config.catalog {
        let tooltip = entry.tooltip_lines();
        let expense_id = upsert_catalog_expense(&txn, &entry.name, &tooltip).await?;

        AnnualCost::delete_many()
            .filter(annual_cost::Column::ExpenseId.eq(expense_id))
            .filter(annual_cost::Column::Year.eq(config.year))
            .exec(&txn)
            .await?;

        for rate in &entry.costs {
            annual_cost::ActiveModel {
                life_stage_id: Set(stage_id(&rate.life_stage)?),
                expense_id: Set(expense_id),
                lifestyle: Set(rate.lifestyle.as_str().to_string()),
                cost: Set(rate.cost),
                year: Set(config.year),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
        debug!("Seeded {} annual rates for '{}'", entry.costs.len(), entry.name);
    }

    let removed = remove_unlisted_catalog_entries(&txn, config).await?;
    if removed > 0 {
        info!(removed, "Removed catalog entries no longer in the rate table");
    }

    SterilizationCost::delete_many()
        .filter(sterilization_cost::Column::Year.eq(config.year))
        .exec(&txn)
        .await?;
    for rate in &config.sterilization {
        sterilization_cost::ActiveModel {
            life_stage_id: Set(stage_id(&rate.life_stage)?),
            sex: Set(rate.sex.as_str().to_string()),
            cost: Set(rate.cost),
            year: Set(config.year),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    info!("Rate table seeded.");
    Ok(())
}

/// Deletes catalog entries whose name is not in `config`, with their rates.
async fn remove_unlisted_catalog_entries<C>(db: &C, config: &RateConfig) -> Result<u64>
where
    C: ConnectionTrait,
{
    let listed = config.catalog.iter().map(|entry| entry.name.as_str());
    let stale: Vec<i64> = CatalogExpense::find()
        .filter(catalog_expense::Column::Name.is_not_in(listed))
        .all(db)
        .await?
        .into_iter()
        .map(|entry| entry.id)
        .collect();
    if stale.is_empty() {
        return Ok(0);
    }

    AnnualCost::delete_many()
        .filter(annual_cost::Column::ExpenseId.is_in(stale.iter().copied()))
        .exec(db)
        .await?;
    let removed = CatalogExpense::delete_many()
        .filter(catalog_expense::Column::Id.is_in(stale))
        .exec(db)
        .await?
        .rows_affected;
    Ok(removed)
}

async fn upsert_life_stage<C>(db: &C, name: &str) -> Result<i64>
where
    C: ConnectionTrait,
{
    if let Some(existing) = LifeStage::find()
        .filter(life_stage::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(existing.id);
    }

    let created = life_stage::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(created.id)
}

async fn upsert_catalog_expense<C>(db: &C, name: &str, tooltip: &[TooltipLine]) -> Result<i64>
where
    C: ConnectionTrait,
{
    let tooltip_json = if tooltip.is_empty() {
        None
    } else {
        Some(serde_json::to_value(tooltip)?)
    };

    let existing = CatalogExpense::find()
        .filter(catalog_expense::Column::Name.eq(name))
        .one(db)
        .await?;

    let model = if let Some(existing) = existing {
        let mut active: catalog_expense::ActiveModel = existing.into();
        active.tooltip = Set(tooltip_json);
        active.update(db).await?
    } else {
        catalog_expense::ActiveModel {
            name: Set(name.to_string()),
            tooltip: Set(tooltip_json),
            ..Default::default()
        }
        .insert(db)
        .await?
    };
    Ok(model.id)
}
