//! Rate table loading from config.toml
//!
//! The reference costs used by the breakdown calculator are kept in a TOML file
//! and seeded into the database at startup by
//! [`crate::core::rates::seed_rate_table`].
//!
//! ```toml
//! year = 2025
//! life_stages = ["Kitten", "Adult", "Senior"]
//!
//! [[catalog]]
//! name = "Food"
//! tooltip = "Dry and wet food"
//! costs = [{ life_stage = "Kitten", lifestyle = "Indoor", cost = 300.0 }]
//!
//! [[sterilization]]
//! life_stage = "Kitten"
//! sex = "Male"
//! cost = 150.0
//! ```

use crate::{
    core::breakdown::{Lifestyle, RawTooltip, Sex, TooltipLine},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::{collections::HashSet, path::Path};

/// Configuration structure representing the entire rate file
#[derive(Debug, Deserialize, Clone)]
pub struct RateConfig {
    /// Year the rates were published
    pub year: i32,
    /// Life stage names, usually Kitten, Adult and Senior
    pub life_stages: Vec<String>,
    /// Expense catalog, in display order
    pub catalog: Vec<CatalogEntryConfig>,
    /// Sterilization costs by life stage and sex
    #[serde(default)]
    pub sterilization: Vec<SterilizationRateConfig>,
}

/// One catalog expense and its annual rates
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogEntryConfig {
    /// Name of the expense
    pub name: String,
    /// Optional help text: a string, a `{ text, link }` table or a list of them
    #[serde(default)]
    pub tooltip: Option<RawTooltip>,
    /// Annual costs by life stage and lifestyle
    #[serde(default)]
    pub costs: Vec<AnnualRateConfig>,
}

impl CatalogEntryConfig {
    /// Tooltip in its canonical list shape.
    #[must_use]
    pub fn tooltip_lines(&self) -> Vec<TooltipLine> {
        self.tooltip
            .clone()
            .map(RawTooltip::into_lines)
            .unwrap_or_default()
    }
}

/// Annual cost of a catalog expense for one life stage and lifestyle
#[derive(Debug, Deserialize, Clone)]
pub struct AnnualRateConfig {
    /// Life stage name
    pub life_stage: String,
    /// Indoor or Outdoor
    pub lifestyle: Lifestyle,
    /// Annual cost in dollars
    pub cost: f64,
}

/// Sterilization cost for one life stage and sex
#[derive(Debug, Deserialize, Clone)]
pub struct SterilizationRateConfig {
    /// Life stage name
    pub life_stage: String,
    /// Male or Female
    pub sex: Sex,
    /// Cost in dollars
    pub cost: f64,
}

impl RateConfig {
    /// Checks that names are present and unique, every rate refers to a
    /// declared life stage, and every cost is a finite non-negative number.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let mut stages = HashSet::new();
        for name in &self.life_stages {
            if name.trim().is_empty() || !stages.insert(name.as_str()) {
                return Err(config_error(format!("Invalid or duplicate life stage '{name}'")));
            }
        }

        let check_rate = |what: &str, life_stage: &str, cost: f64| {
            if !stages.contains(life_stage) {
                return Err(config_error(format!(
                    "{what} refers to unknown life stage '{life_stage}'"
                )));
            }
            if !cost.is_finite() || cost < 0.0 {
                return Err(config_error(format!("{what} has invalid cost {cost}")));
            }
            Ok(())
        };

        let mut names = HashSet::new();
        for entry in &self.catalog {
            if entry.name.trim().is_empty() || !names.insert(entry.name.as_str()) {
                return Err(config_error(format!(
                    "Invalid or duplicate catalog entry '{}'",
                    entry.name
                )));
            }
            let mut keys = HashSet::new();
            for rate in &entry.costs {
                check_rate(&entry.name, &rate.life_stage, rate.cost)?;
                if !keys.insert((rate.life_stage.as_str(), rate.lifestyle)) {
                    return Err(config_error(format!(
                        "'{}' has two rates for {} {}",
                        entry.name, rate.lifestyle, rate.life_stage
                    )));
                }
            }
        }

        let mut keys = HashSet::new();
        for rate in &self.sterilization {
            check_rate("Sterilization", &rate.life_stage, rate.cost)?;
            if !keys.insert((rate.life_stage.as_str(), rate.sex)) {
                return Err(config_error(format!(
                    "Two sterilization rates for {} {}",
                    rate.sex, rate.life_stage
                )));
            }
        }

        Ok(())
    }
}

fn config_error(message: String) -> Error {
    Error::Config { message }
}

/// Loads the rate table from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RateConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read rate file {}: {e}", path.display()),
    })?;

    parse_config(&contents)
}

/// Parses and validates a rate table from TOML text.
///
/// # Errors
/// Returns an error if the TOML is invalid or fails [`RateConfig::validate`].
pub fn parse_config(contents: &str) -> Result<RateConfig> {
    let config: RateConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse rate table: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads the rate table from `RATES_CONFIG`, or `./config.toml` if unset.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_default_config() -> Result<RateConfig> {
    let path = std::env::var("RATES_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}
