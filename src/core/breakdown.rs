//! Breakdown calculator - Turns questionnaire answers into annual cost lines.
//!
//! The calculation is a sequence of rate table lookups, one per catalog entry.
//! It never writes to the database. Two catalog entries get special treatment:
//! sterilization only applies to kittens and is priced by sex, and the basic
//! insurance program only appears when the user asked for insurance. Lines that
//! resolve to a zero cost are left out of the result.

use crate::{
    core::rates,
    errors::{Error, Result},
};
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Exact catalog name of the insurance line.
pub const INSURANCE_EXPENSE_NAME: &str = "Insurance program (basic)";

/// Catalog entries whose name contains this word are priced as sterilization.
pub const STERILIZATION_KEYWORD: &str = "sterilization";

/// Life stage of the cat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifeStage {
    /// Under one year old
    Kitten,
    /// One to ten years old
    Adult,
    /// Older than ten years
    Senior,
}

/// Sex of the cat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    /// Male
    Male,
    /// Female
    Female,
}

/// Whether the cat lives indoors or goes outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifestyle {
    /// Indoor only
    Indoor,
    /// Goes outdoors
    Outdoor,
}

macro_rules! categorical {
    ($ty:ident, $label:literal, [$($variant:ident),+ $(,)?]) => {
        impl $ty {
            /// Every value, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Name as stored in the rate table.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| Error::Validation {
                        message: format!("Unknown {}: '{s}'", $label),
                    })
            }
        }
    };
}

categorical!(LifeStage, "life stage", [Kitten, Adult, Senior]);
categorical!(Sex, "sex", [Male, Female]);
categorical!(Lifestyle, "lifestyle", [Indoor, Outdoor]);

/// Validated questionnaire answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostInput {
    /// Life stage of the cat
    pub life_stage: LifeStage,
    /// Sex of the cat
    pub sex: Sex,
    /// Indoor or outdoor
    pub lifestyle: Lifestyle,
    /// Whether to include the basic insurance program
    pub insurance: bool,
}

/// One line of a tooltip, optionally linking to a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipLine {
    /// Text shown to the user
    pub text: String,
    /// Optional URL for further reading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Tooltip data as it may appear in configuration or older rows: a bare string,
/// a single line, or a list of lines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawTooltip {
    /// A single plain-text tooltip
    Text(String),
    /// A single line object
    Line(TooltipLine),
    /// Already in the canonical list shape
    Lines(Vec<TooltipLine>),
}

impl RawTooltip {
    /// Normalizes any accepted shape into the canonical ordered list,
    /// dropping blank lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<TooltipLine> {
        let lines = match self {
            Self::Text(text) => vec![TooltipLine { text, link: None }],
            Self::Line(line) => vec![line],
            Self::Lines(lines) => lines,
        };
        lines
            .into_iter()
            .filter(|line| !line.text.trim().is_empty())
            .collect()
    }
}

/// Decodes a stored tooltip column into the canonical list shape.
///
/// # Errors
/// Returns an error if the JSON matches none of the accepted shapes.
pub fn tooltip_from_json(value: Option<serde_json::Value>) -> Result<Vec<TooltipLine>> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(value) => Ok(serde_json::from_value::<RawTooltip>(value)?.into_lines()),
    }
}

/// A computed cost line, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownItem {
    /// Catalog name of the expense
    pub name: String,
    /// Annual cost in dollars, always positive
    pub cost: f64,
    /// Help text for the line (may be empty)
    #[serde(default)]
    pub tooltip: Vec<TooltipLine>,
}

/// Computes the annual cost breakdown for the given answers.
///
/// Lines follow catalog order. Sterilization is only included for kittens and
/// insurance only when requested; for both, a missing rate row is an error
/// rather than a zero. Any other catalog entry without a rate row costs zero
/// and is omitted, as is any line whose resolved cost is not positive.
///
/// # Errors
/// Returns an error if the life stage is unknown, a required rate row is
/// missing, or a lookup fails. No partial breakdown is returned.
pub async fn calculate_breakdown<C>(db: &C, input: &CostInput) -> Result<Vec<BreakdownItem>>
where
    C: ConnectionTrait,
{
    let life_stage_id = rates::get_life_stage_id(db, input.life_stage.as_str()).await?;
    let catalog = rates::list_expense_catalog(db).await?;

    let mut breakdown = Vec::with_capacity(catalog.len());
    for entry in catalog {
        let cost = if entry.name.to_lowercase().contains(STERILIZATION_KEYWORD) {
            if input.life_stage != LifeStage::Kitten {
                continue;
            }
            rates::get_sterilization_cost(db, life_stage_id, input.sex).await?
        } else if entry.name == INSURANCE_EXPENSE_NAME {
            if !input.insurance {
                continue;
            }
            rates::get_annual_cost(db, life_stage_id, input.lifestyle, entry.id)
                .await?
                .ok_or_else(|| Error::RateNotFound {
                    what: format!(
                        "annual cost of '{}' for {} {}",
                        entry.name, input.lifestyle, input.life_stage
                    ),
                })?
        } else {
            rates::get_annual_cost(db, life_stage_id, input.lifestyle, entry.id)
                .await?
                .unwrap_or(0.0)
        };

        if cost > 0.0 {
            breakdown.push(BreakdownItem {
                name: entry.name,
                cost,
                tooltip: entry.tooltip,
            });
        }
    }

    tracing::debug!(
        lines = breakdown.len(),
        total = total_cost(&breakdown),
        "Computed breakdown for {:?}",
        input
    );
    Ok(breakdown)
}

/// Sum of all line costs; `0.0` for no lines.
#[must_use]
pub fn total_cost(items: &[BreakdownItem]) -> f64 {
    items.iter().fold(0.0, |total, item| total + item.cost)
}

/// Default estimate name derived from the answers,
/// e.g. "Male Indoor Kitten with Insurance".
#[must_use]
pub fn estimate_name(input: &CostInput) -> String {
    let base = format!("{} {} {}", input.sex, input.lifestyle, input.life_stage);
    if input.insurance {
        format!("{base} with Insurance")
    } else {
        base
    }
}
