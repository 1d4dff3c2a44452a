//! Autocomplete handlers for Discord slash command parameters.
//!
//! Expense names are free text, but most lines a user adds are catalog
//! expenses, so the catalog names are suggested as the user types.

use crate::{bot::BotData, core::rates, errors::Error};

/// Discord shows at most this many suggestions.
const MAX_SUGGESTIONS: usize = 25;

/// Catalog names containing `partial` (case-insensitive), sorted.
#[must_use]
pub fn matching_names(names: Vec<String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(MAX_SUGGESTIONS)
        .collect();
    matching.sort();
    matching
}

/// Provides autocomplete suggestions for expense names from the catalog.
///
/// # Arguments
/// * `ctx` - The poise context containing the database connection
/// * `partial` - The partial string the user has typed so far
pub async fn autocomplete_expense_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(catalog) = rates::list_expense_catalog(&ctx.data().database).await else {
        return Vec::new();
    };
    matching_names(catalog.into_iter().map(|entry| entry.name).collect(), partial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_names() {
        let names = vec![
            "Litter".to_string(),
            "Food".to_string(),
            "Insurance program (basic)".to_string(),
        ];
        assert_eq!(
            matching_names(names.clone(), "in"),
            vec!["Insurance program (basic)"]
        );
        assert_eq!(
            matching_names(names.clone(), ""),
            vec!["Food", "Insurance program (basic)", "Litter"]
        );
        assert!(matching_names(names, "zzz").is_empty());
    }
}
