//! Estimate Discord commands - compute, save, list and delete estimates.
//!
//! `/estimate` computes a breakdown and stages it for the author; `/save_estimate`
//! persists whatever is staged. The other commands work on saved estimates.

use crate::core::{
    breakdown::{BreakdownItem, LifeStage, Lifestyle, Sex, estimate_name, total_cost},
    staging::PendingIntent,
};
use std::fmt::Write;

/// Renders breakdown lines as a bulleted list with tooltips and a total.
///
/// # Errors
/// Returns an error only if writing to the string fails.
pub fn format_breakdown(items: &[BreakdownItem]) -> crate::errors::Result<String> {
    let mut response = String::new();
    for item in items {
        writeln!(&mut response, "• **{}** - ${:.2}", item.name, item.cost)?;
        for line in &item.tooltip {
            match &line.link {
                Some(link) => writeln!(&mut response, "  _{}_ (<{link}>)", line.text)?,
                None => writeln!(&mut response, "  _{}_", line.text)?,
            }
        }
    }
    write!(&mut response, "\n**Total:** ${:.2} / year", total_cost(items))?;
    Ok(response)
}

/// Footer of the `/estimate` embed, naming any unsaved breakdown it replaces.
#[must_use]
pub fn staging_footer(previous: Option<&PendingIntent>) -> String {
    match previous {
        Some(previous) => format!(
            "Use /save_estimate to keep this breakdown (replaces your unsaved {})",
            estimate_name(&previous.input)
        ),
        None => "Use /save_estimate to keep this breakdown".to_string(),
    }
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{LifeStage, Lifestyle, Sex, format_breakdown, staging_footer};
    use crate::{
        bot::{BotData, current_owner},
        core::{
            breakdown::{self, CostInput},
            estimate, expense,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum LifeStageChoice {
        #[name = "Kitten (under 1 year)"]
        Kitten,
        #[name = "Adult (1 to 10 years)"]
        Adult,
        #[name = "Senior (over 10 years)"]
        Senior,
    }

    impl From<LifeStageChoice> for LifeStage {
        fn from(choice: LifeStageChoice) -> Self {
            match choice {
                LifeStageChoice::Kitten => Self::Kitten,
                LifeStageChoice::Adult => Self::Adult,
                LifeStageChoice::Senior => Self::Senior,
            }
        }
    }

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum SexChoice {
        Male,
        Female,
    }

    impl From<SexChoice> for Sex {
        fn from(choice: SexChoice) -> Self {
            match choice {
                SexChoice::Male => Self::Male,
                SexChoice::Female => Self::Female,
            }
        }
    }

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum LifestyleChoice {
        #[name = "Indoor only"]
        Indoor,
        #[name = "Goes outdoors"]
        Outdoor,
    }

    impl From<LifestyleChoice> for Lifestyle {
        fn from(choice: LifestyleChoice) -> Self {
            match choice {
                LifestyleChoice::Indoor => Self::Indoor,
                LifestyleChoice::Outdoor => Self::Outdoor,
            }
        }
    }

    /// Computes the yearly cost of a cat from a few answers.
    ///
    /// The result is kept for you for a while so you can save it with
    /// `/save_estimate`. Computing a new breakdown replaces the previous one.
    #[poise::command(slash_command, prefix_command)]
    pub async fn estimate(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Life stage of the cat"] life_stage: LifeStageChoice,
        #[description = "Sex of the cat"] sex: SexChoice,
        #[description = "Does the cat go outdoors?"] lifestyle: LifestyleChoice,
        #[description = "Include the basic insurance program? (default: false)"]
        insurance: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let input = CostInput {
            life_stage: life_stage.into(),
            sex: sex.into(),
            lifestyle: lifestyle.into(),
            insurance: insurance.unwrap_or(false),
        };

        let owner = current_owner(ctx);
        let items = breakdown::calculate_breakdown(&data.database, &input).await?;

        data.staging.purge_expired().await;
        let footer = staging_footer(data.staging.peek(&owner).await.as_ref());

        let embed = serenity::CreateEmbed::default()
            .title(format!("🐱 {}", breakdown::estimate_name(&input)))
            .description(format_breakdown(&items)?)
            .color(0x00F3_9C12)
            .footer(serenity::CreateEmbedFooter::new(footer));

        data.staging.stage(&owner, input, items).await;

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Saves the breakdown you last computed with `/estimate`.
    #[poise::command(slash_command, prefix_command)]
    pub async fn save_estimate(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let owner = current_owner(ctx);

        let Some(pending) = data.staging.take(&owner).await else {
            ctx.say("ℹ️ Nothing to save. Run `/estimate` first (breakdowns are kept for 30 minutes).")
                .await?;
            return Ok(());
        };

        let saved = match estimate::save_breakdown(
            &data.database,
            Some(&owner),
            &pending.input,
            &pending.breakdown,
        )
        .await
        {
            Ok(saved) => saved,
            Err(e) => {
                // Keep the breakdown so the user can retry
                data.staging
                    .stage(&owner, pending.input, pending.breakdown)
                    .await;
                return Err(e);
            }
        };

        ctx.say(format!(
            "✅ Saved estimate **{}** (#{}) with {} line{} totalling ${:.2}.",
            saved.name,
            saved.id,
            pending.breakdown.len(),
            if pending.breakdown.len() == 1 { "" } else { "s" },
            pending.total()
        ))
        .await?;
        Ok(())
    }

    /// Lists your saved estimates, most recently changed first.
    #[poise::command(slash_command, prefix_command)]
    pub async fn estimates(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let owner = current_owner(ctx);

        let all_estimates = estimate::list_estimates(db, Some(&owner)).await?;
        if all_estimates.is_empty() {
            ctx.say("📂 You have no saved estimates. Use `/estimate` to get started!")
                .await?;
            return Ok(());
        }

        let mut response = String::from("📂 **Your Estimates**\n\n");
        for est in all_estimates {
            let lines = expense::list_expenses(db, Some(&owner), est.id).await?;
            let total = lines.iter().fold(0.0, |total, line| total + line.cost);
            writeln!(
                &mut response,
                "#{} **{}** - ${:.2} / year ({} line{}, updated {})",
                est.id,
                est.name,
                total,
                lines.len(),
                if lines.len() == 1 { "" } else { "s" },
                est.updated_at.format("%Y-%m-%d")
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Deletes one of your estimates together with all of its expenses.
    #[poise::command(slash_command, prefix_command)]
    pub async fn delete_estimate(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Estimate number (see /estimates)"] estimate_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let owner = current_owner(ctx);

        let existing = estimate::get_estimate(db, Some(&owner), estimate_id).await?;
        estimate::delete_estimate(db, Some(&owner), estimate_id).await?;

        ctx.say(format!(
            "🗑️ Deleted estimate **{}** (#{estimate_id}).",
            existing.name
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::breakdown::TooltipLine;

    #[test]
    fn test_format_breakdown() {
        let items = vec![
            BreakdownItem {
                name: "Food".to_string(),
                cost: 300.0,
                tooltip: vec![TooltipLine {
                    text: "Dry and wet food".to_string(),
                    link: Some("https://example.org/food".to_string()),
                }],
            },
            BreakdownItem {
                name: "Litter".to_string(),
                cost: 99.5,
                tooltip: Vec::new(),
            },
        ];

        let text = format_breakdown(&items).unwrap();
        assert!(text.contains("• **Food** - $300.00"));
        assert!(text.contains("_Dry and wet food_ (<https://example.org/food>)"));
        assert!(text.contains("• **Litter** - $99.50"));
        assert!(text.ends_with("**Total:** $399.50 / year"));
    }

    #[test]
    fn test_format_empty_breakdown() {
        assert_eq!(format_breakdown(&[]).unwrap(), "\n**Total:** $0.00 / year");
    }

    #[tokio::test]
    async fn test_footer_names_replaced_breakdown() {
        let staging = crate::core::staging::StagingArea::default();
        let owner = "user1";
        assert_eq!(
            staging_footer(staging.peek(owner).await.as_ref()),
            "Use /save_estimate to keep this breakdown"
        );

        let input = crate::core::breakdown::CostInput {
            life_stage: LifeStage::Kitten,
            sex: Sex::Female,
            lifestyle: Lifestyle::Indoor,
            insurance: false,
        };
        staging.stage(owner, input, Vec::new()).await;

        let footer = staging_footer(staging.peek(owner).await.as_ref());
        assert!(footer.ends_with(&format!("(replaces your unsaved {})", estimate_name(&input))));
        // Peeking leaves the breakdown staged
        assert!(staging.take(owner).await.is_some());
    }
}
