//! Expense Discord commands - the `/expense` group.
//!
//! Positions are shown to users starting at 1; the core counts from 0.

use crate::entities::expense;
use std::fmt::Write;

/// Renders the lines of an estimate as a numbered list with a total.
///
/// # Errors
/// Returns an error only if writing to the string fails.
pub fn format_expense_list(
    estimate_name: &str,
    lines: &[expense::Model],
) -> crate::errors::Result<String> {
    let mut response = format!("🧾 **{estimate_name}**\n\n");
    if lines.is_empty() {
        response.push_str("_No expenses yet. Add one with `/expense add`._");
        return Ok(response);
    }

    for line in lines {
        writeln!(
            &mut response,
            "`{}.` {} - ${:.2} (#{})",
            line.order + 1,
            line.name,
            line.cost,
            line.id
        )?;
    }
    let total = lines.iter().fold(0.0, |total, line| total + line.cost);
    write!(&mut response, "\n**Total:** ${total:.2} / year")?;
    Ok(response)
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::format_expense_list;
    use crate::{
        bot::{BotData, current_owner, handlers::autocomplete},
        core::{
            estimate,
            expense::{self, ExpenseUpdate, NewExpense},
        },
        errors::{Error, Result},
    };

    /// Parent command for managing the expense lines of a saved estimate.
    #[poise::command(
        slash_command,
        subcommands(
            "expense_list",
            "expense_add",
            "expense_edit",
            "expense_move",
            "expense_delete",
            "expense_clear",
            "expense_repair"
        )
    )]
    pub async fn expense(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Expense management command. Available subcommands:\n\
            `/expense list` - Show the lines of an estimate\n\
            `/expense add` - Add a line\n\
            `/expense edit` - Change a line's name and cost\n\
            `/expense move` - Move a line to another position\n\
            `/expense delete` - Remove a line\n\
            `/expense clear` - Remove every line of an estimate\n\
            `/expense repair` - Renumber the lines of an estimate";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows the lines of an estimate in order.
    #[poise::command(slash_command, rename = "list")]
    pub async fn expense_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Estimate number (see /estimates)"] estimate_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let owner = current_owner(ctx);

        let header = estimate::get_estimate(db, Some(&owner), estimate_id).await?;
        let lines = expense::list_expenses(db, Some(&owner), estimate_id).await?;

        ctx.say(format_expense_list(&header.name, &lines)?).await?;
        Ok(())
    }

    /// Adds a line to an estimate. It is placed alphabetically.
    #[poise::command(slash_command, rename = "add")]
    pub async fn expense_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Estimate number (see /estimates)"] estimate_id: i64,
        #[description = "Name of the expense"]
        #[autocomplete = "autocomplete::autocomplete_expense_name"]
        name: String,
        #[description = "Yearly cost in dollars"] cost: f64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let owner = current_owner(ctx);

        let created =
            expense::create_expense(db, Some(&owner), estimate_id, NewExpense { name, cost })
                .await?;

        ctx.say(format!(
            "✅ Added **{}** (${:.2}) at position {}.",
            created.name,
            created.cost,
            created.order + 1
        ))
        .await?;
        Ok(())
    }

    /// Changes the name and cost of a line. Its position does not change.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn expense_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense number (shown as #N in /expense list)"] expense_id: i64,
        #[description = "New name"]
        #[autocomplete = "autocomplete::autocomplete_expense_name"]
        name: String,
        #[description = "New yearly cost in dollars"] cost: f64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let owner = current_owner(ctx);

        let updated =
            expense::update_expense(db, Some(&owner), expense_id, ExpenseUpdate { name, cost })
                .await?;

        ctx.say(format!(
            "✅ Updated #{} to **{}** (${:.2}).",
            updated.id, updated.name, updated.cost
        ))
        .await?;
        Ok(())
    }

    /// Moves a line from one position to another.
    ///
    /// If the list changed since you looked at it, nothing is moved.
    #[poise::command(slash_command, rename = "move")]
    pub async fn expense_move(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense number (shown as #N in /expense list)"] expense_id: i64,
        #[description = "Current position"]
        #[min = 1]
        from: i32,
        #[description = "New position"]
        #[min = 1]
        to: i32,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let owner = current_owner(ctx);

        expense::reorder_expense(db, Some(&owner), expense_id, from - 1, to - 1).await?;

        ctx.say(format!("↕️ Moved #{expense_id} from position {from} to {to}."))
            .await?;
        Ok(())
    }

    /// Removes a line from its estimate.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn expense_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense number (shown as #N in /expense list)"] expense_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let owner = current_owner(ctx);

        expense::delete_expense(db, Some(&owner), expense_id).await?;

        ctx.say(format!("🗑️ Deleted expense #{expense_id}.")).await?;
        Ok(())
    }

    /// Removes every line of an estimate, keeping the estimate itself.
    #[poise::command(slash_command, rename = "clear")]
    pub async fn expense_clear(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Estimate number (see /estimates)"] estimate_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let owner = current_owner(ctx);

        let removed = expense::delete_all_expenses(db, Some(&owner), estimate_id).await?;

        ctx.say(format!(
            "🗑️ Removed {removed} expense{} from estimate #{estimate_id}.",
            if removed == 1 { "" } else { "s" }
        ))
        .await?;
        Ok(())
    }

    /// Renumbers the lines of an estimate to 1..N, keeping their order.
    #[poise::command(slash_command, rename = "repair")]
    pub async fn expense_repair(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Estimate number (see /estimates)"] estimate_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let owner = current_owner(ctx);

        let repaired = expense::repair_expense_order(db, Some(&owner), estimate_id).await?;

        let message = if repaired == 0 {
            "✅ Positions were already in order.".to_string()
        } else {
            format!("🔧 Renumbered {repaired} line(s).")
        };
        ctx.say(message).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
