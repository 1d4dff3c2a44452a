//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    ///
    /// This is a simple health check command that doesn't require any database operations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Cat Cost Estimator Help**\n\
        Find out what a cat costs per year in Quebec, then keep and tune your estimates.\n\n\
        **Estimates**\n\
        • `/estimate <life_stage> <sex> <lifestyle> <insurance>` - Computes a yearly cost breakdown.\n\
        • `/save_estimate` - Saves the breakdown you just computed.\n\
        • `/estimates` - Lists your saved estimates.\n\
        • `/delete_estimate <id>` - Deletes an estimate and all of its expenses.\n\n\
        **Expenses**\n\
        • `/expense list <estimate>` - Shows the lines of an estimate.\n\
        • `/expense add <estimate> <name> <cost>` - Adds a line at its alphabetical position.\n\
        • `/expense edit <id> <name> <cost>` - Changes a line in place.\n\
        • `/expense move <id> <from> <to>` - Moves a line to another position.\n\
        • `/expense delete <id>` - Removes a line.\n\
        • `/expense clear <estimate>` - Removes every line of an estimate.\n\n\
        **Utility Commands**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
