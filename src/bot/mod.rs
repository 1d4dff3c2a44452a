//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the cat cost estimator,
//! including all slash commands, autocomplete handlers, and bot context management.
//! The Discord user id of the command author is the owner id passed to the core.

/// Discord command implementations (estimate, expense, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    core::staging::StagingArea,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// This structure holds the database connection and the staged breakdowns
/// waiting to be saved.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Breakdowns computed by `/estimate`, keyed by owner id
    pub staging: StagingArea,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection
    /// and an empty staging area.
    #[must_use]
    pub fn new(database: DatabaseConnection) -> Self {
        Self {
            database,
            staging: StagingArea::default(),
        }
    }
}

/// Owner id of the user who invoked a command.
#[must_use]
pub fn current_owner(ctx: poise::Context<'_, BotData, Error>) -> String {
    ctx.author().id.to_string()
}

/// Short message shown to the user for an error returned by a command.
#[must_use]
pub fn user_message(error: &Error) -> String {
    match error {
        Error::Validation { message } => format!("❌ {message}"),
        Error::InvalidAmount { amount } => {
            format!("❌ Invalid amount {amount}: costs must be zero or more.")
        }
        Error::LifeStageNotFound { .. } | Error::RateNotFound { .. } => {
            "❌ The rate table has no data for these answers.".to_string()
        }
        Error::EstimateNotFound { id } => {
            format!("❌ Estimate #{id} not found. Use `/estimates` to see yours.")
        }
        Error::ExpenseNotFound { id } => format!("❌ Expense #{id} not found."),
        Error::Unauthenticated => "❌ You need to be signed in to do that.".to_string(),
        Error::Ordering { .. } => {
            "⚠️ The list changed before your move was applied. Nothing was moved, please check `/expense list` and try again.".to_string()
        }
        _ => "❌ Something went wrong. Please try again later.".to_string(),
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            let reply = poise::CreateReply::default()
                .content(user_message(&error))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Starts the Discord client and blocks until it stops.
///
/// # Errors
/// Returns an error if the client cannot be built or stops with an error.
#[instrument(skip(token, database))]
pub async fn run_bot(token: String, database: DatabaseConnection) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::estimate(),
                commands::save_estimate(),
                commands::estimates(),
                commands::delete_estimate(),
                commands::expense(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
