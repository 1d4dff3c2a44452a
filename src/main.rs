use cat_cost_estimator::{
    bot,
    config::{database, rates as rate_config},
    core::rates,
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the rate table before touching the database
    let rate_table = rate_config::load_default_config()
        .inspect(|config| info!("Loaded {} rate table.", config.year))
        .inspect_err(|e| error!("Failed to load rate table: {}", e))?;

    // 4. Connect and make sure every table exists
    let db = database::create_connection().await?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed the reference rates
    rates::seed_rate_table(&db, &rate_table)
        .await
        .inspect_err(|e| error!("Failed to seed rate table: {}", e))?;

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, db).await
}
