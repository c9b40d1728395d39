use split_buddy::{
    bot::{self, BotData},
    config::{self, access::EditorAccess},
    core::{ledger, person},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use tracing::{error, info, warn};
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

    // 3. Connect and create tables
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed persons from config.toml
    match config::persons::load_default_config() {
        Ok(app_config) => {
            person::seed_persons(&db, &app_config.persons).await?;
        }
        Err(e) => warn!("No persons seeded: {}", e),
    }
    let balances = split_buddy::core::balance_store::load_all_balances(&db).await?;
    ledger::check_conservation(&balances);

    // 5. Run the bot
    // DISCORD_BOT_TOKEN is loaded here, directly before use
    let token = std::env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    let editors = EditorAccess::from_env();
    if editors.is_open() {
        warn!("LEDGER_EDITOR_IDS is empty; every user may edit the ledger.");
    }

    bot::run_bot(token, BotData::new(db, editors)).await
}
