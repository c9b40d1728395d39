//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the SplitBuddy ledger,
//! including all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations (ledger, purchase, payment, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::access::EditorAccess,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
/// This structure holds the database connection and the edit permissions
/// that commands need to access.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Who may change the ledger
    pub editors: EditorAccess,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection and editors.
    #[must_use]
    pub const fn new(database: DatabaseConnection, editors: EditorAccess) -> Self {
        Self { database, editors }
    }
}

/// Poise context carrying [`BotData`].
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Fails with [`Error::Unauthorized`] unless the command author may edit the ledger.
pub fn ensure_editor(ctx: Context<'_>) -> Result<()> {
    ctx.data()
        .editors
        .ensure_allowed(&ctx.author().id.to_string())
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let reply = if error.is_user_error() {
                warn!("Rejected command `{}`: {}", ctx.command().name, error);
                format!("❌ {error}")
            } else {
                error!("Error in command `{}`: {:?}", ctx.command().name, error);
                "❌ Something went wrong while updating the ledger. Nothing was changed."
                    .to_string()
            };
            if let Err(e) = ctx.say(reply).await {
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

/// Every slash command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::balances(),
        commands::settle(),
        commands::refresh(),
        commands::add_person(),
        commands::purchase(),
        commands::edit_purchase(),
        commands::add_item(),
        commands::purchase_info(),
        commands::purchases(),
        commands::delete_purchase(),
        commands::duplicate_purchase(),
        commands::pay(),
        commands::edit_payment(),
        commands::delete_payment(),
        commands::payments(),
    ]
}

/// Builds the poise framework, connects to Discord and runs until the client stops.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

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
