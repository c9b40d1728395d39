//! General Discord commands - ping and help.
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
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**SplitBuddy Help**\n\
        Here is a summary of all available commands for SplitBuddy.\n\n\
        **Balances**\n\
        • `/balances` - Shows what everyone is owed (+) or owes (-).\n\
        • `/settle` - Shows who needs to pay whom to settle up.\n\
        • `/refresh` - Recomputes every balance from the recorded history.\n\n\
        **Purchases**\n\
        • `/purchase <name> <store> <paid_by> <price> [quantity] [tax] [participants] [date]` - Records a purchase. Participants are comma-separated names or `all`.\n\
        • `/add_item <id> <item_name> <price> ...` - Adds another item to a purchase.\n\
        • `/edit_purchase <id> [version] ...` - Changes a purchase or one of its items.\n\
        • `/purchases [limit]` - Lists recent purchases.\n\
        • `/purchase_info <id>` - Shows a purchase with its items and shares.\n\
        • `/duplicate_purchase <id> [date]` - Records the same purchase again.\n\
        • `/delete_purchase <id>` - Deletes a purchase and reverses its effect.\n\n\
        **Payments**\n\
        • `/pay <from> <to> <amount> [date] [notes]` - Records money handed from one person to another.\n\
        • `/edit_payment <id> ...` - Changes a recorded payment.\n\
        • `/payments [limit]` - Lists recent payments.\n\
        • `/delete_payment <id>` - Deletes a payment and reverses its effect.\n\n\
        **Utility Commands**\n\
        • `/add_person <name>` - Adds someone to the group.\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.\n\n\
        Dates use the `YYYY-MM-DD` format and default to today.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
