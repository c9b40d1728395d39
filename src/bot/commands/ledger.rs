//! Ledger Discord commands - balances, settlement, refresh and group membership.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, ensure_editor},
        core::{balance_store, ledger, person, records::PersonBalance},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    pub(super) fn format_balances(balances: &[PersonBalance]) -> Result<String> {
        let mut message = String::from("**Balances**\n");
        let net = ledger::check_conservation(balances);
        for entry in balances {
            let marker = if entry.balance.is_positive() {
                "🟢"
            } else if entry.balance.is_negative() {
                "🔴"
            } else {
                "⚪"
            };
            writeln!(message, "{marker} **{}**: ${}", entry.name, entry.balance)?;
        }
        if !net.is_zero() {
            writeln!(
                message,
                "⚠️ Balances are off by ${net}. Run `/refresh` to rebuild them."
            )?;
        }
        Ok(message)
    }

    /// Shows every person's balance. Positive means the group owes them.
    #[poise::command(slash_command, prefix_command)]
    pub async fn balances(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let balances = balance_store::load_all_balances(db).await?;

        if balances.is_empty() {
            ctx.say("👥 Nobody is in the group yet. Add someone with `/add_person`.")
                .await?;
            return Ok(());
        }

        ctx.say(format_balances(&balances)?).await?;
        Ok(())
    }

    /// Shows who needs to pay whom so that every balance is zero.
    #[poise::command(slash_command, prefix_command)]
    pub async fn settle(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let balances = balance_store::load_all_balances(db).await?;
        let settlement = ledger::current_settlement(db).await?;

        let mut message = String::from("**Settlement**\n");
        for line in settlement.describe(&balances) {
            writeln!(message, "• {line}")?;
        }
        ctx.say(message).await?;
        Ok(())
    }

    /// Recomputes every balance from the recorded purchases and payments.
    #[poise::command(slash_command, prefix_command)]
    pub async fn refresh(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ensure_editor(ctx)?;
        ctx.defer().await?;

        let balances = ledger::rebuild_balances(&ctx.data().database).await?;
        let mut message = String::from("🔄 Balances rebuilt from history.\n\n");
        message.push_str(&format_balances(&balances)?);
        ctx.say(message).await?;
        Ok(())
    }

    /// Adds a person to the group with a zero balance.
    #[poise::command(slash_command, prefix_command)]
    pub async fn add_person(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the person"] name: String,
    ) -> Result<()> {
        ensure_editor(ctx)?;

        let created = person::create_person(&ctx.data().database, &name).await?;
        ctx.say(format!("✅ Added **{}** to the group.", created.name))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
