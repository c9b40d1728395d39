//! Payment Discord commands - `pay`, `edit_payment`, `delete_payment` and `payments`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::input::{find_person, page_size, parse_amount, parse_date},
            ensure_editor,
            handlers::autocomplete,
        },
        core::{
            money::Money,
            payment::{self, PaymentDraft},
            person,
        },
        entities::{PaymentModel, PersonModel},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Payments shown by `/payments` when no limit is given.
    const DEFAULT_PAGE_SIZE: u64 = 15;

    pub(super) fn format_payment(entry: &PaymentModel, persons: &[PersonModel]) -> String {
        let name_of = |id: i64| {
            persons
                .iter()
                .find(|person| person.id == id)
                .map_or("?", |person| person.name.as_str())
        };
        let mut line = format!(
            "`#{}` {} - **{}** paid **{}** ${}",
            entry.id,
            entry.date,
            name_of(entry.from_person_id),
            name_of(entry.to_person_id),
            Money::from_cents(entry.amount_cents)
        );
        if !entry.notes.is_empty() {
            line.push_str(&format!(" ({})", entry.notes));
        }
        line
    }

    /// Records money handed from one person to another.
    #[poise::command(slash_command, prefix_command)]
    pub async fn pay(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who handed over the money"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        from: String,
        #[description = "Who received the money"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        to: String,
        #[description = "Amount in dollars"] amount: f64,
        #[description = "Date as YYYY-MM-DD (default today)"] date: Option<String>,
        #[description = "Optional notes"] notes: Option<String>,
    ) -> Result<()> {
        ensure_editor(ctx)?;
        let db = &ctx.data().database;

        let persons = person::get_all_persons(db).await?;
        let draft = PaymentDraft {
            id: None,
            from_person_id: Some(find_person(&persons, &from)?.id),
            to_person_id: Some(find_person(&persons, &to)?.id),
            amount: parse_amount(amount)?,
            date: Some(parse_date(date.as_deref(), chrono::Local::now().date_naive())?),
            notes: notes.unwrap_or_default(),
        };

        let saved = payment::upsert_payment(db, draft).await?;
        ctx.say(format!(
            "✅ Payment recorded.\n{}",
            format_payment(&saved, &persons)
        ))
        .await?;
        Ok(())
    }

    /// Changes a recorded payment. Omitted fields keep their current value.
    #[poise::command(slash_command, prefix_command)]
    pub async fn edit_payment(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Payment ID"] id: i64,
        #[description = "Who handed over the money"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        from: Option<String>,
        #[description = "Who received the money"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        to: Option<String>,
        #[description = "Amount in dollars"] amount: Option<f64>,
        #[description = "Date as YYYY-MM-DD"] date: Option<String>,
        #[description = "Notes"] notes: Option<String>,
    ) -> Result<()> {
        ensure_editor(ctx)?;
        let db = &ctx.data().database;

        let existing = payment::get_payment_by_id(db, id).await?;
        let persons = person::get_all_persons(db).await?;

        let from_person_id = match from {
            Some(name) => find_person(&persons, &name)?.id,
            None => existing.from_person_id,
        };
        let to_person_id = match to {
            Some(name) => find_person(&persons, &name)?.id,
            None => existing.to_person_id,
        };
        let amount = match amount {
            Some(value) => parse_amount(value)?,
            None => Money::from_cents(existing.amount_cents),
        };

        let draft = PaymentDraft {
            id: Some(id),
            from_person_id: Some(from_person_id),
            to_person_id: Some(to_person_id),
            amount,
            date: Some(parse_date(date.as_deref(), existing.date)?),
            notes: notes.unwrap_or(existing.notes),
        };

        let saved = payment::upsert_payment(db, draft).await?;
        ctx.say(format!(
            "✏️ Payment updated.\n{}",
            format_payment(&saved, &persons)
        ))
        .await?;
        Ok(())
    }

    /// Deletes a payment and reverses its effect on balances.
    #[poise::command(slash_command, prefix_command)]
    pub async fn delete_payment(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Payment ID"] id: i64,
    ) -> Result<()> {
        ensure_editor(ctx)?;
        let db = &ctx.data().database;

        let deleted = payment::delete_payment(db, id).await?;
        let persons = person::get_all_persons(db).await?;
        ctx.say(format!(
            "🗑️ Deleted payment.\n{}",
            format_payment(&deleted, &persons)
        ))
        .await?;
        Ok(())
    }

    /// Lists the most recent payments.
    #[poise::command(slash_command, prefix_command)]
    pub async fn payments(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How many to show (default 15, at most 25)"] limit: Option<u64>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let recent = payment::get_recent_payments(db, page_size(limit, DEFAULT_PAGE_SIZE)).await?;

        if recent.is_empty() {
            ctx.say("💸 No payments recorded yet.").await?;
            return Ok(());
        }

        let persons = person::get_all_persons(db).await?;
        let mut message = String::from("**Recent payments**\n");
        for entry in &recent {
            writeln!(message, "{}", format_payment(entry, &persons))?;
        }
        ctx.say(message).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
