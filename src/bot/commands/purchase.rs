//! Purchase Discord commands - recording, editing, listing, duplicating and deleting purchases.
//!
//! Discord slash commands take flat arguments, so `/purchase` records a single-item
//! purchase and `/add_item` appends further lines. `/edit_purchase` changes one line or the
//! purchase itself; every edit is guarded by the purchase version.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::input::{EVERYONE, find_person, page_size, parse_amount, parse_date, parse_participants},
            ensure_editor,
            handlers::autocomplete,
        },
        core::{
            money::Money,
            person,
            purchase::{
                self, LineItemDraft, PurchaseDetail, PurchaseDraft, duplicate_purchase_draft,
            },
            shares::ShareSelection,
        },
        entities::PersonModel,
        errors::{Error, Result},
    };
    use std::collections::HashMap;
    use std::fmt::Write;

    /// Purchases shown by `/purchases` when no limit is given.
    const DEFAULT_PAGE_SIZE: u64 = 11;

    /// Replacement values for one line of a purchase. `None` keeps the current value.
    #[derive(Debug, Default)]
    pub(super) struct LineItemChanges {
        pub(super) item_name: Option<String>,
        pub(super) price: Option<Money>,
        pub(super) quantity: Option<f64>,
        pub(super) tax_rate: Option<f64>,
        pub(super) participants: Option<ShareSelection>,
    }

    impl LineItemChanges {
        pub(super) const fn is_empty(&self) -> bool {
            self.item_name.is_none()
                && self.price.is_none()
                && self.quantity.is_none()
                && self.tax_rate.is_none()
                && self.participants.is_none()
        }

        pub(super) fn apply(self, item: &mut LineItemDraft) {
            if let Some(item_name) = self.item_name {
                item.item_name = item_name;
            }
            if let Some(price) = self.price {
                item.price = price;
            }
            if let Some(quantity) = self.quantity {
                item.quantity = quantity;
            }
            if let Some(tax_rate) = self.tax_rate {
                item.tax_rate = tax_rate;
            }
            if let Some(participants) = self.participants {
                item.participants = participants;
            }
        }
    }

    fn name_lookup(persons: &[PersonModel]) -> HashMap<i64, &str> {
        persons
            .iter()
            .map(|person| (person.id, person.name.as_str()))
            .collect()
    }

    pub(super) fn format_purchase_detail(
        detail: &PurchaseDetail,
        persons: &[PersonModel],
    ) -> Result<String> {
        let names = name_lookup(persons);
        let name_of = |id: i64| names.get(&id).copied().unwrap_or("?");
        let purchase = &detail.purchase;

        let mut message = String::new();
        writeln!(
            message,
            "🧾 **{}** at {} on {} (#{}, v{})",
            purchase.name, purchase.store, purchase.date, purchase.id, purchase.version
        )?;
        writeln!(
            message,
            "Paid by **{}**, total **${}**",
            name_of(purchase.paid_by),
            detail.total()
        )?;

        for (number, item) in detail.items.iter().enumerate() {
            let participants: Vec<&str> = item
                .participant_ids()
                .into_iter()
                .map(name_of)
                .collect();
            writeln!(
                message,
                "{}. {} × {} @ ${} + {}% tax = ${} (shared by {})",
                number + 1,
                item.item.quantity,
                item.item.item_name,
                Money::from_cents(item.item.price_cents),
                item.item.tax_rate,
                Money::from_cents(item.item.total_price_cents),
                participants.join(", ")
            )?;
        }
        Ok(message)
    }

    /// Records a single-item purchase and updates everyone's balance.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, prefix_command)]
    pub async fn purchase(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "What was bought"] name: String,
        #[description = "Where it was bought"] store: String,
        #[description = "Who paid"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        paid_by: String,
        #[description = "Unit price in dollars"] price: f64,
        #[description = "Number of units (default 1)"] quantity: Option<f64>,
        #[description = "Tax rate in percent (default 0)"] tax: Option<f64>,
        #[description = "Comma-separated names, or 'all' (default all)"]
        #[autocomplete = "autocomplete::autocomplete_participants"]
        participants: Option<String>,
        #[description = "Date as YYYY-MM-DD (default today)"] date: Option<String>,
    ) -> Result<()> {
        ensure_editor(ctx)?;
        let db = &ctx.data().database;

        let persons = person::get_all_persons(db).await?;
        let payer = find_person(&persons, &paid_by)?;
        let participants = parse_participants(participants.as_deref().unwrap_or(EVERYONE), &persons)?;
        let date = parse_date(date.as_deref(), chrono::Local::now().date_naive())?;

        let draft = PurchaseDraft {
            id: None,
            expected_version: None,
            name: name.clone(),
            store,
            date: Some(date),
            paid_by: Some(payer.id),
            supplied_total: None,
            items: vec![LineItemDraft {
                item_name: name,
                quantity: quantity.unwrap_or(1.0),
                price: parse_amount(price)?,
                tax_rate: tax.unwrap_or(0.0),
                participants,
            }],
        };

        let detail = purchase::upsert_purchase(db, draft).await?;
        let mut message = String::from("✅ Purchase recorded.\n");
        message.push_str(&format_purchase_detail(&detail, &persons)?);
        ctx.say(message).await?;
        Ok(())
    }

    /// Changes a recorded purchase. Omitted fields keep their current value.
    ///
    /// Item fields apply to line `item` (default 1) as numbered by `/purchase_info`.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, prefix_command)]
    pub async fn edit_purchase(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Purchase ID"] id: i64,
        #[description = "Version shown by /purchase_info; refused if the purchase changed since"]
        version: Option<i32>,
        #[description = "What was bought"] name: Option<String>,
        #[description = "Where it was bought"] store: Option<String>,
        #[description = "Who paid"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        paid_by: Option<String>,
        #[description = "Date as YYYY-MM-DD"] date: Option<String>,
        #[description = "Item number to change (default 1)"] item: Option<u64>,
        #[description = "New item name"] item_name: Option<String>,
        #[description = "Unit price in dollars"] price: Option<f64>,
        #[description = "Number of units"] quantity: Option<f64>,
        #[description = "Tax rate in percent"] tax: Option<f64>,
        #[description = "Comma-separated names, or 'all'"]
        #[autocomplete = "autocomplete::autocomplete_participants"]
        participants: Option<String>,
    ) -> Result<()> {
        ensure_editor(ctx)?;
        let db = &ctx.data().database;

        let existing = purchase::get_purchase_detail(db, id).await?;
        let persons = person::get_all_persons(db).await?;

        let mut draft = existing.to_edit_draft();
        if version.is_some() {
            draft.expected_version = version;
        }
        if let Some(name) = name {
            draft.name = name;
        }
        if let Some(store) = store {
            draft.store = store;
        }
        if let Some(paid_by) = paid_by {
            draft.paid_by = Some(find_person(&persons, &paid_by)?.id);
        }
        draft.date = Some(parse_date(date.as_deref(), existing.purchase.date)?);

        let changes = LineItemChanges {
            item_name,
            price: price.map(parse_amount).transpose()?,
            quantity,
            tax_rate: tax,
            participants: participants
                .as_deref()
                .map(|raw| parse_participants(raw, &persons))
                .transpose()?,
        };
        if !changes.is_empty() {
            let number = usize::try_from(item.unwrap_or(1)).unwrap_or(usize::MAX);
            changes.apply(draft.line_item_mut(number)?);
            draft.supplied_total = None;
        }

        let updated = purchase::upsert_purchase(db, draft).await?;
        let mut message = String::from("✏️ Purchase updated.\n");
        message.push_str(&format_purchase_detail(&updated, &persons)?);
        ctx.say(message).await?;
        Ok(())
    }

    /// Adds another line item to a recorded purchase.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, prefix_command)]
    pub async fn add_item(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Purchase ID"] id: i64,
        #[description = "Item name"] item_name: String,
        #[description = "Unit price in dollars"] price: f64,
        #[description = "Number of units (default 1)"] quantity: Option<f64>,
        #[description = "Tax rate in percent (default 0)"] tax: Option<f64>,
        #[description = "Comma-separated names, or 'all' (default all)"]
        #[autocomplete = "autocomplete::autocomplete_participants"]
        participants: Option<String>,
        #[description = "Version shown by /purchase_info; refused if the purchase changed since"]
        version: Option<i32>,
    ) -> Result<()> {
        ensure_editor(ctx)?;
        let db = &ctx.data().database;

        let persons = person::get_all_persons(db).await?;
        let item = LineItemDraft {
            item_name,
            quantity: quantity.unwrap_or(1.0),
            price: parse_amount(price)?,
            tax_rate: tax.unwrap_or(0.0),
            participants: parse_participants(participants.as_deref().unwrap_or(EVERYONE), &persons)?,
        };

        let updated = purchase::add_line_item(db, id, version, item).await?;
        let mut message = String::from("✅ Item added.\n");
        message.push_str(&format_purchase_detail(&updated, &persons)?);
        ctx.say(message).await?;
        Ok(())
    }

    /// Shows a purchase with its line items and who shares them.
    #[poise::command(slash_command, prefix_command)]
    pub async fn purchase_info(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Purchase ID"] id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let detail = purchase::get_purchase_detail(db, id).await?;
        let persons = person::get_all_persons(db).await?;
        ctx.say(format_purchase_detail(&detail, &persons)?).await?;
        Ok(())
    }

    /// Lists the most recent purchases.
    #[poise::command(slash_command, prefix_command)]
    pub async fn purchases(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How many to show (default 11, at most 25)"] limit: Option<u64>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let recent = purchase::get_recent_purchases(db, page_size(limit, DEFAULT_PAGE_SIZE)).await?;

        if recent.is_empty() {
            ctx.say("🧾 No purchases recorded yet.").await?;
            return Ok(());
        }

        let persons = person::get_all_persons(db).await?;
        let names = name_lookup(&persons);
        let mut message = String::from("**Recent purchases**\n");
        for entry in &recent {
            writeln!(
                message,
                "`#{}` {} - **{}** at {} - ${} paid by {}",
                entry.id,
                entry.date,
                entry.name,
                entry.store,
                Money::from_cents(entry.total_amount_cents),
                names.get(&entry.paid_by).copied().unwrap_or("?")
            )?;
        }
        ctx.say(message).await?;
        Ok(())
    }

    /// Deletes a purchase and reverses its effect on balances.
    #[poise::command(slash_command, prefix_command)]
    pub async fn delete_purchase(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Purchase ID"] id: i64,
    ) -> Result<()> {
        ensure_editor(ctx)?;

        let deleted = purchase::delete_purchase(&ctx.data().database, id).await?;
        ctx.say(format!(
            "🗑️ Deleted purchase #{} **{}** (${}).",
            deleted.purchase.id,
            deleted.purchase.name,
            deleted.total()
        ))
        .await?;
        Ok(())
    }

    /// Records an existing purchase again on a new date.
    #[poise::command(slash_command, prefix_command)]
    pub async fn duplicate_purchase(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Purchase ID to copy"] id: i64,
        #[description = "Date as YYYY-MM-DD (default today)"] date: Option<String>,
    ) -> Result<()> {
        ensure_editor(ctx)?;
        let db = &ctx.data().database;

        let original = purchase::get_purchase_detail(db, id).await?;
        let date = parse_date(date.as_deref(), chrono::Local::now().date_naive())?;
        let copy = purchase::upsert_purchase(db, duplicate_purchase_draft(&original, Some(date)))
            .await?;

        let persons = person::get_all_persons(db).await?;
        let mut message = format!("✅ Copied purchase #{id}.\n");
        message.push_str(&format_purchase_detail(&copy, &persons)?);
        ctx.say(message).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
