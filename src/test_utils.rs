//! Shared test utilities for `SplitBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and building drafts with sensible defaults.

use crate::{
    core::{
        money::Money,
        payment::PaymentDraft,
        person,
        purchase::{LineItemDraft, PurchaseDraft},
        shares::ShareSelection,
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test person with a zero balance.
pub async fn create_test_person(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::person::Model> {
    person::create_person(db, name).await
}

/// Creates Alice, Bob and Carol, returned in that (name) order.
pub async fn create_test_group(db: &DatabaseConnection) -> Result<[entities::person::Model; 3]> {
    Ok([
        create_test_person(db, "Alice").await?,
        create_test_person(db, "Bob").await?,
        create_test_person(db, "Carol").await?,
    ])
}

/// Default date used by test drafts.
#[must_use]
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or(NaiveDate::MIN)
}

/// Builds a valid single-item purchase draft.
///
/// # Defaults
/// * name / store: "Groceries" / "Market"
/// * quantity: 1, tax: 0%
/// * date: [`test_date`]
#[must_use]
pub fn purchase_draft(paid_by: i64, price_cents: i64, participants: ShareSelection) -> PurchaseDraft {
    PurchaseDraft {
        id: None,
        expected_version: None,
        name: "Groceries".to_string(),
        store: "Market".to_string(),
        date: Some(test_date()),
        paid_by: Some(paid_by),
        supplied_total: None,
        items: vec![LineItemDraft {
            item_name: "Groceries".to_string(),
            quantity: 1.0,
            price: Money::from_cents(price_cents),
            tax_rate: 0.0,
            participants,
        }],
    }
}

/// Builds a valid new-payment draft dated [`test_date`].
#[must_use]
pub fn payment_draft(from_person_id: i64, to_person_id: i64, amount_cents: i64) -> PaymentDraft {
    PaymentDraft {
        id: None,
        from_person_id: Some(from_person_id),
        to_person_id: Some(to_person_id),
        amount: Money::from_cents(amount_cents),
        date: Some(test_date()),
        notes: String::new(),
    }
}
