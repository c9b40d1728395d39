//! Payment business logic - Direct transfers between two persons.
//!
//! A payment from A to B credits A and debits B. Creating, editing and deleting payments
//! follow the same shape as purchases: one database transaction covering the record write
//! and the balance update.

use crate::{
    core::{
        balance_store,
        delta::{apply_payment_delete, apply_payment_upsert},
        money::Money,
        records::PaymentRecord,
    },
    entities::{Payment, payment},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// A payment as submitted by a user, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDraft {
    /// Payment to replace, if editing
    pub id: Option<i64>,
    /// Person handing over the money
    pub from_person_id: Option<i64>,
    /// Person receiving the money
    pub to_person_id: Option<i64>,
    /// Amount transferred
    pub amount: Money,
    /// Date of the transfer
    pub date: Option<NaiveDate>,
    /// Free-text notes
    pub notes: String,
}

impl From<&payment::Model> for PaymentRecord {
    fn from(model: &payment::Model) -> Self {
        Self {
            from_person_id: model.from_person_id,
            to_person_id: model.to_person_id,
            amount: Money::from_cents(model.amount_cents),
        }
    }
}

/// Checks a draft before any storage access. Returns the first problem found.
///
/// # Errors
/// [`Error::Validation`] naming the offending field.
pub fn validate_payment_draft(draft: &PaymentDraft) -> Result<()> {
    let Some(from) = draft.from_person_id else {
        return Err(Error::validation("From person is required"));
    };
    let Some(to) = draft.to_person_id else {
        return Err(Error::validation("To person is required"));
    };
    if from == to {
        return Err(Error::validation(
            "From person and to person must be different",
        ));
    }
    if !draft.amount.is_positive() {
        return Err(Error::validation("Amount must be greater than 0"));
    }
    if draft.amount > Money::MAX_AMOUNT {
        return Err(Error::validation(format!(
            "Amount must not exceed {}",
            Money::MAX_AMOUNT
        )));
    }
    if draft.date.is_none() {
        return Err(Error::validation("Date is required"));
    }
    Ok(())
}

/// Creates or replaces a payment and updates balances in one transaction.
///
/// # Errors
/// - [`Error::Validation`] for a malformed draft
/// - [`Error::PaymentNotFound`] when editing a payment that does not exist
/// - [`Error::PersonNotFound`] when either person is unknown
#[instrument(skip(db, draft), fields(payment_id = ?draft.id))]
pub async fn upsert_payment(db: &DatabaseConnection, draft: PaymentDraft) -> Result<payment::Model> {
    validate_payment_draft(&draft)?;
    let (Some(from_person_id), Some(to_person_id), Some(date)) =
        (draft.from_person_id, draft.to_person_id, draft.date)
    else {
        return Err(Error::validation("From person is required"));
    };

    let txn = db.begin().await?;

    let current = balance_store::load_all_balances(&txn).await?;
    let old = match draft.id {
        Some(id) => Some(
            Payment::find_by_id(id)
                .one(&txn)
                .await?
                .ok_or(Error::PaymentNotFound { id })?,
        ),
        None => None,
    };

    let record = PaymentRecord {
        from_person_id,
        to_person_id,
        amount: draft.amount,
    };
    let old_record = old.as_ref().map(PaymentRecord::from);
    let updated = apply_payment_upsert(&record, old_record.as_ref(), &current)?;

    let now = chrono::Utc::now();
    let saved = match old {
        Some(old) => {
            let mut active: payment::ActiveModel = old.into();
            active.from_person_id = Set(from_person_id);
            active.to_person_id = Set(to_person_id);
            active.amount_cents = Set(draft.amount.cents());
            active.date = Set(date);
            active.notes = Set(draft.notes.trim().to_string());
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            payment::ActiveModel {
                from_person_id: Set(from_person_id),
                to_person_id: Set(to_person_id),
                amount_cents: Set(draft.amount.cents()),
                date: Set(date),
                notes: Set(draft.notes.trim().to_string()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    balance_store::commit_balances(&txn, &balance_store::changed_balances(&current, updated))
        .await?;
    txn.commit().await?;

    info!(
        payment_id = saved.id,
        from_person_id,
        to_person_id,
        amount = %draft.amount,
        "Saved payment"
    );
    Ok(saved)
}

/// Deletes a payment and reverses its effect on balances in one transaction.
///
/// # Errors
/// [`Error::PaymentNotFound`] if there is no such payment.
#[instrument(skip(db))]
pub async fn delete_payment(db: &DatabaseConnection, payment_id: i64) -> Result<payment::Model> {
    let txn = db.begin().await?;

    let existing = Payment::find_by_id(payment_id)
        .one(&txn)
        .await?
        .ok_or(Error::PaymentNotFound { id: payment_id })?;
    let current = balance_store::load_all_balances(&txn).await?;
    let updated = apply_payment_delete(&PaymentRecord::from(&existing), &current)?;

    Payment::delete_by_id(payment_id).exec(&txn).await?;
    balance_store::commit_balances(&txn, &balance_store::changed_balances(&current, updated))
        .await?;
    txn.commit().await?;

    info!(payment_id, "Deleted payment");
    Ok(existing)
}

/// Retrieves a payment by id.
///
/// # Errors
/// [`Error::PaymentNotFound`] if there is no such payment.
pub async fn get_payment_by_id<C>(db: &C, payment_id: i64) -> Result<payment::Model>
where
    C: ConnectionTrait,
{
    Payment::find_by_id(payment_id)
        .one(db)
        .await?
        .ok_or(Error::PaymentNotFound { id: payment_id })
}

/// Retrieves the most recent payments, newest date first.
///
/// # Errors
/// [`Error::Database`] if the query fails.
pub async fn get_recent_payments<C>(db: &C, limit: u64) -> Result<Vec<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .order_by_desc(payment::Column::Date)
        .order_by_desc(payment::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]
    use super::*;
    use crate::core::balance_store::{load_all_balances, load_person_balance};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_validation_messages() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let valid = payment_draft(1, 2, 1000);

        let cases: Vec<(PaymentDraft, &str)> = vec![
            (
                PaymentDraft {
                    from_person_id: None,
                    ..valid.clone()
                },
                "From person is required",
            ),
            (
                PaymentDraft {
                    to_person_id: None,
                    ..valid.clone()
                },
                "To person is required",
            ),
            (
                PaymentDraft {
                    to_person_id: Some(1),
                    ..valid.clone()
                },
                "From person and to person must be different",
            ),
            (
                PaymentDraft {
                    amount: Money::ZERO,
                    ..valid.clone()
                },
                "Amount must be greater than 0",
            ),
            (
                PaymentDraft {
                    amount: Money::from_cents(-500),
                    ..valid.clone()
                },
                "Amount must be greater than 0",
            ),
            (
                PaymentDraft {
                    amount: Money::from_cents(Money::MAX_AMOUNT.cents() + 1),
                    ..valid.clone()
                },
                "Amount must not exceed 1000000000000.00",
            ),
            (
                PaymentDraft {
                    date: None,
                    ..valid.clone()
                },
                "Date is required",
            ),
        ];

        for (draft, expected) in cases {
            match upsert_payment(&db, draft).await {
                Err(Error::Validation { message }) => assert_eq!(message, expected),
                other => panic!("expected validation error {expected:?}, got {other:?}"),
            }
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_create_payment_moves_balances() -> Result<()> {
        let db = setup_test_db().await?;
        let [a, b, _] = create_test_group(&db).await?;

        let payment = upsert_payment(&db, payment_draft(b.id, a.id, 1000)).await?;
        assert_eq!(payment.amount_cents, 1000);

        assert_eq!(load_person_balance(&db, b.id).await?, Money::from_cents(1000));
        assert_eq!(load_person_balance(&db, a.id).await?, Money::from_cents(-1000));

        Ok(())
    }

    #[tokio::test]
    async fn test_edit_payment_amount() -> Result<()> {
        let db = setup_test_db().await?;
        let [a, b, _] = create_test_group(&db).await?;

        let payment = upsert_payment(&db, payment_draft(a.id, b.id, 1000)).await?;
        let edited = upsert_payment(
            &db,
            PaymentDraft {
                id: Some(payment.id),
                notes: "corrected".to_string(),
                ..payment_draft(a.id, b.id, 400)
            },
        )
        .await?;

        assert_eq!(edited.id, payment.id);
        assert_eq!(edited.notes, "corrected");
        assert_eq!(edited.created_at, payment.created_at);
        assert_eq!(load_person_balance(&db, a.id).await?, Money::from_cents(400));
        assert_eq!(load_person_balance(&db, b.id).await?, Money::from_cents(-400));

        Ok(())
    }

    #[tokio::test]
    async fn test_edit_payment_direction() -> Result<()> {
        let db = setup_test_db().await?;
        let [a, b, c] = create_test_group(&db).await?;

        let payment = upsert_payment(&db, payment_draft(a.id, b.id, 1000)).await?;
        upsert_payment(
            &db,
            PaymentDraft {
                id: Some(payment.id),
                ..payment_draft(c.id, a.id, 1000)
            },
        )
        .await?;

        assert_eq!(load_person_balance(&db, a.id).await?, Money::from_cents(-1000));
        assert!(load_person_balance(&db, b.id).await?.is_zero());
        assert_eq!(load_person_balance(&db, c.id).await?, Money::from_cents(1000));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_payment_restores_balances() -> Result<()> {
        let db = setup_test_db().await?;
        let [a, b, _] = create_test_group(&db).await?;

        let payment = upsert_payment(&db, payment_draft(a.id, b.id, 1234)).await?;
        let deleted = delete_payment(&db, payment.id).await?;
        assert_eq!(deleted.id, payment.id);

        assert!(
            load_all_balances(&db)
                .await?
                .iter()
                .all(|p| p.balance.is_zero())
        );
        assert!(matches!(
            get_payment_by_id(&db, payment.id).await,
            Err(Error::PaymentNotFound { .. })
        ));
        assert!(matches!(
            delete_payment(&db, payment.id).await,
            Err(Error::PaymentNotFound { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_person_writes_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let [a, _, _] = create_test_group(&db).await?;

        let result = upsert_payment(&db, payment_draft(a.id, 999, 500)).await;
        assert!(matches!(result, Err(Error::PersonNotFound { .. })));
        assert!(get_recent_payments(&db, 10).await?.is_empty());
        assert!(load_person_balance(&db, a.id).await?.is_zero());

        let result = upsert_payment(
            &db,
            PaymentDraft {
                id: Some(77),
                ..payment_draft(a.id, a.id + 1, 500)
            },
        )
        .await;
        assert!(matches!(result, Err(Error::PaymentNotFound { id: 77 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_recent_payments() -> Result<()> {
        let db = setup_test_db().await?;
        let [a, b, _] = create_test_group(&db).await?;

        for day in 1..=3 {
            upsert_payment(
                &db,
                PaymentDraft {
                    date: NaiveDate::from_ymd_opt(2024, 3, day),
                    ..payment_draft(a.id, b.id, 100)
                },
            )
            .await?;
        }

        let recent = get_recent_payments(&db, 2).await?;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        assert_eq!(recent[1].date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());

        Ok(())
    }
}
