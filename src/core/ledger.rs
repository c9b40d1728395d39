//! Ledger maintenance - Whole-ledger operations that cut across purchases and payments.

use crate::{
    core::{
        balance_store,
        delta::{apply_payment_upsert, apply_purchase_upsert},
        money::Money,
        purchase::load_purchase_detail,
        records::{PaymentRecord, PersonBalance},
        settlement::{Settlement, plan_settlement},
    },
    entities::{Payment, Purchase, purchase},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Sum of all balances. Logs a data-integrity warning when it is not zero.
#[allow(clippy::must_use_candidate)]
pub fn check_conservation(persons: &[PersonBalance]) -> Money {
    let net: Money = persons.iter().map(|person| person.balance).sum();
    if !net.is_zero() {
        warn!(%net, persons = persons.len(), "Balances do not sum to zero");
    }
    net
}

/// Recomputes every balance from scratch by replaying all stored purchases and payments.
///
/// Runs in one transaction. Used to repair balances after the database was edited by hand.
#[instrument(skip(db))]
pub async fn rebuild_balances(db: &DatabaseConnection) -> Result<Vec<PersonBalance>> {
    let txn = db.begin().await?;

    let stored = balance_store::load_all_balances(&txn).await?;
    let mut rebuilt: Vec<PersonBalance> = stored
        .iter()
        .map(|person| PersonBalance {
            balance: Money::ZERO,
            ..person.clone()
        })
        .collect();

    let purchases = Purchase::find()
        .order_by_asc(purchase::Column::Id)
        .all(&txn)
        .await?;
    for purchase in &purchases {
        let detail = load_purchase_detail(&txn, purchase.id)
            .await?
            .ok_or(Error::PurchaseNotFound { id: purchase.id })?;
        rebuilt = apply_purchase_upsert(&detail.to_record(), None, &rebuilt)?;
    }

    let payments = Payment::find().all(&txn).await?;
    for payment in &payments {
        rebuilt = apply_payment_upsert(&PaymentRecord::from(payment), None, &rebuilt)?;
    }

    let drifted = balance_store::changed_balances(&stored, rebuilt.clone());
    if !drifted.is_empty() {
        warn!(
            count = drifted.len(),
            "Stored balances had drifted from the recorded purchases and payments"
        );
    }
    balance_store::commit_balances(&txn, &drifted).await?;
    txn.commit().await?;

    check_conservation(&rebuilt);
    info!(
        purchases = purchases.len(),
        payments = payments.len(),
        "Rebuilt balances"
    );
    Ok(rebuilt)
}

/// Plans the transfers that would settle the current balances. Read-only.
pub async fn current_settlement<C>(db: &C) -> Result<Settlement>
where
    C: ConnectionTrait,
{
    let balances = balance_store::load_all_balances(db).await?;
    Ok(plan_settlement(&balances))
}
