//! Balance delta calculator.
//!
//! Turns a purchase or payment mutation (create, update or delete) into the per-person
//! balance change it causes. Everything here is pure: current balances come in as a
//! parameter and updated balances go out as a return value; persistence happens only at the
//! pipeline edges in [`crate::core::purchase`] and [`crate::core::payment`].
//!
//! Accounting convention:
//! - the payer of a purchase is credited the full line total, each participant is debited
//!   their share (a payer who also participates nets out partially);
//! - a payment from A to B credits A and debits B by the amount.
//!
//! Every delta produced here sums to exactly zero.

use crate::{
    core::{
        money::Money,
        records::{PaymentRecord, PersonBalance, PurchaseRecord},
    },
    errors::{Error, Result},
};
use std::collections::BTreeMap;
use tracing::debug;

/// Whether a record's effect is being applied or undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Apply,
    Reverse,
}

impl Direction {
    fn signed(self, amount: Money) -> Money {
        match self {
            Self::Apply => amount,
            Self::Reverse => -amount,
        }
    }
}

/// Signed balance adjustment per person id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceDelta(BTreeMap<i64, Money>);

impl BalanceDelta {
    /// An empty delta.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to a person's delta.
    pub fn credit(&mut self, person_id: i64, amount: Money) {
        *self.0.entry(person_id).or_default() += amount;
    }

    /// Subtracts `amount` from a person's delta.
    pub fn debit(&mut self, person_id: i64, amount: Money) {
        *self.0.entry(person_id).or_default() -= amount;
    }

    /// The adjustment for one person (zero if untouched).
    #[must_use]
    pub fn get(&self, person_id: i64) -> Money {
        self.0.get(&person_id).copied().unwrap_or_default()
    }

    /// Net of all adjustments. Zero for every delta this module builds.
    #[must_use]
    pub fn sum(&self) -> Money {
        self.0.values().copied().sum()
    }

    /// Whether no person is adjusted at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|amount| amount.is_zero())
    }

    /// Iterates `(person_id, adjustment)` in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, Money)> + '_ {
        self.0.iter().map(|(id, amount)| (*id, *amount))
    }

    fn record_purchase(&mut self, purchase: &PurchaseRecord, direction: Direction) -> Result<()> {
        for item in &purchase.items {
            self.credit(purchase.paid_by, direction.signed(item.total_price()?));
            for (person_id, amount) in item.share_amounts()? {
                self.debit(person_id, direction.signed(amount));
            }
        }
        Ok(())
    }

    fn record_payment(&mut self, payment: &PaymentRecord, direction: Direction) {
        self.credit(payment.from_person_id, direction.signed(payment.amount));
        self.debit(payment.to_person_id, direction.signed(payment.amount));
    }
}

/// Delta for committing `new` in place of `old`.
///
/// `old` is undone first (payer loses the credit, participants get their shares back), then
/// `new` is applied. `new = None` is a delete; `old = None` is a fresh create.
///
/// # Errors
/// [`Error::Validation`] when a line total is out of range.
pub fn purchase_delta(
    new: Option<&PurchaseRecord>,
    old: Option<&PurchaseRecord>,
) -> Result<BalanceDelta> {
    let mut delta = BalanceDelta::new();
    if let Some(old) = old {
        delta.record_purchase(old, Direction::Reverse)?;
    }
    if let Some(new) = new {
        delta.record_purchase(new, Direction::Apply)?;
    }
    Ok(delta)
}

/// Delta for committing payment `new` in place of `old`. Same create/update/delete rules as
/// [`purchase_delta`].
#[must_use]
pub fn payment_delta(new: Option<&PaymentRecord>, old: Option<&PaymentRecord>) -> BalanceDelta {
    let mut delta = BalanceDelta::new();
    if let Some(old) = old {
        delta.record_payment(old, Direction::Reverse);
    }
    if let Some(new) = new {
        delta.record_payment(new, Direction::Apply);
    }
    delta
}

/// Adds `delta` to the current balances and returns the full updated person set.
///
/// # Errors
/// - [`Error::PersonNotFound`] if the delta names a person absent from `current`
/// - [`Error::Validation`] if a balance would leave the `i64` cent range
///
/// Nothing is applied in either case.
pub fn apply_delta(current: &[PersonBalance], delta: &BalanceDelta) -> Result<Vec<PersonBalance>> {
    if let Some((missing, _)) = delta
        .iter()
        .find(|(id, _)| !current.iter().any(|person| person.id == *id))
    {
        return Err(Error::PersonNotFound {
            reference: missing.to_string(),
        });
    }

    let updated = current
        .iter()
        .map(|person| {
            let balance = person
                .balance
                .checked_add(delta.get(person.id))
                .ok_or_else(|| {
                    Error::validation(format!("Balance of {} is out of range", person.name))
                })?;
            Ok(PersonBalance {
                balance,
                ..person.clone()
            })
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(net = %delta.sum(), "Applied balance delta");
    Ok(updated)
}

/// Balances after creating (`old = None`) or updating a purchase.
///
/// # Errors
/// [`Error::PersonNotFound`] for an unknown payer or participant, [`Error::Validation`] for
/// out-of-range amounts.
pub fn apply_purchase_upsert(
    new: &PurchaseRecord,
    old: Option<&PurchaseRecord>,
    current: &[PersonBalance],
) -> Result<Vec<PersonBalance>> {
    apply_delta(current, &purchase_delta(Some(new), old)?)
}

/// Balances after deleting a purchase.
///
/// # Errors
/// Same as [`apply_purchase_upsert`].
pub fn apply_purchase_delete(
    purchase: &PurchaseRecord,
    current: &[PersonBalance],
) -> Result<Vec<PersonBalance>> {
    apply_delta(current, &purchase_delta(None, Some(purchase))?)
}

/// Balances after creating (`old = None`) or updating a payment.
///
/// # Errors
/// [`Error::PersonNotFound`] for an unknown sender or receiver, [`Error::Validation`] when a
/// balance would overflow.
pub fn apply_payment_upsert(
    new: &PaymentRecord,
    old: Option<&PaymentRecord>,
    current: &[PersonBalance],
) -> Result<Vec<PersonBalance>> {
    apply_delta(current, &payment_delta(Some(new), old))
}

/// Balances after deleting a payment.
///
/// # Errors
/// Same as [`apply_payment_upsert`].
pub fn apply_payment_delete(
    payment: &PaymentRecord,
    current: &[PersonBalance],
) -> Result<Vec<PersonBalance>> {
    apply_delta(current, &payment_delta(None, Some(payment)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::records::{LineItem, Share};

    const A: i64 = 1;
    const B: i64 = 2;
    const C: i64 = 3;
    const D: i64 = 4;

    fn persons() -> Vec<PersonBalance> {
        ["Alice", "Bob", "Carol", "Dave"]
            .iter()
            .zip([A, B, C, D])
            .map(|(name, id)| PersonBalance {
                id,
                name: (*name).to_string(),
                balance: Money::ZERO,
            })
            .collect()
    }

    fn equal_shares(ids: &[i64]) -> Vec<Share> {
        #[allow(clippy::cast_precision_loss)]
        let rate = 1.0 / ids.len() as f64;
        ids.iter()
            .map(|&person_id| Share {
                person_id,
                share_rate: rate,
            })
            .collect()
    }

    fn purchase(paid_by: i64, price_cents: i64, participants: &[i64]) -> PurchaseRecord {
        PurchaseRecord {
            paid_by,
            items: vec![LineItem {
                quantity: 1.0,
                price: Money::from_cents(price_cents),
                tax_rate: 0.0,
                shares: equal_shares(participants),
            }],
        }
    }

    fn balance_of(persons: &[PersonBalance], id: i64) -> Money {
        persons.iter().find(|p| p.id == id).unwrap().balance
    }

    fn total(persons: &[PersonBalance]) -> Money {
        persons.iter().map(|p| p.balance).sum()
    }

    #[test]
    fn test_purchase_create_scenario() {
        let after = apply_purchase_upsert(&purchase(A, 3000, &[A, B, C]), None, &persons()).unwrap();
        assert_eq!(balance_of(&after, A), Money::from_cents(2000));
        assert_eq!(balance_of(&after, B), Money::from_cents(-1000));
        assert_eq!(balance_of(&after, C), Money::from_cents(-1000));
        assert_eq!(balance_of(&after, D), Money::ZERO);
        assert_eq!(total(&after), Money::ZERO);
    }

    #[test]
    fn test_payment_after_purchase() {
        let after = apply_purchase_upsert(&purchase(A, 3000, &[A, B, C]), None, &persons()).unwrap();
        let payment = PaymentRecord {
            from_person_id: B,
            to_person_id: A,
            amount: Money::from_cents(500),
        };
        let after = apply_payment_upsert(&payment, None, &after).unwrap();
        assert_eq!(balance_of(&after, A), Money::from_cents(1500));
        assert_eq!(balance_of(&after, B), Money::from_cents(-500));
        assert_eq!(balance_of(&after, C), Money::from_cents(-1000));
        assert_eq!(total(&after), Money::ZERO);
    }

    #[test]
    fn test_purchase_upsert_then_delete_restores_exactly() {
        let start = apply_purchase_upsert(&purchase(B, 1234, &[A, B]), None, &persons()).unwrap();
        let odd = PurchaseRecord {
            paid_by: C,
            items: vec![
                LineItem {
                    quantity: 3.0,
                    price: Money::from_cents(333),
                    tax_rate: 7.5,
                    shares: equal_shares(&[A, B, C]),
                },
                LineItem {
                    quantity: 0.75,
                    price: Money::from_cents(1999),
                    tax_rate: 0.0,
                    shares: equal_shares(&[A, B, C, D]),
                },
            ],
        };
        let mid = apply_purchase_upsert(&odd, None, &start).unwrap();
        assert_eq!(total(&mid), Money::ZERO);
        let end = apply_purchase_delete(&odd, &mid).unwrap();
        assert_eq!(end, start);
    }

    #[test]
    fn test_update_moves_payer_credit_only() {
        let old = purchase(A, 3000, &[B, C]);
        let new = purchase(D, 3000, &[B, C]);
        let delta = purchase_delta(Some(&new), Some(&old)).unwrap();
        assert_eq!(delta.get(A), Money::from_cents(-3000));
        assert_eq!(delta.get(D), Money::from_cents(3000));
        assert_eq!(delta.get(B), Money::ZERO);
        assert_eq!(delta.get(C), Money::ZERO);
        assert_eq!(delta.sum(), Money::ZERO);
    }

    #[test]
    fn test_update_with_identical_record_is_noop() {
        let record = purchase(A, 999, &[A, B, C]);
        let delta = purchase_delta(Some(&record), Some(&record)).unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn test_payment_update_and_delete() {
        let old = PaymentRecord {
            from_person_id: B,
            to_person_id: A,
            amount: Money::from_cents(500),
        };
        let new = PaymentRecord {
            from_person_id: C,
            to_person_id: A,
            amount: Money::from_cents(700),
        };
        let delta = payment_delta(Some(&new), Some(&old));
        assert_eq!(delta.get(B), Money::from_cents(-500));
        assert_eq!(delta.get(C), Money::from_cents(700));
        assert_eq!(delta.get(A), Money::from_cents(500 - 700));
        assert_eq!(delta.sum(), Money::ZERO);

        let with_payment = apply_payment_upsert(&new, None, &persons()).unwrap();
        let restored = apply_payment_delete(&new, &with_payment).unwrap();
        assert_eq!(restored, persons());
    }

    #[test]
    fn test_unknown_person_aborts_without_partial_result() {
        let result = apply_purchase_upsert(&purchase(A, 3000, &[A, 99]), None, &persons());
        assert!(matches!(
            result,
            Err(Error::PersonNotFound { reference }) if reference == "99"
        ));

        let payment = PaymentRecord {
            from_person_id: 42,
            to_person_id: A,
            amount: Money::from_cents(1),
        };
        assert!(apply_payment_upsert(&payment, None, &persons()).is_err());
    }

    #[test]
    fn test_balance_overflow_is_an_error() {
        // Two maximal purchases are fine; a balance pushed past i64 is refused
        let big = purchase(A, Money::MAX_AMOUNT.cents(), &[B]);
        let after = apply_purchase_upsert(&big, None, &persons()).unwrap();
        let after = apply_purchase_upsert(&big, None, &after).unwrap();
        assert_eq!(balance_of(&after, A).cents(), 2 * Money::MAX_AMOUNT.cents());

        let mut near_limit = persons();
        near_limit[0].balance = Money::from_cents(i64::MAX - 10);
        near_limit[1].balance = Money::from_cents(-(i64::MAX - 10));
        let result = apply_purchase_upsert(&purchase(A, 100, &[B]), None, &near_limit);
        assert!(matches!(result, Err(Error::Validation { .. })));

        let oversized = purchase(A, i64::MAX, &[A, B]);
        assert!(matches!(
            apply_purchase_upsert(&oversized, None, &persons()),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_conservation_over_mixed_sequence() {
        let mut balances = persons();
        let p1 = purchase(A, 1001, &[A, B, C]);
        let p2 = purchase(B, 2503, &[A, B, C, D]);
        let p2_edit = purchase(C, 777, &[D]);
        let pay = PaymentRecord {
            from_person_id: D,
            to_person_id: B,
            amount: Money::from_cents(333),
        };

        balances = apply_purchase_upsert(&p1, None, &balances).unwrap();
        assert_eq!(total(&balances), Money::ZERO);
        balances = apply_purchase_upsert(&p2, None, &balances).unwrap();
        assert_eq!(total(&balances), Money::ZERO);
        balances = apply_payment_upsert(&pay, None, &balances).unwrap();
        assert_eq!(total(&balances), Money::ZERO);
        balances = apply_purchase_upsert(&p2_edit, Some(&p2), &balances).unwrap();
        assert_eq!(total(&balances), Money::ZERO);
        balances = apply_purchase_delete(&p1, &balances).unwrap();
        assert_eq!(total(&balances), Money::ZERO);
        balances = apply_payment_delete(&pay, &balances).unwrap();
        assert_eq!(total(&balances), Money::ZERO);

        // Only p2_edit remains: C paid 7.77 for D
        assert_eq!(balance_of(&balances, C), Money::from_cents(777));
        assert_eq!(balance_of(&balances, D), Money::from_cents(-777));
        assert_eq!(balance_of(&balances, A), Money::ZERO);
        assert_eq!(balance_of(&balances, B), Money::ZERO);
    }
}
