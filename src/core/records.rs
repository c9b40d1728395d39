//! Plain ledger records consumed and produced by the pure engine.
//!
//! These are storage-agnostic views of people, purchases and payments. The pipelines in
//! [`crate::core::purchase`] and [`crate::core::payment`] convert entity models to and from
//! these records; the delta calculator and settlement planner only ever see these types.

use crate::core::money::Money;
use crate::core::shares::compute_line_total;
use crate::errors::Result;
use serde::{Deserialize, Serialize};

/// A person's identity and running balance.
///
/// Positive balance: the group owes this person. Negative: this person owes the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonBalance {
    /// Person id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Net amount owed to (positive) or by (negative) this person
    pub balance: Money,
}

/// Fraction of a line item attributed to one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    /// Participant
    pub person_id: i64,
    /// Fraction of the item's cost in (0, 1]
    pub share_rate: f64,
}

/// One line of a purchase with its normalized shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Number of units, strictly positive
    pub quantity: f64,
    /// Unit price, strictly positive
    pub price: Money,
    /// Tax rate in percent, non-negative
    pub tax_rate: f64,
    /// Who shares the cost of this line
    pub shares: Vec<Share>,
}

impl LineItem {
    /// Authoritative total for this line: `quantity * price * (1 + tax_rate / 100)`.
    ///
    /// # Errors
    /// [`crate::errors::Error::Validation`] when the total is out of range.
    pub fn total_price(&self) -> Result<Money> {
        compute_line_total(self.quantity, self.price, self.tax_rate)
    }

    /// The amount each share is debited, in share order. Always sums to the line total
    /// when the share rates sum to 1.
    ///
    /// # Errors
    /// Same as [`LineItem::total_price`].
    pub fn share_amounts(&self) -> Result<Vec<(i64, Money)>> {
        let rates: Vec<f64> = self.shares.iter().map(|share| share.share_rate).collect();
        Ok(self
            .shares
            .iter()
            .map(|share| share.person_id)
            .zip(self.total_price()?.split_by_rates(&rates))
            .collect())
    }
}

/// The balance-relevant part of a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Person who fronted the money
    pub paid_by: i64,
    /// Line items with their shares
    pub items: Vec<LineItem>,
}

/// The balance-relevant part of a direct payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Person handing over the money
    pub from_person_id: i64,
    /// Person receiving it
    pub to_person_id: i64,
    /// Positive amount
    pub amount: Money,
}
