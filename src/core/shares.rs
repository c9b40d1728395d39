//! Money and share arithmetic for purchases.
//!
//! Line totals are always recomputed here from quantity, price and tax; a total supplied by a
//! caller is only ever compared against the computed value, never trusted.

use crate::{
    core::{
        money::Money,
        records::{LineItem, Share},
    },
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Who participates in a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareSelection {
    /// Every known person shares the item equally
    Communal,
    /// Only the listed people share the item equally
    Selected(Vec<i64>),
}

/// Computes a line total in cents: `quantity * price * (1 + tax_rate_percent / 100)`,
/// rounded to the nearest cent.
///
/// # Errors
/// Returns [`Error::Validation`] when the result is not finite or exceeds
/// [`Money::MAX_AMOUNT`].
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn compute_line_total(quantity: f64, price: Money, tax_rate_percent: f64) -> Result<Money> {
    let exact = (quantity * price.cents() as f64 * (1.0 + tax_rate_percent / 100.0)).round();
    if !exact.is_finite() || exact.abs() > Money::MAX_AMOUNT.cents() as f64 {
        return Err(Error::validation(format!(
            "Item total must not exceed {}",
            Money::MAX_AMOUNT
        )));
    }
    Ok(Money::from_cents(exact as i64))
}

/// Builds equal shares for a line item.
///
/// A communal selection shares the item across `all_person_ids`; otherwise the explicitly
/// selected people share it. Each participant gets `1 / k`. Duplicate ids are ignored.
///
/// # Errors
/// Returns [`Error::Validation`] when nobody participates.
pub fn compute_item_shares(selection: &ShareSelection, all_person_ids: &[i64]) -> Result<Vec<Share>> {
    let mut selected: Vec<i64> = match selection {
        ShareSelection::Communal => all_person_ids.to_vec(),
        ShareSelection::Selected(ids) => ids.clone(),
    };
    let mut seen = std::collections::HashSet::new();
    selected.retain(|id| seen.insert(*id));

    if selected.is_empty() {
        return Err(Error::validation("At least one participant required"));
    }

    #[allow(clippy::cast_precision_loss)] // participant counts are tiny
    let rate = 1.0 / selected.len() as f64;
    Ok(selected
        .into_iter()
        .map(|person_id| Share {
            person_id,
            share_rate: rate,
        })
        .collect())
}

/// Sum of every line item's authoritative total.
///
/// # Errors
/// Returns [`Error::Validation`] when a line total or the sum exceeds [`Money::MAX_AMOUNT`].
pub fn compute_purchase_total(items: &[LineItem]) -> Result<Money> {
    items.iter().try_fold(Money::ZERO, |total, item| {
        total
            .checked_add(item.total_price()?)
            .filter(|total| *total <= Money::MAX_AMOUNT)
            .ok_or_else(|| {
                Error::validation(format!(
                    "Purchase total must not exceed {}",
                    Money::MAX_AMOUNT
                ))
            })
    })
}

/// Returns the computed purchase total, logging an integrity warning when a supplied total
/// disagrees. The computed value always wins.
///
/// # Errors
/// Same as [`compute_purchase_total`].
pub fn verify_purchase_total(
    purchase_id: Option<i64>,
    supplied: Option<Money>,
    items: &[LineItem],
) -> Result<Money> {
    let computed = compute_purchase_total(items)?;
    if let Some(supplied) = supplied.filter(|supplied| *supplied != computed) {
        warn!(
            ?purchase_id,
            %supplied,
            %computed,
            "Total amount mismatch for purchase; using computed total"
        );
    }
    Ok(computed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    fn item(quantity: f64, price_cents: i64, tax_rate: f64) -> LineItem {
        LineItem {
            quantity,
            price: Money::from_cents(price_cents),
            tax_rate,
            shares: Vec::new(),
        }
    }

    #[test]
    fn test_compute_line_total_without_tax() {
        assert_eq!(
            compute_line_total(1.0, Money::from_cents(3000), 0.0).unwrap(),
            Money::from_cents(3000)
        );
        assert_eq!(
            compute_line_total(3.0, Money::from_cents(250), 0.0).unwrap(),
            Money::from_cents(750)
        );
    }

    #[test]
    fn test_compute_line_total_with_tax_rounds_to_cent() {
        // 2 * 4.99 * 1.0825 = 10.80335
        assert_eq!(
            compute_line_total(2.0, Money::from_cents(499), 8.25).unwrap(),
            Money::from_cents(1080)
        );
        // 0.5 kg at 3.00 with 10% tax
        assert_eq!(
            compute_line_total(0.5, Money::from_cents(300), 10.0).unwrap(),
            Money::from_cents(165)
        );
    }

    #[test]
    fn test_communal_shares_cover_everyone() {
        let shares = compute_item_shares(&ShareSelection::Communal, &[1, 2, 3]).unwrap();
        assert_eq!(shares.len(), 3);
        for share in &shares {
            assert_eq!(share.share_rate, 1.0 / 3.0);
        }
        let ids: Vec<i64> = shares.iter().map(|s| s.person_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_communal_item_debits_thirds() {
        let shares = compute_item_shares(&ShareSelection::Communal, &[1, 2, 3]).unwrap();
        let line = LineItem {
            shares,
            ..item(1.0, 9000, 0.0)
        };
        let amounts = line.share_amounts().unwrap();
        assert_eq!(
            amounts,
            vec![
                (1, Money::from_cents(3000)),
                (2, Money::from_cents(3000)),
                (3, Money::from_cents(3000))
            ]
        );
    }

    #[test]
    fn test_selected_shares_dedupe() {
        let shares =
            compute_item_shares(&ShareSelection::Selected(vec![2, 2, 4]), &[1, 2, 3, 4]).unwrap();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].share_rate, 0.5);
        assert_eq!(shares[1].person_id, 4);
    }

    #[test]
    fn test_empty_selection_rejected() {
        let result = compute_item_shares(&ShareSelection::Selected(Vec::new()), &[1, 2]);
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = compute_item_shares(&ShareSelection::Communal, &[]);
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_purchase_total_and_mismatch() {
        let items = vec![item(1.0, 3000, 0.0), item(2.0, 499, 8.25)];
        assert_eq!(compute_purchase_total(&items).unwrap(), Money::from_cents(4080));

        // A wrong supplied total is not fatal; the computed value wins
        let total = verify_purchase_total(Some(7), Some(Money::from_cents(1)), &items).unwrap();
        assert_eq!(total, Money::from_cents(4080));
        assert_eq!(
            verify_purchase_total(None, None, &items).unwrap(),
            Money::from_cents(4080)
        );
    }

    #[test]
    fn test_line_total_out_of_range_is_rejected() {
        // 3 * 5e16 dollars does not fit in i64 cents
        let huge = Money::from_major(5e16);
        assert!(matches!(
            compute_line_total(3.0, huge, 0.0),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            compute_line_total(2.0, Money::MAX_AMOUNT, 0.0),
            Err(Error::Validation { .. })
        ));
        assert_eq!(
            compute_line_total(1.0, Money::MAX_AMOUNT, 0.0).unwrap(),
            Money::MAX_AMOUNT
        );
    }

    #[test]
    fn test_purchase_total_out_of_range_is_rejected() {
        let max_cents = Money::MAX_AMOUNT.cents();
        let items = vec![item(1.0, max_cents, 0.0), item(1.0, 1, 0.0)];
        assert!(matches!(
            compute_purchase_total(&items),
            Err(Error::Validation { message }) if message.starts_with("Purchase total")
        ));
    }
}
