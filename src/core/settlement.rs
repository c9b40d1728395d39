//! Settlement planner.
//!
//! Reduces a balance snapshot to an ordered list of "X pays Y" transfers that zero every
//! balance. Greedy two-pointer over the sorted balances: the biggest debtor pays the biggest
//! creditor as much as one of them can absorb, so every step settles at least one person and
//! `n` people need at most `n - 1` transfers.

use crate::core::{money::Money, records::PersonBalance};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Smallest transfer worth reporting. Anything below a cent is noise.
pub const MIN_TRANSFER: Money = Money::from_cents(1);

/// One settling payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Debtor
    pub from_person_id: i64,
    /// Creditor
    pub to_person_id: i64,
    /// Positive amount to hand over
    pub amount: Money,
}

/// Result of planning a settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Settlement {
    /// Nobody owes anybody anything
    AllSettled,
    /// Transfers to perform, in order
    Transfers(Vec<Transfer>),
}

impl Settlement {
    /// The planned transfers (empty when settled).
    #[must_use]
    pub fn transfers(&self) -> &[Transfer] {
        match self {
            Self::AllSettled => &[],
            Self::Transfers(transfers) => transfers,
        }
    }

    /// Whether no transfer is needed.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::AllSettled)
    }

    /// Human-readable lines, e.g. `"Bob needs to pay Alice $10.00."`.
    ///
    /// Unknown ids fall back to `#<id>`.
    #[must_use]
    pub fn describe(&self, persons: &[PersonBalance]) -> Vec<String> {
        let names: HashMap<i64, &str> = persons
            .iter()
            .map(|person| (person.id, person.name.as_str()))
            .collect();
        let name_of = |id: i64| {
            names
                .get(&id)
                .map_or_else(|| format!("#{id}"), |name| (*name).to_string())
        };

        match self {
            Self::AllSettled => vec!["all payments resolved".to_string()],
            Self::Transfers(transfers) => transfers
                .iter()
                .map(|transfer| {
                    format!(
                        "{} needs to pay {} ${}.",
                        name_of(transfer.from_person_id),
                        name_of(transfer.to_person_id),
                        transfer.amount
                    )
                })
                .collect(),
        }
    }
}

/// Plans the transfers that settle every balance.
///
/// The input is expected to sum to zero; if it does not, a data-integrity warning is logged
/// and the planner settles as much as it can.
#[must_use]
pub fn plan_settlement(persons: &[PersonBalance]) -> Settlement {
    let net: Money = persons.iter().map(|person| person.balance).sum();
    if !net.is_zero() {
        warn!(%net, "Balances do not sum to zero; settlement will be incomplete");
    }

    let mut ledger: Vec<(i64, Money)> = persons
        .iter()
        .map(|person| (person.id, person.balance))
        .collect();
    ledger.sort_by_key(|(_, balance)| *balance);

    if ledger.len() < 2 {
        return Settlement::AllSettled;
    }
    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, ledger.len() - 1);

    while i < j {
        let debt = -ledger[i].1;
        let credit = ledger[j].1;
        if !debt.is_positive() {
            // No debtors left on the low side
            i += 1;
            continue;
        }
        if !credit.is_positive() {
            j -= 1;
            continue;
        }

        let amount = debt.min(credit);
        if amount >= MIN_TRANSFER {
            transfers.push(Transfer {
                from_person_id: ledger[i].0,
                to_person_id: ledger[j].0,
                amount,
            });
        }
        ledger[i].1 += amount;
        ledger[j].1 -= amount;

        if ledger[i].1.is_zero() {
            i += 1;
        }
        if ledger[j].1.is_zero() {
            j -= 1;
        }
    }

    if transfers.is_empty() {
        Settlement::AllSettled
    } else {
        Settlement::Transfers(transfers)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn people(balances: &[i64]) -> Vec<PersonBalance> {
        balances
            .iter()
            .enumerate()
            .map(|(index, &cents)| PersonBalance {
                id: i64::try_from(index).unwrap() + 1,
                name: format!("P{}", index + 1),
                balance: Money::from_cents(cents),
            })
            .collect()
    }

    fn settle_and_check(balances: &[i64]) -> Vec<Transfer> {
        let persons = people(balances);
        let plan = plan_settlement(&persons);
        let mut remaining: HashMap<i64, Money> =
            persons.iter().map(|p| (p.id, p.balance)).collect();
        for transfer in plan.transfers() {
            assert!(transfer.amount >= MIN_TRANSFER);
            *remaining.get_mut(&transfer.from_person_id).unwrap() += transfer.amount;
            *remaining.get_mut(&transfer.to_person_id).unwrap() -= transfer.amount;
        }
        assert!(remaining.values().all(|b| b.is_zero()), "{remaining:?}");
        assert!(plan.transfers().len() < balances.len().max(1));
        plan.transfers().to_vec()
    }

    #[test]
    fn test_three_way_scenario() {
        let persons = vec![
            PersonBalance {
                id: 1,
                name: "Alice".to_string(),
                balance: Money::from_cents(2000),
            },
            PersonBalance {
                id: 2,
                name: "Bob".to_string(),
                balance: Money::from_cents(-1000),
            },
            PersonBalance {
                id: 3,
                name: "Carol".to_string(),
                balance: Money::from_cents(-1000),
            },
        ];
        let plan = plan_settlement(&persons);
        let transfers = plan.transfers();
        assert_eq!(transfers.len(), 2);
        assert!(transfers.iter().all(|t| t.to_person_id == 1));
        assert!(transfers.iter().all(|t| t.amount == Money::from_cents(1000)));
        let total: Money = transfers.iter().map(|t| t.amount).sum();
        assert_eq!(total, Money::from_cents(2000));

        let lines = plan.describe(&persons);
        assert!(lines.contains(&"Bob needs to pay Alice $10.00.".to_string()));
        assert!(lines.contains(&"Carol needs to pay Alice $10.00.".to_string()));
    }

    #[test]
    fn test_all_settled() {
        let plan = plan_settlement(&people(&[0, 0, 0]));
        assert!(plan.is_settled());
        assert_eq!(plan.describe(&[]), vec!["all payments resolved".to_string()]);
        assert!(plan_settlement(&[]).is_settled());
        assert!(plan_settlement(&people(&[0])).is_settled());
    }

    #[test]
    fn test_sub_cent_balances_are_settled() {
        let persons = vec![
            PersonBalance {
                id: 1,
                name: "A".to_string(),
                balance: Money::from_major(0.004),
            },
            PersonBalance {
                id: 2,
                name: "B".to_string(),
                balance: Money::from_major(-0.004),
            },
        ];
        assert!(plan_settlement(&persons).is_settled());
    }

    #[test]
    fn test_one_cent_is_reported() {
        let transfers = settle_and_check(&[1, -1]);
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].from_person_id, 2);
        assert_eq!(transfers[0].amount, Money::from_cents(1));
    }

    #[test]
    fn test_equal_magnitudes_advance_both_pointers() {
        let transfers = settle_and_check(&[-500, 500, -300, 300]);
        assert_eq!(transfers.len(), 2);
    }

    #[test]
    fn test_mixed_balances_settle_within_bound() {
        settle_and_check(&[2500, -1000, -500, -1000]);
        settle_and_check(&[-3333, 1111, 1111, 1111]);
        settle_and_check(&[10_001, -1, -2, -3, -9995]);
        settle_and_check(&[700, -250, 350, -800]);
    }

    #[test]
    fn test_non_zero_sum_still_terminates() {
        let plan = plan_settlement(&people(&[1000, -400]));
        assert_eq!(
            plan.transfers(),
            &[Transfer {
                from_person_id: 2,
                to_person_id: 1,
                amount: Money::from_cents(400)
            }]
        );
        assert!(plan_settlement(&people(&[100, 200])).is_settled());
        assert!(plan_settlement(&people(&[-100, -200])).is_settled());
    }
}
