//! Fixed-point money in minor units.
//!
//! Balances, prices and amounts are all carried as integer cents. Running balances never
//! drift, and reversing a mutation restores the previous balances exactly. Fractional
//! amounts only appear at the edges (user input, display), where they are rounded to the
//! nearest cent.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A signed monetary amount in cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Largest amount a single price, line, purchase or payment may carry (one trillion).
    ///
    /// Keeps every delta and running balance far inside `i64` cents.
    pub const MAX_AMOUNT: Self = Self(100_000_000_000_000);

    /// Creates an amount from cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates an amount from a major-unit value, rounding half away from zero to the cent.
    ///
    /// Anything within half a cent of zero becomes exactly zero. Values outside the `i64`
    /// range saturate; use [`Money::try_from_major`] for untrusted input.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_major(value: f64) -> Self {
        Self((value * 100.0).round() as i64)
    }

    /// Like [`Money::from_major`], but `None` for non-finite values and for anything whose
    /// magnitude exceeds [`Money::MAX_AMOUNT`].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn try_from_major(value: f64) -> Option<Self> {
        let cents = (value * 100.0).round();
        (cents.is_finite() && cents.abs() <= Self::MAX_AMOUNT.0 as f64)
            .then(|| Self::from_major(value))
    }

    /// Returns the amount in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whether the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Whether the amount is strictly negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition. `None` on `i64` overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Splits this amount across `rates` using largest-remainder allocation.
    ///
    /// The parts always add up to `round(self * sum(rates))`, so rates summing to 1 split the
    /// amount without gaining or losing a cent. Each part gets the floor of its exact share;
    /// leftover cents go to the largest fractional remainders, earlier entries first on ties.
    /// The result depends only on the inputs, so recomputing a split reproduces it exactly.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap
    )]
    pub fn split_by_rates(self, rates: &[f64]) -> Vec<Self> {
        if rates.is_empty() {
            return Vec::new();
        }
        if self.0 < 0 {
            return (-self).split_by_rates(rates).into_iter().map(Neg::neg).collect();
        }

        let amount = self.0 as f64;
        let rate_sum: f64 = rates.iter().sum();
        let target = (amount * rate_sum).round() as i64;

        let exact: Vec<f64> = rates.iter().map(|rate| amount * rate).collect();
        let mut parts: Vec<i64> = exact.iter().map(|value| value.floor() as i64).collect();

        let mut order: Vec<usize> = (0..exact.len()).collect();
        order.sort_by(|&a, &b| {
            let frac_a = exact[a] - exact[a].floor();
            let frac_b = exact[b] - exact[b].floor();
            frac_b.partial_cmp(&frac_a).unwrap_or(Ordering::Equal)
        });

        let mut leftover = target - parts.iter().sum::<i64>();
        let step = leftover.signum();
        let mut cursor = 0;
        while leftover != 0 {
            let index = if step > 0 {
                order[cursor % order.len()]
            } else {
                order[order.len() - 1 - cursor % order.len()]
            };
            parts[index] += step;
            leftover -= step;
            cursor += 1;
        }

        parts.into_iter().map(Self).collect()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_rounds_to_cents() {
        assert_eq!(Money::from_major(30.0).cents(), 3000);
        assert_eq!(Money::from_major(10.994).cents(), 1099);
        assert_eq!(Money::from_major(10.996).cents(), 1100);
        assert_eq!(Money::from_major(-5.5).cents(), -550);
    }

    #[test]
    fn test_sub_cent_residue_is_zero() {
        assert!(Money::from_major(0.004).is_zero());
        assert!(Money::from_major(-0.004).is_zero());
        assert_eq!(Money::from_major(0.006), Money::from_cents(1));
    }

    #[test]
    fn test_try_from_major_bounds() {
        assert_eq!(Money::try_from_major(12.34), Some(Money::from_cents(1234)));
        assert_eq!(Money::try_from_major(1e12), Some(Money::MAX_AMOUNT));
        assert_eq!(Money::try_from_major(-1e12), Some(-Money::MAX_AMOUNT));
        assert_eq!(Money::try_from_major(1e12 + 1.0), None);
        assert_eq!(Money::try_from_major(5e16), None);
        assert_eq!(Money::try_from_major(f64::NAN), None);
        assert_eq!(Money::try_from_major(f64::NEG_INFINITY), None);
    }

    #[test]
    fn test_checked_add() {
        assert_eq!(
            Money::from_cents(5).checked_add(Money::from_cents(-7)),
            Some(Money::from_cents(-2))
        );
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(2000).to_string(), "20.00");
        assert_eq!(Money::from_cents(-1005).to_string(), "-10.05");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
        assert_eq!(Money::from_cents(-7).to_string(), "-0.07");
    }

    #[test]
    fn test_split_even_thirds() {
        let parts = Money::from_cents(9000).split_by_rates(&[1.0 / 3.0; 3]);
        assert_eq!(parts, vec![Money::from_cents(3000); 3]);
    }

    #[test]
    fn test_split_uneven_thirds_keeps_every_cent() {
        let parts = Money::from_cents(1000).split_by_rates(&[1.0 / 3.0; 3]);
        assert_eq!(
            parts,
            vec![
                Money::from_cents(334),
                Money::from_cents(333),
                Money::from_cents(333)
            ]
        );
        assert_eq!(parts.into_iter().sum::<Money>(), Money::from_cents(1000));
    }

    #[test]
    fn test_split_sevenths_sums_to_total() {
        let rates = vec![1.0 / 7.0; 7];
        for cents in [1, 6, 7, 99, 1001, 123_457] {
            let total = Money::from_cents(cents);
            let parts = total.split_by_rates(&rates);
            assert_eq!(parts.iter().copied().sum::<Money>(), total, "cents={cents}");
        }
    }

    #[test]
    fn test_split_negative_mirrors_positive() {
        let positive = Money::from_cents(1000).split_by_rates(&[0.5, 0.25, 0.25]);
        let negative = Money::from_cents(-1000).split_by_rates(&[0.5, 0.25, 0.25]);
        let mirrored: Vec<Money> = positive.into_iter().map(Neg::neg).collect();
        assert_eq!(negative, mirrored);
    }

    #[test]
    fn test_split_partial_rates() {
        // Rates need not cover the whole amount
        let parts = Money::from_cents(1000).split_by_rates(&[0.25]);
        assert_eq!(parts, vec![Money::from_cents(250)]);
        assert!(Money::from_cents(1000).split_by_rates(&[]).is_empty());
    }

    #[test]
    fn test_split_is_deterministic() {
        let rates = [0.2, 0.3, 0.5];
        let first = Money::from_cents(12_345).split_by_rates(&rates);
        let second = Money::from_cents(12_345).split_by_rates(&rates);
        assert_eq!(first, second);
    }
}
