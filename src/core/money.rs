//! Fixed-point currency amounts.
//!
//! All monetary values are carried as integer cents so repeated sums never pick up
//! floating-point drift. Floats only appear at the very edge, when a percentage is
//! rendered. Arithmetic saturates instead of overflowing; writes are bounded by
//! [`Money::MAX_AMOUNT`] so saturation only guards rows that predate the bound.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// An amount of money in cents (BRL centavos).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero cents
    pub const ZERO: Self = Self(0);

    /// Largest amount a single installment or expense may carry (R$ 1 billion).
    /// Sums of millions of such rows still fit in an `i64`.
    pub const MAX_AMOUNT: Self = Self(100_000_000_000);

    /// Wraps a raw cent count.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Raw cent count, as stored in the database.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// True below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Formats as Brazilian currency: `R$ 1.234,56`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = (abs / 100).to_string();
        let fraction = abs % 100;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{sign}R$ {grouped},{fraction:02}")
    }
}

/// Share of `part` in `whole` as a percentage, or 0 when `whole` is zero.
#[must_use]
pub fn percentage(part: Money, whole: Money) -> f64 {
    if whole.cents() == 0 {
        return 0.0;
    }

    // Cast safety: cent amounts for a single venue stay far below 2^52.
    #[allow(clippy::cast_precision_loss)]
    let ratio = part.cents() as f64 / whole.cents() as f64;
    ratio * 100.0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_repeated_sums_stay_exact() {
        // 0.1 + 0.2 style drift must not happen
        let total: Money = [Money::from_cents(10); 1000].into_iter().sum();
        assert_eq!(total, Money::from_cents(10_000));
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(huge + huge, Money::from_cents(i64::MAX));

        let mut total = huge;
        total += huge;
        assert_eq!(total, Money::from_cents(i64::MAX));

        assert_eq!(Money::from_cents(i64::MIN) - huge, Money::from_cents(i64::MIN));
        let sum: Money = [huge, huge, huge].into_iter().sum();
        assert_eq!(sum, Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_cents(0).to_string(), "R$ 0,00");
        assert_eq!(Money::from_cents(5).to_string(), "R$ 0,05");
        assert_eq!(Money::from_cents(123_456).to_string(), "R$ 1.234,56");
        assert_eq!(Money::from_cents(100_000_000).to_string(), "R$ 1.000.000,00");
        assert_eq!(Money::from_cents(-150_000).to_string(), "-R$ 1.500,00");
    }

    #[test]
    fn test_percentage_short_circuits_on_zero_total() {
        assert_eq!(percentage(Money::from_cents(50), Money::ZERO), 0.0);
        assert_eq!(
            percentage(Money::from_cents(50), Money::from_cents(200)),
            25.0
        );
    }
}
