use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

/// A monetary amount in reais, always held at two fraction digits.
///
/// Values read from user text are never negative; the type itself is signed
/// so balances can go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn to_cents(self) -> i64 {
        self.0
            .checked_mul(Decimal::from(100))
            .and_then(|c| c.round().to_i64())
            .unwrap_or_default()
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_whole(self) -> bool {
        self.0.fract().is_zero()
    }

    /// Brazilian rendering: `.` groups thousands, `,` marks the decimals
    /// (`2.900,50`).
    pub fn to_br_string(self) -> String {
        let (int_part, frac_part) = self.split_parts();
        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{sign}{grouped},{frac_part}")
    }

    /// Brazilian decimal comma without thousands grouping (`2900,50`).
    pub fn to_br_plain_string(self) -> String {
        let (int_part, frac_part) = self.split_parts();
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{sign}{int_part},{frac_part}")
    }

    /// Decimal point, no grouping (`2900.50`).
    pub fn to_plain_string(self) -> String {
        format!("{:.2}", self.0)
    }

    /// `None` when the result does not fit in a `Decimal`.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Clamps at the largest representable amount instead of panicking.
    /// Report totals use this; postings go through the checked variants.
    pub fn saturating_add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }

    /// Sum of `values`, or `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(values: I) -> Option<Money> {
        values
            .into_iter()
            .try_fold(Money::zero(), |acc, v| acc.checked_add(v))
    }

    fn split_parts(self) -> (String, String) {
        let plain = format!("{:.2}", self.0.abs());
        match plain.split_once('.') {
            Some((i, f)) => (i.to_string(), f.to_string()),
            None => (plain, "00".to_string()),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {}", self.to_br_string())
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Money::saturating_add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_roundtrip() {
        assert_eq!(Money::from_cents(290050).to_cents(), 290050);
        assert_eq!(Money::from_cents(5).to_plain_string(), "0.05");
    }

    #[test]
    fn from_decimal_rounds_to_two_places() {
        let m = Money::from_decimal(Decimal::new(12345, 4)); // 1.2345
        assert_eq!(m, Money::from_cents(123));
    }

    #[test]
    fn br_rendering_groups_thousands() {
        assert_eq!(Money::from_cents(290050).to_br_string(), "2.900,50");
        assert_eq!(Money::from_cents(123456789).to_br_string(), "1.234.567,89");
        assert_eq!(Money::from_cents(99).to_br_string(), "0,99");
        assert_eq!(Money::from_cents(-150000).to_br_string(), "-1.500,00");
    }

    #[test]
    fn plain_renderings() {
        let m = Money::from_cents(290050);
        assert_eq!(m.to_br_plain_string(), "2900,50");
        assert_eq!(m.to_plain_string(), "2900.50");
    }

    #[test]
    fn display_uses_real_symbol() {
        assert_eq!(Money::from_cents(18000).to_string(), "R$ 180,00");
    }

    #[test]
    fn whole_and_sign() {
        assert!(Money::from_cents(5000).is_whole());
        assert!(!Money::from_cents(5050).is_whole());
        assert!(Money::from_cents(-1).is_negative());
        assert!(!Money::zero().is_negative());
    }

    #[test]
    fn arithmetic_near_the_limit_does_not_panic() {
        let max = Money::from_decimal(Decimal::MAX);
        assert_eq!(max.checked_add(Money::from_cents(100)), None);
        assert_eq!(Money::zero().checked_sub(max), Some(-max));
        assert_eq!(max.saturating_add(max), max);
        assert_eq!(Money::checked_sum([max, max]), None);
        assert_eq!(
            Money::checked_sum([Money::from_cents(5000), Money::from_cents(2000)]),
            Some(Money::from_cents(7000))
        );
        let total: Money = [max, max].iter().sum();
        assert_eq!(total, max);
        assert_eq!(max.to_cents(), 0);
    }

    #[test]
    fn sum_of_values() {
        let total: Money = [Money::from_cents(5000), Money::from_cents(2000)].iter().sum();
        assert_eq!(total, Money::from_cents(7000));
    }
}
