use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

/// A monetary amount. Crosses the JSON wire as a plain number, which is
/// what the persistence collaborator expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::from(cents) / Decimal::from(100))
    }

    pub fn to_cents(self) -> i64 {
        (self.0 * Decimal::from(100)).round().to_i64().unwrap_or(0)
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal)
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

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    pub fn round2(self) -> Self {
        Money(self.0.round_dp(2))
    }

    /// True when the two amounts differ by no more than `tolerance`.
    pub fn approx_eq(self, other: Money, tolerance: Money) -> bool {
        (self - other).abs() <= tolerance
    }

    /// Amount identity window for FITID re-import: 0.009.
    pub fn fitid_tolerance() -> Self {
        Money(Decimal::new(9, 3))
    }

    /// Allowed drift between a split sum and its transaction amount: 0.05.
    pub fn split_tolerance() -> Self {
        Money(Decimal::new(5, 2))
    }
}

/// Parses a statement amount. Accepts either `,` or `.` as the decimal
/// separator; when both appear the dots are thousands separators and the
/// comma is decimal (pt-BR statement convention).
impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let normalized = if s.contains(',') && s.contains('.') {
            s.replace('.', "").replace(',', ".")
        } else if s.contains(',') {
            s.replace(',', ".")
        } else {
            s.to_string()
        };
        Decimal::from_str(&normalized).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {:.2}", self.0)
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
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}
