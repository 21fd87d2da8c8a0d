//! Exact money arithmetic.
//!
//! Amounts are kept as integer minor units (cents) so that balance updates
//! can be done with a single `balance_cents = balance_cents + ?` statement.
//! Conversion from [`Decimal`] rejects anything with more than two
//! fraction digits instead of rounding it.

use rust_decimal::Decimal;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

use super::error::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn try_from_decimal(value: Decimal, field: &'static str) -> Result<Self, ValidationError> {
        if value.normalize().scale() > 2 {
            return Err(ValidationError::TooManyFractionDigits { field });
        }
        let mut scaled = value;
        scaled.rescale(2);
        i64::try_from(scaled.mantissa())
            .map(Money)
            .map_err(|_| ValidationError::AmountOutOfRange { field })
    }

    /// Parse an amount that must be strictly positive
    pub fn positive(value: Decimal, field: &'static str) -> Result<Self, ValidationError> {
        let money = Self::try_from_decimal(value, field)?;
        if money.0 <= 0 {
            return Err(ValidationError::NonPositiveAmount { field });
        }
        Ok(money)
    }

    /// Parse an amount that may be zero but not negative
    pub fn non_negative(value: Decimal, field: &'static str) -> Result<Self, ValidationError> {
        let money = Self::try_from_decimal(value, field)?;
        if money.0 < 0 {
            return Err(ValidationError::NegativeAmount { field });
        }
        Ok(money)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}
