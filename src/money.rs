//! Fixed-point currency amounts.
//!
//! Every amount in the app (account balances, category targets and
//! transaction amounts) has the range and precision of a SQL `decimal(18,2)`:
//! 18 significant digits, two of them after the decimal point. Amounts are
//! held as [Decimal] in memory and stored as integer minor units (cents) in
//! the database so that sums computed by SQLite stay exact.

use std::{fmt::Display, ops::Neg, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Number of digits kept after the decimal point.
pub const SCALE: u32 = 2;

/// The largest magnitude of an amount expressed in minor units.
pub const MAX_MINOR_UNITS: i64 = 999_999_999_999_999_999;

/// An exact amount of money with two decimal places.
///
/// Values with more than two decimal places are rounded half away from zero,
/// values with more than sixteen integer digits are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero, with two decimal places.
    pub const ZERO: Money = Money(Decimal::from_parts(0, 0, 0, false, SCALE));

    /// Create an amount from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns [Error::AmountOutOfRange] if the rounded value does not fit in
    /// a `decimal(18,2)`.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);

        if rounded.abs() > Decimal::new(MAX_MINOR_UNITS, SCALE) {
            return Err(Error::AmountOutOfRange(value.to_string()));
        }

        rounded.rescale(SCALE);

        Ok(Self(rounded))
    }

    /// Create an amount from a count of minor units, e.g. `-4250` for `-42.50`.
    ///
    /// # Errors
    ///
    /// Returns [Error::AmountOutOfRange] if `units` has more than 18 digits.
    pub fn from_minor_units(units: i64) -> Result<Self, Error> {
        if !(-MAX_MINOR_UNITS..=MAX_MINOR_UNITS).contains(&units) {
            return Err(Error::AmountOutOfRange(units.to_string()));
        }

        Ok(Self(Decimal::new(units, SCALE)))
    }

    /// The amount in minor units, e.g. `-4250` for `-42.50`.
    pub fn minor_units(&self) -> i64 {
        // The scale is always `SCALE` and the range is checked on creation,
        // so the mantissa fits in an i64.
        self.0.mantissa() as i64
    }

    /// The amount as a decimal value with two decimal places.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Add two amounts.
    ///
    /// # Errors
    ///
    /// Returns [Error::AmountOutOfRange] if the sum does not fit in a `decimal(18,2)`.
    pub fn checked_add(self, other: Money) -> Result<Money, Error> {
        Money::from_minor_units(self.minor_units() + other.minor_units())
    }

    /// Whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        let mut negated = -self.0;
        negated.rescale(SCALE);
        Money(negated)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::ZERO
    }
}

impl TryFrom<Decimal> for Money {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|error| Error::InvalidAmount(format!("\"{s}\": {error}")))?;

        Money::new(value)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.minor_units()))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let units = i64::column_result(value)?;

        Money::from_minor_units(units).map_err(|_| FromSqlError::OutOfRange(units))
    }
}
