//! Fixed-point monetary value.

use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pocketbook_core::{DomainError, ValueObject};

/// Errors raised while building or combining [`Money`] values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("invalid money amount: {0:?}")]
    Invalid(String),

    #[error("money amount cannot be negative (got {0})")]
    Negative(Decimal),

    #[error("money operation result cannot be negative")]
    NegativeResult,

    #[error("money amount is too large")]
    Overflow,
}

impl From<MoneyError> for DomainError {
    fn from(value: MoneyError) -> Self {
        DomainError::validation(value.to_string())
    }
}

/// Non-negative amount of money, stored as whole cents.
///
/// Inputs are rounded half away from zero to the cent. Every operation returns
/// a new value; a result below zero is an error, never a clamp.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money {
    cents: u64,
}

impl Money {
    pub const ZERO: Money = Money { cents: 0 };

    pub const fn zero() -> Self {
        Self::ZERO
    }

    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Parse a decimal string. Both `.` and `,` are accepted as the decimal
    /// separator (`"10.5"`, `"10,50"`).
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MoneyError::Invalid(input.to_string()));
        }
        let normalized = trimmed.replacen(',', ".", 1);
        let value = Decimal::from_str(&normalized)
            .or_else(|_| Decimal::from_scientific(&normalized))
            .map_err(|_| MoneyError::Invalid(input.to_string()))?;
        Self::from_decimal(value)
    }

    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            return Err(MoneyError::Negative(value));
        }
        let cents = rounded
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(MoneyError::Overflow)?
            .abs()
            .to_u64()
            .ok_or(MoneyError::Overflow)?;
        Ok(Self { cents })
    }

    pub const fn cents(&self) -> u64 {
        self.cents
    }

    /// Decimal amount (scale 2).
    pub fn amount(&self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.cents), 2)
    }

    pub const fn is_zero(&self) -> bool {
        self.cents == 0
    }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.cents
            .checked_add(other.cents)
            .map(Money::from_cents)
            .ok_or(MoneyError::Overflow)
    }

    pub fn subtract(&self, other: &Money) -> Result<Money, MoneyError> {
        self.cents
            .checked_sub(other.cents)
            .map(Money::from_cents)
            .ok_or(MoneyError::NegativeResult)
    }

    /// Total of `values`.
    pub fn sum<'a>(values: impl IntoIterator<Item = &'a Money>) -> Result<Money, MoneyError> {
        values
            .into_iter()
            .try_fold(Money::ZERO, |acc, m| acc.add(m))
    }

    /// Brazilian-real rendering, e.g. `R$ 1.234,50`.
    pub fn formatted(&self) -> String {
        let units = (self.cents / 100).to_string();
        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, ch) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        format!("R$ {},{:02}", grouped, self.cents % 100)
    }
}

impl ValueObject for Money {}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Money::parse(&value)
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::from_decimal(value)
    }
}
