//! Amount type for handling non-negative monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. It parses user-entered text that
//! may include a dollar sign and commas, and it travels over the wire as a plain JSON number.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

const MAX_WHOLE_UNITS: u64 = 1_000_000_000_000;

/// Represents a dollar amount of a transaction. The value is always finite, never negative and at
/// most `Amount::max()`, so that totals over any realistic number of transactions cannot overflow.
///
/// # Examples
///
/// Parsing with dollar sign and commas:
/// ```
/// # use finance_tracker::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$1,200.50").unwrap();
/// assert_eq!(amount.to_string(), "$1,200.50");
/// ```
///
/// Negative and non-numeric values are rejected:
/// ```
/// # use finance_tracker::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("-5").is_err());
/// assert!(Amount::from_str("abc").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new `Amount`. Returns an error if `value` is negative or larger than
    /// `Amount::max()`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value.to_string()));
        }
        if value > Self::max().0 {
            return Err(AmountError::TooLarge(value.to_string()));
        }
        Ok(Self(value))
    }

    /// The largest amount a single transaction can have: one trillion.
    pub fn max() -> Amount {
        Amount(Decimal::from(MAX_WHOLE_UNITS))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// An error that can occur when parsing an `Amount`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The text was empty or only whitespace.
    Empty,
    /// The text is not a number.
    Invalid(String),
    /// The number is below zero.
    Negative(String),
    /// The number is above `Amount::max()`.
    TooLarge(String),
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "An amount is required"),
            AmountError::Invalid(s) => write!(f, "'{s}' is not a valid amount"),
            AmountError::Negative(s) => write!(f, "The amount '{s}' is negative"),
            AmountError::TooLarge(s) => write!(f, "The amount '{s}' is too large"),
        }
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let without_dollar = unsigned.strip_prefix('$').unwrap_or(unsigned);
        let without_commas = without_dollar.replace(',', "");

        // Decimal::from_str accepts things like "1_000", so only digits and one point get through.
        let well_formed = !without_commas.is_empty()
            && without_commas.chars().any(|c| c.is_ascii_digit())
            && without_commas
                .chars()
                .all(|c| c.is_ascii_digit() || c == '.')
            && without_commas.matches('.').count() <= 1;
        if !well_formed {
            return Err(AmountError::Invalid(trimmed.to_string()));
        }

        let value = Decimal::from_str(&without_commas)
            .map_err(|_| AmountError::Invalid(trimmed.to_string()))?;
        if negative && !value.is_zero() {
            return Err(AmountError::Negative(trimmed.to_string()));
        }
        Amount::new(value).map_err(|_| AmountError::TooLarge(trimmed.to_string()))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}",
            format_num::format_num!(",.2", self.0.to_f64().unwrap_or_default())
        )
    }
}

impl Add for Amount {
    type Output = Amount;

    /// Saturates at `Decimal::MAX` instead of overflowing.
    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Backends store amounts as floating point numbers.
        match self.0.to_f64() {
            Some(f) => serializer.serialize_f64(f),
            None => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Writes an `Amount` as its exact decimal text, e.g. `"45.00"`, instead of a JSON number. Use it
/// with `#[serde(with = "...")]` where amounts must reload with the same digits and scale.
pub(crate) mod exact {
    use super::Amount;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&amount.0.to_string())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        Amount::deserialize(deserializer)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "a non-negative number or numeric string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        let value = Decimal::from_f64(v)
            .ok_or_else(|| E::custom(format!("{v} is not a finite amount")))?;
        Amount::new(value).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Amount::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Amount::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}
