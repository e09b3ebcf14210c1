use crate::model::{Amount, Month};
use chrono::{DateTime, NaiveDateTime};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Whether a transaction brings money in or takes it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// The opaque identifier of a transaction. The backend assigns it; the local store derives it from
/// a millisecond timestamp.
///
/// Ids whose text is a canonical number (no sign, no leading zeros) are written as JSON numbers,
/// anything else as a string, so the text always survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id as a number, if it is one.
    pub fn as_number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl From<u64> for TransactionId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TransactionId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl Serialize for TransactionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_number() {
            Some(n) if n.to_string() == self.0 => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TransactionIdVisitor)
    }
}

struct TransactionIdVisitor;

impl Visitor<'_> for TransactionIdVisitor {
    type Value = TransactionId;

    fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "a transaction id as a number or a string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(TransactionId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(TransactionId(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // JavaScript clients may write integral ids as floats.
        if v.fract() == 0.0 && v >= 0.0 && v < u64::MAX as f64 {
            Ok(TransactionId::from(v as u64))
        } else {
            Err(E::custom(format!("{v} is not a valid transaction id")))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(TransactionId::new(v))
    }
}

/// A single recorded income or expense. Transactions are never edited, only created and deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub(crate) id: TransactionId,
    #[serde(rename = "type")]
    pub(crate) transaction_type: TransactionType,
    pub(crate) amount: Amount,
    pub(crate) description: String,
    pub(crate) month: Month,
    #[serde(with = "iso_date")]
    pub(crate) date: NaiveDateTime,
}

impl Transaction {
    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn month(&self) -> Month {
        self.month
    }

    /// When the transaction was recorded, in UTC when the source gave an offset.
    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }
}

/// The body of a create request: a transaction that has passed validation but does not yet have an
/// `id` or a `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub(crate) transaction_type: TransactionType,
    pub(crate) amount: Amount,
    pub(crate) description: String,
    pub(crate) month: Month,
}

impl NewTransaction {
    /// Returns `None` if `description` is blank.
    pub fn new(
        transaction_type: TransactionType,
        amount: Amount,
        description: impl Into<String>,
        month: Month,
    ) -> Option<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return None;
        }
        Some(Self {
            transaction_type,
            amount,
            description,
            month,
        })
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn month(&self) -> Month {
        self.month
    }

    /// Completes the record with the identity the storage assigned to it.
    pub(crate) fn into_transaction(self, id: TransactionId, date: NaiveDateTime) -> Transaction {
        Transaction {
            id,
            transaction_type: self.transaction_type,
            amount: self.amount,
            description: self.description,
            month: self.month,
            date,
        }
    }
}

/// Reads ISO 8601 timestamps with or without an offset and writes them without one.
pub(crate) mod iso_date {
    use super::*;

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub(crate) fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| de::Error::custom(format!("'{s}' is not an ISO 8601 timestamp")))
    }

    pub(crate) fn parse(s: &str) -> Option<NaiveDateTime> {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(s) {
            return Some(with_offset.naive_utc());
        }
        NaiveDateTime::parse_from_str(s, FORMAT).ok()
    }
}
