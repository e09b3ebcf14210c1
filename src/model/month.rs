//! The `Month` period key and the range of months a user can select.

use anyhow::{bail, Context};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::iter::FusedIterator;
use std::str::FromStr;

/// A calendar month, written as `YYYY-MM`. Transactions are filtered by this key.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    /// 1 through 12.
    month: u32,
}

impl Month {
    /// Returns `None` if `month` is not in `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (0..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month that `date` falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current month according to the local clock.
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1 through 12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month before this one.
    pub fn pred(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// A human-readable name such as `June 2024`.
    pub fn display_name(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(first) => first.format("%B %Y").to_string(),
            None => self.to_string(),
        }
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((year, month)) = s.split_once('-') else {
            bail!("'{s}' is not a month, expected YYYY-MM");
        };
        if year.len() != 4 || month.len() != 2 {
            bail!("'{s}' is not a month, expected YYYY-MM");
        }
        let year: i32 = year
            .parse()
            .with_context(|| format!("Invalid year in '{s}'"))?;
        let month: u32 = month
            .parse()
            .with_context(|| format!("Invalid month in '{s}'"))?;
        Month::new(year, month).with_context(|| format!("'{s}' is not a valid month"))
    }
}

impl Serialize for Month {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Month::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// The months a user can choose from: every month from January of the previous year through the
/// current month. Iterating yields them most recent first.
///
/// This is a plain value, so it can be iterated any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    newest: Month,
    oldest: Month,
}

impl MonthRange {
    /// The selectable months when today is `today`.
    pub fn ending_at(today: NaiveDate) -> Self {
        let newest = Month::of(today);
        let oldest = Month {
            year: newest.year - 1,
            month: 1,
        };
        Self { newest, oldest }
    }

    /// The selectable months as of the local clock.
    pub fn current() -> Self {
        Self::ending_at(Local::now().date_naive())
    }

    pub fn newest(&self) -> Month {
        self.newest
    }

    pub fn oldest(&self) -> Month {
        self.oldest
    }

    pub fn contains(&self, month: Month) -> bool {
        self.oldest <= month && month <= self.newest
    }

    pub fn iter(&self) -> Months {
        Months {
            next: Some(self.newest),
            oldest: self.oldest,
        }
    }
}

impl IntoIterator for MonthRange {
    type Item = Month;
    type IntoIter = Months;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &MonthRange {
    type Item = Month;
    type IntoIter = Months;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a `MonthRange`, newest first.
#[derive(Debug, Clone)]
pub struct Months {
    next: Option<Month>,
    oldest: Month,
}

impl Iterator for Months {
    type Item = Month;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current > self.oldest {
            Some(current.pred())
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = match self.next {
            Some(next) => {
                let span = (next.year - self.oldest.year) * 12 + next.month as i32
                    - self.oldest.month as i32;
                usize::try_from(span + 1).unwrap_or(0)
            }
            None => 0,
        };
        (len, Some(len))
    }
}

impl ExactSizeIterator for Months {}

impl FusedIterator for Months {}
