//! Read-only commands: the selectable months, a page of transactions and a month's totals.

use crate::commands::{format_row, open_store, Out};
use crate::model::{Aggregates, Amount, Month, MonthRange, Page, Transaction};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Write;

const RECENT_COUNT: usize = 5;

/// A selectable month: its key and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthEntry {
    key: Month,
    name: String,
}

impl MonthEntry {
    pub fn key(&self) -> Month {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The totals of a month together with its most recent transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    month: Month,
    count: usize,
    aggregates: Aggregates,
    recent: Vec<Transaction>,
}

impl Summary {
    pub fn month(&self) -> Month {
        self.month
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn aggregates(&self) -> Aggregates {
        self.aggregates
    }

    pub fn recent(&self) -> &[Transaction] {
        &self.recent
    }
}

/// Lists the months from January of last year through the current month, newest first.
pub fn months() -> Out<Vec<MonthEntry>> {
    months_in(MonthRange::current())
}

fn months_in(range: MonthRange) -> Out<Vec<MonthEntry>> {
    let entries: Vec<MonthEntry> = range
        .iter()
        .map(|key| MonthEntry {
            key,
            name: key.display_name(),
        })
        .collect();
    let mut message = String::from("Months:");
    for entry in &entries {
        let _ = write!(message, "\n  {}  {}", entry.key, entry.name);
    }
    Out::new(message, entries)
}

/// Shows page `page` of the transactions of `month`, newest first.
pub async fn list(config: &Config, month: Month, page: usize) -> Result<Out<Page<Transaction>>> {
    let store = open_store(config, month).await?;
    let page = store.page(page, store.page_size());

    if store.is_empty() {
        let message = format!("No transactions in {}", month.display_name());
        return Ok(Out::new(message, page));
    }
    let mut message = format!(
        "{}, page {} of {}",
        month.display_name(),
        page.number(),
        page.total_pages()
    );
    if page.is_empty() {
        message.push_str("\n  (no transactions on this page)");
    }
    for t in page.items() {
        let _ = write!(message, "\n  {}", format_row(t));
    }
    Ok(Out::new(message, page))
}

/// Shows the income, expense and balance of `month`, and its most recent transactions.
pub async fn summary(config: &Config, month: Month) -> Result<Out<Summary>> {
    let store = open_store(config, month).await?;
    let summary = Summary {
        month,
        count: store.transactions().len(),
        aggregates: store.aggregates(),
        recent: store.recent(RECENT_COUNT),
    };
    let totals = summary.aggregates;
    let mut message = format!(
        "{}: {} transactions\n  Income:  {}\n  Expense: {}\n  Balance: {}",
        month.display_name(),
        summary.count,
        totals.income(),
        totals.expense(),
        format_balance(totals),
    );
    if !summary.recent.is_empty() {
        message.push_str("\nRecent:");
        for t in &summary.recent {
            let _ = write!(message, "\n  {}", format_row(t));
        }
    }
    Ok(Out::new(message, summary))
}

/// The balance formatted like an `Amount`, with a leading minus sign when it is negative.
fn format_balance(totals: Aggregates) -> String {
    if totals.expense() > totals.income() {
        // Expense is larger, so the difference is a valid non-negative amount.
        match Amount::new(-totals.balance()) {
            Ok(amount) => format!("-{amount}"),
            Err(_) => totals.balance().to_string(),
        }
    } else {
        match Amount::new(totals.balance()) {
            Ok(amount) => amount.to_string(),
            Err(_) => totals.balance().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionType;
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    #[test]
    fn test_months_in() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let out = months_in(MonthRange::ending_at(today));
        let entries = out.structure().unwrap();
        assert_eq!(entries.len(), 18);
        assert_eq!(entries[0].key(), Month::new(2024, 6).unwrap());
        assert_eq!(entries[0].name(), "June 2024");
        assert_eq!(entries[17].name(), "January 2023");
        assert!(out.message().contains("2023-01  January 2023"));
    }

    #[test]
    fn test_months_starts_with_current() {
        let out = months();
        assert_eq!(out.structure().unwrap()[0].key(), Month::current());
    }

    #[tokio::test]
    async fn test_list_pages_newest_first() {
        let env = TestEnv::new().await;
        let june = Month::new(2024, 6).unwrap();
        for i in 1..=12 {
            env.seed(TransactionType::Expense, "1", &format!("t{i}"), june)
                .await;
        }
        env.seed(TransactionType::Income, "5", "other month", june.pred())
            .await;

        let out = list(&env.config(), june, 1).await.unwrap();
        let page = out.structure().unwrap();
        assert_eq!(page.total_pages(), 2);
        assert_eq!(page.items().len(), 10);
        assert_eq!(page.items()[0].description(), "t12");
        assert!(out.message().starts_with("June 2024, page 1 of 2"));

        let out = list(&env.config(), june, 2).await.unwrap();
        let names: Vec<&str> = out
            .structure()
            .unwrap()
            .items()
            .iter()
            .map(|t| t.description())
            .collect();
        assert_eq!(names, vec!["t2", "t1"]);

        let out = list(&env.config(), june, 3).await.unwrap();
        assert!(out.structure().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_empty_month() {
        let env = TestEnv::new().await;
        let out = list(&env.config(), Month::new(2024, 1).unwrap(), 1)
            .await
            .unwrap();
        assert_eq!(out.message(), "No transactions in January 2024");
    }

    #[tokio::test]
    async fn test_summary() {
        let env = TestEnv::new().await;
        let june = Month::new(2024, 6).unwrap();
        env.seed(TransactionType::Expense, "45.00", "Groceries", june)
            .await;
        env.seed(TransactionType::Income, "100.00", "Gift", june)
            .await;

        let out = summary(&env.config(), june).await.unwrap();
        let summary = out.structure().unwrap();
        assert_eq!(summary.count(), 2);
        assert_eq!(summary.aggregates().balance().to_string(), "55.00");
        assert_eq!(summary.recent()[0].description(), "Gift");
        assert!(out.message().contains("Balance: $55.00"));
    }

    #[tokio::test]
    async fn test_summary_negative_balance() {
        let env = TestEnv::new().await;
        let june = Month::new(2024, 6).unwrap();
        env.seed(TransactionType::Expense, "1200.50", "Rent", june)
            .await;
        let out = summary(&env.config(), june).await.unwrap();
        assert!(out.message().contains("Balance: -$1,200.50"));
    }
}
