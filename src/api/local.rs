//! Implements the `Storage` trait on top of a single serialized value: the whole list of
//! transactions stored as one JSON array, either in memory or in a file.
//!
//! Every operation reads the entire value, and every mutation writes the entire value back. File
//! writes go through a temporary file and a rename so a crash never leaves a half-written list.
//! Amounts are written as decimal text so they reload with exactly the digits they were created
//! with.

use crate::api::Storage;
use crate::error::{Error, ErrorType, IntoResult, Res};
use crate::model::{
    exact_amount, iso_date, Amount, Month, NewTransaction, Transaction, TransactionId,
    TransactionType,
};
use crate::{utils, Result};
use anyhow::{anyhow, Context};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// A client-side store. It assigns ids itself, using the current time in milliseconds.
#[derive(Debug)]
pub struct LocalStorage {
    slot: Mutex<Slot>,
}

/// Where the serialized list lives.
#[derive(Debug)]
enum Slot {
    Memory(Vec<Transaction>),
    File(PathBuf),
}

impl LocalStorage {
    /// A store that lives only as long as this object.
    pub fn in_memory() -> Self {
        Self::with_transactions(Vec::new())
    }

    /// An in-memory store seeded with `transactions`.
    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            slot: Mutex::new(Slot::Memory(transactions)),
        }
    }

    /// A store kept in the JSON file at `path`. The file is created on the first write; a missing
    /// file reads as an empty list.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            slot: Mutex::new(Slot::File(path.into())),
        }
    }
}

/// The stored form of a `Transaction`.
#[derive(Debug, Serialize, Deserialize)]
struct Record {
    id: TransactionId,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    #[serde(with = "exact_amount")]
    amount: Amount,
    description: String,
    month: Month,
    #[serde(with = "iso_date")]
    date: NaiveDateTime,
}

impl From<Transaction> for Record {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            transaction_type: t.transaction_type,
            amount: t.amount,
            description: t.description,
            month: t.month,
            date: t.date,
        }
    }
}

impl From<Record> for Transaction {
    fn from(r: Record) -> Self {
        Self {
            id: r.id,
            transaction_type: r.transaction_type,
            amount: r.amount,
            description: r.description,
            month: r.month,
            date: r.date,
        }
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Slot {
    async fn read(&self) -> Res<Vec<Transaction>> {
        match self {
            Slot::Memory(transactions) => Ok(transactions.clone()),
            Slot::File(path) => read_file(path).await,
        }
    }

    async fn write(&mut self, transactions: Vec<Transaction>) -> Res<()> {
        match self {
            Slot::Memory(stored) => {
                *stored = transactions;
                Ok(())
            }
            Slot::File(path) => {
                if let Some(parent) = path.parent() {
                    utils::make_dir(parent).await?;
                }
                let records: Vec<Record> = transactions.into_iter().map(Record::from).collect();
                let json = serde_json::to_string(&records)
                    .context("Failed to serialize the transactions")?;
                utils::write_atomic(path, json).await
            }
        }
    }
}

async fn read_file(path: &Path) -> Res<Vec<Transaction>> {
    match utils::read_if_exists(path).await? {
        None => Ok(Vec::new()),
        Some(json) if json.trim().is_empty() => Ok(Vec::new()),
        Some(json) => {
            let records: Vec<Record> = serde_json::from_str(&json)
                .with_context(|| format!("The local store at {} is corrupt", path.display()))?;
            Ok(records.into_iter().map(Transaction::from).collect())
        }
    }
}

/// The current time in milliseconds, or one past the largest numeric id in `existing` if the clock
/// has not moved past it, so that ids stay unique and increasing.
fn next_id(existing: &[Transaction]) -> TransactionId {
    let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let max = existing.iter().filter_map(|t| t.id().as_number()).max();
    match max {
        Some(max) if max >= now => TransactionId::from(max + 1),
        _ => TransactionId::from(now),
    }
}

#[async_trait::async_trait]
impl Storage for LocalStorage {
    async fn list(&self, month: Month) -> Result<Vec<Transaction>> {
        let slot = self.slot.lock().await;
        let all = slot
            .read()
            .await
            .with_context(|| format!("Failed to read the transactions for {month}"))
            .pub_result(ErrorType::Backend)?;
        trace!("Read {} stored transactions", all.len());
        Ok(all.into_iter().filter(|t| t.month() == month).collect())
    }

    async fn create(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        let mut slot = self.slot.lock().await;
        let mut all = slot
            .read()
            .await
            .context("Failed to read the stored transactions")
            .pub_result(ErrorType::Backend)?;
        let id = next_id(&all);
        let transaction = new_transaction.into_transaction(id, Utc::now().naive_utc());
        all.push(transaction.clone());
        slot.write(all)
            .await
            .context("Failed to save the new transaction")
            .pub_result(ErrorType::Backend)?;
        debug!("Stored transaction {}", transaction.id());
        Ok(transaction)
    }

    async fn delete(&self, id: &TransactionId) -> Result<()> {
        let mut slot = self.slot.lock().await;
        let mut all = slot
            .read()
            .await
            .context("Failed to read the stored transactions")
            .pub_result(ErrorType::Backend)?;
        let Some(ix) = all.iter().position(|t| t.id() == id) else {
            return Err(Error::new(
                ErrorType::NotFound,
                anyhow!("No transaction with id {id}"),
            ));
        };
        all.remove(ix);
        slot.write(all)
            .await
            .with_context(|| format!("Failed to save after deleting transaction {id}"))
            .pub_result(ErrorType::Backend)?;
        debug!("Deleted transaction {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn new_txn(month: &str, amount: &str, description: &str) -> NewTransaction {
        NewTransaction::new(
            TransactionType::Expense,
            Amount::from_str(amount).unwrap(),
            description,
            Month::from_str(month).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_increasing() {
        let storage = LocalStorage::in_memory();
        let mut ids = Vec::new();
        for i in 0..20 {
            let t = storage
                .create(new_txn("2024-06", "1", &format!("t{i}")))
                .await
                .unwrap();
            ids.push(t.id().as_number().unwrap());
        }
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_list_filters_by_month_in_insertion_order() {
        let storage = LocalStorage::in_memory();
        storage.create(new_txn("2024-06", "1", "a")).await.unwrap();
        storage.create(new_txn("2024-05", "2", "b")).await.unwrap();
        storage.create(new_txn("2024-06", "3", "c")).await.unwrap();
        let june = storage
            .list(Month::from_str("2024-06").unwrap())
            .await
            .unwrap();
        let names: Vec<&str> = june.iter().map(|t| t.description()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let storage = LocalStorage::in_memory();
        let kept = storage.create(new_txn("2024-06", "1", "a")).await.unwrap();
        let e = storage
            .delete(&TransactionId::from("missing"))
            .await
            .unwrap_err();
        assert_eq!(e.error_type(), ErrorType::NotFound);
        let june = storage.list(kept.month()).await.unwrap();
        assert_eq!(june, vec![kept]);
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.json");

        let first = LocalStorage::file(&path);
        assert!(first
            .list(Month::from_str("2024-06").unwrap())
            .await
            .unwrap()
            .is_empty());
        let a = first.create(new_txn("2024-06", "10", "a")).await.unwrap();
        let b = first.create(new_txn("2024-06", "20", "b")).await.unwrap();
        first.delete(a.id()).await.unwrap();

        let second = LocalStorage::file(&path);
        let june = second
            .list(Month::from_str("2024-06").unwrap())
            .await
            .unwrap();
        assert_eq!(june, vec![b]);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.is_array());
        assert!(raw[0]["id"].is_u64());
    }

    #[tokio::test]
    async fn test_file_store_reloads_amounts_exactly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.json");
        let june = Month::from_str("2024-06").unwrap();

        let first = LocalStorage::file(&path);
        let mut created = Vec::new();
        for amount in ["999999999999.99", "45.00", "0.0001"] {
            created.push(first.create(new_txn("2024-06", amount, "a")).await.unwrap());
        }

        let reloaded = LocalStorage::file(&path).list(june).await.unwrap();
        assert_eq!(reloaded, created);
        let texts: Vec<String> = reloaded
            .iter()
            .map(|t| t.amount().value().to_string())
            .collect();
        assert_eq!(texts, vec!["999999999999.99", "45.00", "0.0001"]);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[1]["amount"], "45.00");
    }

    #[tokio::test]
    async fn test_file_store_reads_numeric_amounts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.json");
        let json = r#"[{
            "id": 1718000000000,
            "type": "income",
            "amount": 1200.5,
            "description": "Salary",
            "month": "2024-06",
            "date": "2024-06-10T08:00:00.000Z"
        }]"#;
        std::fs::write(&path, json).unwrap();
        let june = LocalStorage::file(&path)
            .list(Month::from_str("2024-06").unwrap())
            .await
            .unwrap();
        assert_eq!(june.len(), 1);
        assert_eq!(june[0].amount(), Amount::from_str("1200.50").unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_backend_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.json");
        std::fs::write(&path, "{not json").unwrap();
        let e = LocalStorage::file(&path)
            .list(Month::from_str("2024-06").unwrap())
            .await
            .unwrap_err();
        assert_eq!(e.error_type(), ErrorType::Backend);
        assert!(format!("{e:#}").contains("corrupt"));
    }
}
