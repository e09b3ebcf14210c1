//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::{self, Storage};
use crate::model::{Amount, Month, NewTransaction, Transaction, TransactionType};
use crate::{BackendKind, Config};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::TempDir;

/// Test environment that sets up a fin home directory with a local-store Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    config: Config,
}

impl TestEnv {
    /// Creates a home directory, initialized for the local backend.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let home = temp_dir.path().join("fin");
        let config = Config::create(&home, BackendKind::Local, None)
            .await
            .unwrap();
        Self {
            _temp_dir: temp_dir,
            home,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Writes a transaction straight into the local store.
    pub async fn seed(
        &self,
        transaction_type: TransactionType,
        amount: &str,
        description: &str,
        month: Month,
    ) -> Transaction {
        let new_transaction = NewTransaction::new(
            transaction_type,
            Amount::from_str(amount).unwrap(),
            description,
            month,
        )
        .unwrap();
        api::storage(&self.config)
            .unwrap()
            .create(new_transaction)
            .await
            .unwrap()
    }

    /// Reads the stored transactions of `month`, bypassing any store.
    pub async fn transactions(&self, month: Month) -> Vec<Transaction> {
        api::storage(&self.config)
            .unwrap()
            .list(month)
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_env_uses_home_directory() {
    let env = TestEnv::new().await;
    assert!(env.home().join("config.json").is_file());
    let month = Month::new(2024, 6).unwrap();
    env.seed(TransactionType::Income, "1", "x", month).await;
    assert!(env.home().join("transactions.json").is_file());
    assert_eq!(env.transactions(month).await.len(), 1);
}
