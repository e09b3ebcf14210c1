//! A `Storage` for tests: an in-memory local store that can be told to fail, and that can hold a
//! `list` call open until the test releases it.

use crate::api::{LocalStorage, Storage};
use crate::error::{Error, ErrorType};
use crate::model::{Month, NewTransaction, Transaction, TransactionId};
use crate::Result;
use anyhow::anyhow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub(crate) struct TestStorage {
    inner: LocalStorage,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
    fail_delete: AtomicBool,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    gates: Mutex<HashMap<Month, Arc<Notify>>>,
}

impl TestStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `list` calls fail like a server answering 500.
    pub(crate) fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Makes the next `list` calls for `month` wait until the returned `Notify` is notified.
    pub(crate) fn hold_list(&self, month: Month) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(month, notify.clone());
        notify
    }

    /// Stores `new_transaction` directly, bypassing failure flags and call counts.
    pub(crate) async fn seed(&self, new_transaction: NewTransaction) -> Transaction {
        self.inner.create(new_transaction).await.unwrap()
    }
}

fn server_error() -> Error {
    Error::new(
        ErrorType::Backend,
        anyhow!("test storage responded with status 500 Internal Server Error"),
    )
}

#[async_trait::async_trait]
impl Storage for TestStorage {
    async fn list(&self, month: Month) -> Result<Vec<Transaction>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().get(&month).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        self.inner.list(month).await
    }

    async fn create(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        self.inner.create(new_transaction).await
    }

    async fn delete(&self, id: &TransactionId) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        self.inner.delete(id).await
    }
}
