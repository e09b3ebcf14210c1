//! Persistence backends.
//!
//! Both the REST server and the local store implement the small `Storage` trait. The rest of the
//! crate only sees `Arc<dyn Storage>`, chosen once from the `Config`.

mod http;
mod local;
#[cfg(test)]
mod test_storage;

use crate::model::{Month, NewTransaction, Transaction, TransactionId};
use crate::{Backend, Config, Result};
use std::sync::Arc;
use tracing::debug;

pub use http::HttpStorage;
pub use local::LocalStorage;
#[cfg(test)]
pub(crate) use test_storage::TestStorage;

/// The capabilities a persistence backend must provide.
///
/// Each call touches the backend once. Errors are tagged `Backend` or `NotFound`.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// All transactions recorded for `month`, in the order they were created.
    async fn list(&self, month: Month) -> Result<Vec<Transaction>>;

    /// Persists `new_transaction` and returns it with its assigned `id` and `date`.
    async fn create(&self, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Removes the transaction identified by `id`.
    async fn delete(&self, id: &TransactionId) -> Result<()>;
}

/// Constructs the backend described by `config`.
pub fn storage(config: &Config) -> Result<Arc<dyn Storage>> {
    match config.backend() {
        Backend::Http { base_url } => {
            debug!("Using the REST backend at {base_url}");
            let storage = HttpStorage::new(base_url, config.request_timeout())?;
            Ok(Arc::new(storage))
        }
        Backend::Local { path: Some(path) } => {
            debug!("Using the local store at {}", path.display());
            Ok(Arc::new(LocalStorage::file(path)))
        }
        Backend::Local { path: None } => {
            debug!("Using an in-memory local store");
            Ok(Arc::new(LocalStorage::in_memory()))
        }
    }
}
