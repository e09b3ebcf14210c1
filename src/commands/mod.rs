//! Command handlers for the fin CLI.
//!
//! Each handler builds a `TransactionStore` from the `Config`, performs one operation and returns
//! an `Out` describing the result.

mod delete;
mod init;
mod insert;
mod query;

use crate::model::{Month, Transaction};
use crate::{Config, Result, TransactionStore};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, trace};

pub use delete::remove;
pub use init::init;
pub use insert::add;
pub use query::{list, months, summary, MonthEntry, Summary};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Builds the store described by `config` and loads `month` into it. Store events are traced for
/// as long as the store lives.
pub(crate) async fn open_store(config: &Config, month: Month) -> Result<TransactionStore> {
    let store = TransactionStore::from_config(config)?;
    let mut events = store.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            trace!("Store event: {event:?}");
        }
    });
    store.set_month(month).await?;
    Ok(store)
}

/// One line of a transaction listing.
pub(crate) fn format_row(t: &Transaction) -> String {
    format!(
        "{:>15}  {}  {:<7}  {:>12}  {}",
        t.id().as_str(),
        t.date().format("%Y-%m-%d"),
        t.transaction_type().to_string(),
        t.amount().to_string(),
        t.description()
    )
}
