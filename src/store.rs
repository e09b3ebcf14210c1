//! The `TransactionStore`: the transactions of the selected month, their totals and a paginated,
//! newest-first view of them.
//!
//! Every backend call has one failure path. The error is logged, recorded as the store's error
//! message, broadcast to subscribers and returned, and the data is left exactly as it was before
//! the call. There are no retries; the user re-selects the month or resubmits.

use crate::api::{self, Storage};
use crate::error::{Error, ErrorType};
use crate::model::{
    total_pages, Aggregates, Amount, Month, MonthRange, NewTransaction, Page, Transaction,
    TransactionId, TransactionType,
};
use crate::{Config, Result};
use serde::Serialize;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

/// Shown when transactions cannot be loaded.
pub const FETCH_FAILED: &str = "Failed to fetch transactions. Please try again.";
/// Shown when a new transaction cannot be saved.
pub const ADD_FAILED: &str = "Failed to add transaction. Please try again.";
/// Shown when a transaction cannot be deleted.
pub const DELETE_FAILED: &str = "Failed to delete transaction. Please try again.";
/// Shown when the amount or the description is blank.
pub const MISSING_INPUT: &str = "Please enter both amount and description.";
/// Shown when the amount is not a non-negative number.
pub const INVALID_AMOUNT: &str = "Please enter a valid amount.";

const EVENT_CAPACITY: usize = 64;

/// The message a UI shows in its error area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorMessage {
    error_type: ErrorType,
    message: String,
}

impl ErrorMessage {
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&Error> for ErrorMessage {
    fn from(e: &Error) -> Self {
        Self {
            error_type: e.error_type(),
            message: e.message(),
        }
    }
}

/// Sent to subscribers whenever the state of the store changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A different month was selected. A `Loaded` or `Failed` event follows.
    MonthChanged(Month),
    /// The transactions of `month` replaced the list.
    Loaded { month: Month, count: usize },
    /// A transaction was created and appended to the list.
    Added(Transaction),
    /// A transaction was deleted and removed from the list.
    Removed(TransactionId),
    /// The pagination cursor moved.
    PageChanged(usize),
    /// An operation failed; the message is now the store's error.
    Failed(ErrorMessage),
    /// The error message was cleared.
    Cleared,
}

#[derive(Debug)]
struct State {
    /// The selected month.
    month: Month,
    /// The month `transactions` belong to. Differs from `month` after a failed load.
    loaded_month: Month,
    /// Oldest first, in the order the backend returned or created them.
    transactions: Vec<Transaction>,
    aggregates: Aggregates,
    /// 1-based.
    page: usize,
    error: Option<ErrorMessage>,
    /// Incremented by each load. A load only applies its result if no other load started since.
    generation: u64,
}

impl State {
    fn recompute(&mut self) {
        self.aggregates = Aggregates::from_transactions(&self.transactions);
    }

    fn last_page(&self, page_size: usize) -> usize {
        total_pages(self.transactions.len(), page_size).max(1)
    }
}

struct Inner {
    storage: Arc<dyn Storage>,
    page_size: usize,
    state: Mutex<State>,
    events: broadcast::Sender<StoreEvent>,
}

/// Holds the transactions of one month and everything derived from them.
///
/// Cloning is cheap and every clone shares the same state, so a UI can keep a handle while an
/// operation is in flight on another one.
#[derive(Clone)]
pub struct TransactionStore {
    inner: Arc<Inner>,
}

impl TransactionStore {
    /// Creates a store over `storage` with the current month selected. Nothing is loaded until
    /// `load` or `set_month` is called.
    pub fn new(storage: Arc<dyn Storage>, page_size: usize) -> Self {
        Self::with_month(storage, page_size, Month::current())
    }

    /// Creates a store over `storage` with `month` selected.
    pub fn with_month(storage: Arc<dyn Storage>, page_size: usize, month: Month) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                storage,
                page_size,
                state: Mutex::new(State {
                    month,
                    loaded_month: month,
                    transactions: Vec::new(),
                    aggregates: Aggregates::default(),
                    page: 1,
                    error: None,
                    generation: 0,
                }),
                events,
            }),
        }
    }

    /// Creates a store using the backend and page size from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = api::storage(config)?;
        Ok(Self::new(storage, config.page_size()))
    }

    /// Receives a `StoreEvent` for every subsequent change.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    /// Selects `month`, resets the cursor to page 1, clears the error and reloads.
    pub async fn set_month(&self, month: Month) -> Result<()> {
        {
            let mut state = self.state();
            state.month = month;
            state.page = 1;
            state.error = None;
        }
        info!("Selected {}", month.display_name());
        self.emit(StoreEvent::MonthChanged(month));
        self.load(month).await
    }

    /// Replaces the list with the transactions of `month` from the backend.
    ///
    /// On failure the previous list stays in place. If another load starts before this one
    /// finishes, this one's result is dropped when it arrives.
    pub async fn load(&self, month: Month) -> Result<()> {
        let ticket = {
            let mut state = self.state();
            state.generation += 1;
            state.generation
        };
        debug!("Loading transactions for {month}");
        let result = self.inner.storage.list(month).await;

        let mut state = self.state();
        if state.generation != ticket {
            debug!("Discarding the result of a superseded load of {month}");
            return Ok(());
        }
        match result {
            Ok(transactions) => {
                let count = transactions.len();
                state.month = month;
                state.loaded_month = month;
                state.transactions = transactions;
                state.recompute();
                state.page = 1;
                state.error = None;
                drop(state);
                debug!("Loaded {count} transactions for {month}");
                self.emit(StoreEvent::Loaded { month, count });
                Ok(())
            }
            Err(e) => {
                drop(state);
                self.fail(e.context(FETCH_FAILED))
            }
        }
    }

    /// Reloads the selected month.
    pub async fn refresh(&self) -> Result<()> {
        let month = self.month();
        self.load(month).await
    }

    /// Validates the form input, then creates a transaction in the selected month.
    ///
    /// Invalid input never reaches the backend. On success the created record, as returned by the
    /// backend, is appended to the list.
    pub async fn add(
        &self,
        transaction_type: TransactionType,
        amount: &str,
        description: &str,
    ) -> Result<Transaction> {
        let month = self.month();
        let new_transaction = match validate(transaction_type, amount, description, month) {
            Ok(new_transaction) => new_transaction,
            Err(e) => return self.fail(e),
        };
        self.clear_error();

        trace!("Submitting {new_transaction:?}");
        match self.inner.storage.create(new_transaction).await {
            Ok(created) => {
                let mut state = self.state();
                if state.month == month && state.loaded_month == month {
                    state.transactions.push(created.clone());
                    state.recompute();
                } else {
                    debug!(
                        "Transaction {} belongs to {month}, which is not the month on display",
                        created.id()
                    );
                }
                state.error = None;
                drop(state);
                info!(
                    "Added {} of {} '{}'",
                    created.transaction_type(),
                    created.amount(),
                    created.description()
                );
                self.emit(StoreEvent::Added(created.clone()));
                Ok(created)
            }
            Err(e) => self.fail(e.context(ADD_FAILED)),
        }
    }

    /// Deletes the transaction `id` and removes it from the list.
    pub async fn remove(&self, id: &TransactionId) -> Result<()> {
        match self.inner.storage.delete(id).await {
            Ok(()) => {
                let mut state = self.state();
                state.transactions.retain(|t| t.id() != id);
                state.recompute();
                let last_page = state.last_page(self.inner.page_size);
                state.page = state.page.min(last_page);
                state.error = None;
                drop(state);
                info!("Removed transaction {id}");
                self.emit(StoreEvent::Removed(id.clone()));
                Ok(())
            }
            Err(e) => self.fail(e.context(DELETE_FAILED)),
        }
    }

    /// The selected month.
    pub fn month(&self) -> Month {
        self.state().month
    }

    /// The month whose transactions are on display. After a failed load this is still the
    /// previous month.
    pub fn loaded_month(&self) -> Month {
        self.state().loaded_month
    }

    /// The transactions on display, oldest first.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.state().transactions.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.state().transactions.is_empty()
    }

    /// Income, expense and balance over the current list.
    pub fn aggregates(&self) -> Aggregates {
        self.state().aggregates
    }

    /// The message of the most recent failure, unless it has been cleared since.
    pub fn error(&self) -> Option<ErrorMessage> {
        self.state().error.clone()
    }

    pub fn clear_error(&self) {
        let had_error = self.state().error.take().is_some();
        if had_error {
            self.emit(StoreEvent::Cleared);
        }
    }

    /// Page `number` (1-based) of the list, newest first. Out-of-range pages are empty.
    pub fn page(&self, number: usize, page_size: usize) -> Page<Transaction> {
        Page::of(&self.state().transactions, number, page_size)
    }

    pub fn total_pages(&self, page_size: usize) -> usize {
        total_pages(self.state().transactions.len(), page_size)
    }

    /// The configured number of transactions per page.
    pub fn page_size(&self) -> usize {
        self.inner.page_size
    }

    /// The page the cursor is on.
    pub fn current_page(&self) -> usize {
        self.state().page
    }

    /// The page under the cursor, using the configured page size.
    pub fn current_page_items(&self) -> Page<Transaction> {
        let state = self.state();
        Page::of(&state.transactions, state.page, self.inner.page_size)
    }

    /// Moves the cursor forward, stopping at the last page. Returns the new page number.
    pub fn next_page(&self) -> usize {
        let page = {
            let mut state = self.state();
            state.page = (state.page + 1).min(state.last_page(self.inner.page_size));
            state.page
        };
        self.emit(StoreEvent::PageChanged(page));
        page
    }

    /// Moves the cursor back, stopping at page 1. Returns the new page number.
    pub fn previous_page(&self) -> usize {
        let page = {
            let mut state = self.state();
            state.page = state.page.saturating_sub(1).max(1);
            state.page
        };
        self.emit(StoreEvent::PageChanged(page));
        page
    }

    /// The `n` most recently added transactions, newest first.
    pub fn recent(&self, n: usize) -> Vec<Transaction> {
        self.state()
            .transactions
            .iter()
            .rev()
            .take(n)
            .cloned()
            .collect()
    }

    /// The months a user can select, newest first. This depends only on today's date.
    pub fn available_months(&self) -> MonthRange {
        MonthRange::current()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: StoreEvent) {
        if self.inner.events.send(event).is_err() {
            trace!("No subscribers for store events");
        }
    }

    /// Records `e` as the store's error, notifies subscribers and returns it.
    fn fail<T>(&self, e: Error) -> Result<T> {
        warn!("{e:#}");
        let message = ErrorMessage::from(&e);
        self.state().error = Some(message.clone());
        self.emit(StoreEvent::Failed(message));
        Err(e)
    }
}

/// Checks the raw form input and builds the request for it.
fn validate(
    transaction_type: TransactionType,
    amount: &str,
    description: &str,
    month: Month,
) -> Result<NewTransaction> {
    if amount.trim().is_empty() || description.trim().is_empty() {
        return Err(Error::validation(MISSING_INPUT));
    }
    let amount = Amount::from_str(amount)
        .map_err(|e| Error::new(ErrorType::Validation, e).context(INVALID_AMOUNT))?;
    NewTransaction::new(transaction_type, amount, description.trim(), month)
        .ok_or_else(|| Error::validation(MISSING_INPUT))
}
