//! A personal finance tracker: record income and expense transactions per calendar month, see the
//! month's totals and browse its transactions newest first.
//!
//! The `TransactionStore` is the view-model a UI binds to. It talks to one of two persistence
//! backends through the `api::Storage` trait, chosen by the `Config`.

pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
mod store;
#[cfg(test)]
mod test;
mod utils;

pub use config::{Backend, BackendKind, Config, DEFAULT_BASE_URL, LOCAL_STORE_KEY};
pub use error::{Error, ErrorType, Result};
pub use store::{
    ErrorMessage, StoreEvent, TransactionStore, ADD_FAILED, DELETE_FAILED, FETCH_FAILED,
    INVALID_AMOUNT, MISSING_INPUT,
};
