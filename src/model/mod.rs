//! Types that represent the core data model, such as `Transaction` and `Month`.
mod aggregates;
mod amount;
mod month;
mod page;
mod transaction;

pub use aggregates::Aggregates;
pub use amount::{Amount, AmountError};
pub(crate) use amount::exact as exact_amount;
pub use month::{Month, MonthRange, Months};
pub use page::{total_pages, Page};
pub(crate) use transaction::iso_date;
pub use transaction::{NewTransaction, Transaction, TransactionId, TransactionType};
