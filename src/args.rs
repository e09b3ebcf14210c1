//! These structs provide the CLI interface for the fin CLI.

use crate::model::{Month, TransactionId, TransactionType};
use crate::BackendKind;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;
use url::Url;

/// fin: A command-line tool for tracking monthly income and expenses.
///
/// Transactions are recorded per calendar month, either in a JSON file inside the fin home
/// directory or on a REST server. Run `fin init` first to choose one.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and write the configuration file.
    ///
    /// With `--backend local` (the default) transactions are kept in `transactions.json` inside
    /// the home directory. With `--backend http` they are kept on the REST server at
    /// `--base-url`.
    Init(InitArgs),
    /// List the months that can be selected, newest first.
    Months,
    /// Show one page of a month's transactions, newest first.
    List(ListArgs),
    /// Show a month's income, expenses and balance.
    Summary(MonthArgs),
    /// Record an income or an expense.
    Add(AddArgs),
    /// Delete a transaction by id.
    Remove(RemoveArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration and local transactions are held. Defaults to ~/fin
    #[arg(long, env = "FIN_HOME", default_value_t = default_fin_home())]
    fin_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, fin_home: PathBuf) -> Self {
        Self {
            log_level,
            fin_home: fin_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn fin_home(&self) -> &DisplayPath {
        &self.fin_home
    }
}

/// Args for the `fin init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Where to keep transactions.
    #[arg(long, value_enum, default_value_t = BackendKind::Local)]
    backend: BackendKind,

    /// The address of the REST server, e.g. http://127.0.0.1:5000. Only used with
    /// `--backend http`.
    #[arg(long)]
    base_url: Option<Url>,
}

impl InitArgs {
    pub fn new(backend: BackendKind, base_url: Option<Url>) -> Self {
        Self { backend, base_url }
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }
}

/// Selects a month. Used by commands that only need a month.
#[derive(Debug, Parser, Clone, Default)]
pub struct MonthArgs {
    /// The month as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    month: Option<Month>,
}

impl MonthArgs {
    pub fn new(month: Option<Month>) -> Self {
        Self { month }
    }

    /// The selected month, or the current month if none was given.
    pub fn month(&self) -> Month {
        self.month.unwrap_or_else(Month::current)
    }
}

/// Args for the `fin list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    #[clap(flatten)]
    month: MonthArgs,

    /// The page to show, starting at 1.
    #[arg(long, default_value_t = 1)]
    page: usize,
}

impl ListArgs {
    pub fn new(month: Option<Month>, page: usize) -> Self {
        Self {
            month: MonthArgs::new(month),
            page,
        }
    }

    pub fn month(&self) -> Month {
        self.month.month()
    }

    pub fn page(&self) -> usize {
        self.page
    }
}

/// Args for the `fin add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// Either income or expense.
    transaction_type: TransactionType,

    /// A non-negative amount, e.g. 45.00 or $1,200.50
    amount: String,

    /// What the transaction was for.
    description: String,

    #[clap(flatten)]
    month: MonthArgs,
}

impl AddArgs {
    pub fn new(
        transaction_type: TransactionType,
        amount: impl Into<String>,
        description: impl Into<String>,
        month: Option<Month>,
    ) -> Self {
        Self {
            transaction_type,
            amount: amount.into(),
            description: description.into(),
            month: MonthArgs::new(month),
        }
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn month(&self) -> Month {
        self.month.month()
    }
}

/// Args for the `fin remove` command.
#[derive(Debug, Parser, Clone)]
pub struct RemoveArgs {
    /// The id of the transaction, as shown by `fin list`.
    id: TransactionId,

    /// The month the transaction belongs to. Defaults to the current month.
    #[clap(flatten)]
    month: MonthArgs,
}

impl RemoveArgs {
    pub fn new(id: TransactionId, month: Option<Month>) -> Self {
        Self {
            id,
            month: MonthArgs::new(month),
        }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn month(&self) -> Month {
        self.month.month()
    }
}

fn default_fin_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("fin"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --fin-home or FIN_HOME instead of relying on the default fin \
                home directory.",
            );
            PathBuf::from("fin")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
