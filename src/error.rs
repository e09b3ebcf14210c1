//! Error types for the finance tracker.
//!
//! Internally the crate works with `anyhow` (see `Res`) and attaches context as errors bubble up.
//! At the public boundary errors are converted to `Error`, which carries an `ErrorType` so that a
//! UI can decide how to present it.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The result type used inside the crate.
pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;

/// The result type of the public API.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies an `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// User input was missing or could not be parsed. Nothing was sent to the backend.
    Validation,
    /// The backend could not be reached or answered with a failure status.
    Backend,
    /// The backend did not know the requested record.
    NotFound,
    /// The configuration directory or file is missing or invalid.
    Config,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// The public error type. It wraps an `anyhow::Error` chain together with its `ErrorType`.
///
/// `Display` with the alternate flag (`{:#}`) prints the whole context chain, while the plain form
/// prints only the outermost context, which is the message meant for the user.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// Creates a `Validation` error with `message`.
    pub(crate) fn validation(message: impl Display + Debug + Send + Sync + 'static) -> Self {
        Self::new(ErrorType::Validation, anyhow::Error::msg(message))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// The outermost message of the error chain.
    pub fn message(&self) -> String {
        self.inner.to_string()
    }

    /// Wraps the error in another layer of context, keeping its `ErrorType`.
    pub(crate) fn context<C>(self, context: C) -> Self
    where
        C: Display + Send + Sync + 'static,
    {
        Self {
            error_type: self.error_type,
            inner: self.inner.context(context),
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            write!(f, "{:#}", self.inner)
        } else {
            write!(f, "{}", self.inner)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Converts internal results into public results tagged with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Res<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_plain_display_is_outermost_context() {
        let res: Res<()> = Err(anyhow::anyhow!("connection refused")).context("Failed to fetch");
        let e = res.pub_result(ErrorType::Backend).unwrap_err();
        assert_eq!(e.to_string(), "Failed to fetch");
        assert_eq!(format!("{e:#}"), "Failed to fetch: connection refused");
        assert_eq!(e.error_type(), ErrorType::Backend);
    }

    #[test]
    fn test_context_keeps_type() {
        let e = Error::validation("bad amount").context("Please enter a valid amount.");
        assert_eq!(e.error_type(), ErrorType::Validation);
        assert_eq!(e.message(), "Please enter a valid amount.");
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::NotFound.to_string(), "not_found");
    }
}
