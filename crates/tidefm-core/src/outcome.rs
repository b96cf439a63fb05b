//! Uniform outcome type returned by every user-facing operation.
//!
//! An [`Outcome`] is either Ok (optionally carrying a value) or an error
//! carrying one or more human-readable messages. Batches of independent
//! sub-operations compose with [`Outcome::merge`] so that every failure is
//! reported, not just the first one.

use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Result of an operation: an optional value plus zero or more error messages.
///
/// `is_ok()` is true exactly when the message list is empty.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T = ()> {
    value: Option<T>,
    errors: Vec<String>,
}

impl<T> Outcome<T> {
    /// A successful outcome with no value.
    pub fn ok() -> Self {
        Self {
            value: None,
            errors: Vec::new(),
        }
    }

    /// A successful outcome carrying `value`.
    pub fn ok_with(value: T) -> Self {
        Self {
            value: Some(value),
            errors: Vec::new(),
        }
    }

    /// A failed outcome with a single message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            value: None,
            errors: vec![message.into()],
        }
    }

    /// Builds an outcome from a list of messages. An empty list is Ok.
    pub fn from_errors<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value: None,
            errors: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` when no error has been recorded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `true` when at least one error has been recorded.
    pub fn is_err(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The error messages, in the order they were recorded.
    pub fn messages(&self) -> &[String] {
        &self.errors
    }

    /// The carried value, if any.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Consumes the outcome and returns the carried value, if any.
    pub fn into_value(self) -> Option<T> {
        self.value
    }

    /// Combines two outcomes: error lists are concatenated, and the result
    /// stays Ok only if both sides are Ok. The value of `self` is kept while
    /// the combination is Ok.
    pub fn merge<U>(mut self, other: Outcome<U>) -> Self {
        self.errors.extend(other.errors);
        if !self.errors.is_empty() {
            self.value = None;
        }
        self
    }
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Self::ok()
    }
}

impl<T> From<CoreError> for Outcome<T> {
    fn from(err: CoreError) -> Self {
        Self::error(err.to_string())
    }
}

impl<T> From<CoreResult<T>> for Outcome<T> {
    fn from(result: CoreResult<T>) -> Self {
        match result {
            Ok(value) => Self::ok_with(value),
            Err(err) => err.into(),
        }
    }
}

impl<T> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "ok")
        } else {
            write!(f, "{}", self.errors.join("; "))
        }
    }
}
