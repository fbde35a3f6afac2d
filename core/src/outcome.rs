//! System-wide success/failure result convention.
//!
//! Expected, recoverable failures (validation errors, handler failures)
//! travel as [`Outcome`] values rather than `Err` across the wrapper
//! boundary. Build-time errors stay in ordinary `Result`s; `Outcome` is the
//! per-invocation currency.
//!
//! # Examples
//!
//! ```
//! use command_bind_core::Outcome;
//! use serde_json::json;
//!
//! let ok = Outcome::success(json!(42));
//! assert!(ok.is_success());
//! assert_eq!(ok.into_text(), "42");
//!
//! let bad = Outcome::failure("invalid choice");
//! assert!(!bad.is_success());
//! assert_eq!(bad.into_text(), "invalid choice");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Success/failure wrapper used instead of exceptions for expected failure
/// paths.
///
/// A success carries a value; a failure carries human-readable error text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// Operation succeeded with the given value.
    Success {
        /// The carried result value.
        value: Value,
    },
    /// Operation failed with the given message.
    Failure {
        /// Human-readable error text.
        error: String,
    },
}

impl Outcome {
    /// Wraps a value in a success outcome.
    pub fn success(value: impl Into<Value>) -> Self {
        Outcome::Success {
            value: value.into(),
        }
    }

    /// Wraps error text in a failure outcome.
    pub fn failure(error: impl Into<String>) -> Self {
        Outcome::Failure {
            error: error.into(),
        }
    }

    /// Whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// The carried value, if this is a success.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Success { value } => Some(value),
            Outcome::Failure { .. } => None,
        }
    }

    /// The carried error text, if this is a failure.
    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { error } => Some(error),
        }
    }

    /// Normalizes the outcome to display text.
    ///
    /// A success value that is already a string passes through unquoted; any
    /// other value is rendered as compact JSON. Failure text is forwarded
    /// as-is.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_bind_core::Outcome;
    /// use serde_json::json;
    ///
    /// assert_eq!(Outcome::success(json!("done")).into_text(), "done");
    /// assert_eq!(Outcome::success(json!({"n": 1})).into_text(), "{\"n\":1}");
    /// assert_eq!(Outcome::failure("boom").into_text(), "boom");
    /// ```
    pub fn into_text(self) -> String {
        match self {
            Outcome::Success {
                value: Value::String(text),
            } => text,
            Outcome::Success { value } => value.to_string(),
            Outcome::Failure { error } => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_accessors() {
        let outcome = Outcome::success(json!([1, 2]));
        assert!(outcome.is_success());
        assert_eq!(outcome.value(), Some(&json!([1, 2])));
        assert_eq!(outcome.error(), None);
    }

    #[test]
    fn test_failure_accessors() {
        let outcome = Outcome::failure("no such field");
        assert!(!outcome.is_success());
        assert_eq!(outcome.value(), None);
        assert_eq!(outcome.error(), Some("no such field"));
    }

    #[test]
    fn test_into_text_stringifies_non_text_values() {
        assert_eq!(Outcome::success(json!(3.5)).into_text(), "3.5");
        assert_eq!(Outcome::success(json!(null)).into_text(), "null");
        assert_eq!(Outcome::success(json!("text")).into_text(), "text");
    }

    #[test]
    fn test_serde_round_trip() {
        let outcome = Outcome::failure("bad input");
        let json = serde_json::to_string(&outcome).unwrap();
        let back: Outcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
