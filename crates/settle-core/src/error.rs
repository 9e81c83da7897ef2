//! Error types for the Settle library.
//!
//! This module defines the error types used throughout Settle. Errors fall
//! into three families: range errors raised while constructing values,
//! format errors raised while parsing text, and calendar-state errors raised
//! when a calendar cannot be resolved or used.

use thiserror::Error;

/// A specialized Result type for Settle operations.
pub type SettleResult<T> = Result<T, SettleError>;

/// The main error type for Settle operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettleError {
    /// A day/month/year/tick combination or magnitude outside the supported range.
    #[error("Out of range: {message}")]
    OutOfRange {
        /// Description of the offending value.
        message: String,
    },

    /// Text that could not be parsed.
    #[error("Cannot parse '{input}' as {expected}")]
    Format {
        /// The text that failed to parse.
        input: String,
        /// What the text was expected to be.
        expected: &'static str,
    },

    /// An operation was attempted on the empty date.
    #[error("Empty date passed to {operation}")]
    EmptyDate {
        /// The operation that received the empty date.
        operation: &'static str,
    },

    /// No calendar is registered, built in, or listed by the data source under this name.
    #[error("Calendar not found: {name}")]
    CalendarNotFound {
        /// The requested calendar name.
        name: String,
    },

    /// The calendar failed to resolve and cannot answer settlement queries.
    #[error("Calendar {name} is invalid: {reason}")]
    CalendarInvalid {
        /// Canonical calendar name.
        name: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The calendar data source failed.
    #[error("Calendar source error for {name}: {reason}")]
    CalendarSource {
        /// Calendar name passed to the source.
        name: String,
        /// Description of the failure.
        reason: String,
    },

    /// Day count calculation error.
    #[error("Day count error: {reason}")]
    DayCount {
        /// Description of the error.
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {reason}")]
    Config {
        /// Description of the configuration error.
        reason: String,
    },
}

impl SettleError {
    /// Creates an out-of-range error.
    #[must_use]
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::OutOfRange {
            message: message.into(),
        }
    }

    /// Creates a format error.
    #[must_use]
    pub fn format(input: impl Into<String>, expected: &'static str) -> Self {
        Self::Format {
            input: input.into(),
            expected,
        }
    }

    /// Creates an empty-date error.
    #[must_use]
    pub fn empty_date(operation: &'static str) -> Self {
        Self::EmptyDate { operation }
    }

    /// Creates a calendar-not-found error.
    #[must_use]
    pub fn calendar_not_found(name: impl Into<String>) -> Self {
        Self::CalendarNotFound { name: name.into() }
    }

    /// Creates an invalid-calendar error.
    #[must_use]
    pub fn calendar_invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CalendarInvalid {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a calendar source error.
    #[must_use]
    pub fn calendar_source(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CalendarSource {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a day count error.
    #[must_use]
    pub fn day_count(reason: impl Into<String>) -> Self {
        Self::DayCount {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Returns true for errors raised while parsing text.
    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    /// Returns true for range errors.
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}
