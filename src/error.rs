//! Error types for the quote model.
//!
//! Errors are strongly typed using thiserror so callers can match on
//! the exact failure. Validation failures are raised before the attribute
//! tree is touched, so an error never leaves a partial mutation behind.

use thiserror::Error;

/// Validation errors raised while checking caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A setter argument outside its accepted set.
    #[error("Invalid {field} \"{value}\"")]
    InvalidValue {
        /// The field or code set being assigned.
        field: String,
        /// The rejected input.
        value: String,
    },

    /// A path that is empty or has an empty segment.
    #[error("Invalid attribute path '{path}': {reason}")]
    InvalidPath {
        /// The path as written.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A well-formed path outside the schema.
    #[error("Attribute path '{path}' is not registered")]
    UnknownPath {
        /// The unregistered path.
        path: String,
    },

    /// An event name that is neither `change` nor `change:<name>`.
    #[error("Invalid event name '{name}'")]
    InvalidEventName {
        /// The rejected event name.
        name: String,
    },

    /// Malformed data in the options bundle.
    #[error("Invalid model options: {reason}")]
    InvalidOptions {
        /// Which part of the bundle was rejected.
        reason: String,
    },
}

impl ValidationError {
    /// Shorthand for an `InvalidValue` error.
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Errors raised while executing against collaborators or streams.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// A required collaborator or catalog was not supplied.
    #[error("Missing reference: {reference}")]
    MissingReference {
        /// The absent collaborator or data.
        reference: String,
    },

    /// The other end of a change stream is gone.
    #[error("Channel disconnected: {path}")]
    Disconnected {
        /// The event the channel was attached to.
        path: String,
    },

    /// A blocking receive waited too long.
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout {
        /// How long the caller waited.
        duration_ms: u64,
    },
}

impl ExecutionError {
    /// Shorthand for a `MissingReference` error.
    pub fn missing(reference: impl Into<String>) -> Self {
        Self::MissingReference {
            reference: reference.into(),
        }
    }
}

/// Top-level error type for the quote model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Caller input was rejected.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A collaborator or stream failed.
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// A failure raised by a listener or otherwise unexpected.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl ModelError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if a setter rejected its argument.
    #[must_use]
    pub const fn is_invalid_value(&self) -> bool {
        matches!(self, Self::Validation(ValidationError::InvalidValue { .. }))
    }

    /// Returns true if a collaborator or its data was absent.
    #[must_use]
    pub const fn is_missing_reference(&self) -> bool {
        matches!(
            self,
            Self::Execution(ExecutionError::MissingReference { .. })
        )
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
