//! Error types for Jingle session negotiation

use thiserror::Error;

/// Result type for jingle-core operations
pub type Result<T> = std::result::Result<T, JingleError>;

/// Errors that can occur while building content or driving a session peer
#[derive(Debug, Error)]
pub enum JingleError {
    /// A content descriptor attribute was missing or not a valid value
    #[error("Invalid '{attribute}' attribute: {reason}")]
    InvalidAttribute {
        attribute: &'static str,
        reason: String,
    },

    /// A stored raw attribute does not name a known enumeration member
    #[error("Malformed '{attribute}' value: {value:?}")]
    MalformedValue {
        attribute: &'static str,
        value: String,
    },

    /// The media negotiator rejected or could not produce content
    #[error("Negotiation failed: {reason}")]
    Negotiation { reason: String },

    /// The signaling gateway could not deliver a message
    #[error("Delivery failed: {reason}")]
    Delivery { reason: String },

    /// The operation is not allowed in the peer's current state
    #[error("Illegal state: {message}")]
    IllegalState { message: String },

    /// A local operation failed; `source` carries the cause
    #[error("{operation} failed: {source}")]
    OperationFailed {
        operation: &'static str,
        #[source]
        source: Box<JingleError>,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl JingleError {
    /// Create an invalid attribute error
    pub fn invalid_attribute(attribute: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            attribute,
            reason: reason.into(),
        }
    }

    /// Create a malformed value error
    pub fn malformed(attribute: &'static str, value: impl Into<String>) -> Self {
        Self::MalformedValue {
            attribute,
            value: value.into(),
        }
    }

    /// Create a negotiation error
    pub fn negotiation(reason: impl Into<String>) -> Self {
        Self::Negotiation {
            reason: reason.into(),
        }
    }

    /// Create a delivery error
    pub fn delivery(reason: impl Into<String>) -> Self {
        Self::Delivery {
            reason: reason.into(),
        }
    }

    /// Create an illegal state error
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// Wrap `source` as the cause of a failed local operation
    pub fn operation_failed(operation: &'static str, source: JingleError) -> Self {
        Self::OperationFailed {
            operation,
            source: Box::new(source),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Human readable cause, without the category prefix.
    ///
    /// This is the text placed on outbound session-terminate messages.
    pub fn cause(&self) -> String {
        match self {
            Self::InvalidAttribute { attribute, reason } => format!("{}: {}", attribute, reason),
            Self::MalformedValue { attribute, value } => format!("{}: {}", attribute, value),
            Self::Negotiation { reason } | Self::Delivery { reason } => reason.clone(),
            Self::IllegalState { message } | Self::Config { message } => message.clone(),
            Self::OperationFailed { source, .. } => source.cause(),
        }
    }
}
