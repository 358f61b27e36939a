// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for spat-relay.
//!
//! Provides error types for the relay pipeline:
//! - Bit-level UPER decoding and encoding
//! - Message dispatch (unsupported message IDs)
//! - Frame gate rejections
//! - Configuration and transport failures

use std::fmt;

/// Errors that can occur while relaying SPAT messages.
#[derive(Debug, Clone)]
pub enum SpatError {
    /// Bit buffer too short for requested read
    BufferTooShort {
        /// Requested bits
        requested_bits: usize,
        /// Available bits
        available_bits: usize,
        /// Bit position when error occurred
        bit_pos: usize,
    },

    /// Value outside of its ASN.1 constraint
    ConstraintViolation {
        /// Field or type name
        field: String,
        /// Offending value
        value: i64,
        /// Lower bound
        lower: i64,
        /// Upper bound
        upper: i64,
    },

    /// Decode error with context
    DecodeError {
        /// What was being decoded (e.g., "MessageFrame", "MovementState")
        context: String,
        /// Error message
        message: String,
    },

    /// Encode error with context
    EncodeError {
        /// What was being encoded
        context: String,
        /// Error message
        message: String,
    },

    /// Message ID the relay does not handle
    UnsupportedMessage {
        /// DSRC message ID from the MessageFrame
        message_id: u16,
    },

    /// Datagram rejected by the frame gate
    GateRejected {
        /// Why the datagram was dropped
        reason: String,
    },

    /// Invalid configuration value
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Validation error message
        reason: String,
    },

    /// Socket or I/O failure
    Transport {
        /// Error message
        message: String,
    },

    /// Other error
    Other(String),
}

impl SpatError {
    /// Create a buffer too short error.
    pub fn buffer_too_short(requested_bits: usize, available_bits: usize, bit_pos: usize) -> Self {
        SpatError::BufferTooShort {
            requested_bits,
            available_bits,
            bit_pos,
        }
    }

    /// Create a constraint violation error.
    pub fn constraint(field: impl Into<String>, value: i64, lower: i64, upper: i64) -> Self {
        SpatError::ConstraintViolation {
            field: field.into(),
            value,
            lower,
            upper,
        }
    }

    /// Create a decode error.
    pub fn decode(context: impl Into<String>, message: impl Into<String>) -> Self {
        SpatError::DecodeError {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(context: impl Into<String>, message: impl Into<String>) -> Self {
        SpatError::EncodeError {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported message error.
    pub fn unsupported_message(message_id: u16) -> Self {
        SpatError::UnsupportedMessage { message_id }
    }

    /// Create a gate rejection error.
    pub fn gate_rejected(reason: impl Into<String>) -> Self {
        SpatError::GateRejected {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        SpatError::InvalidConfig {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        SpatError::Transport {
            message: message.into(),
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            SpatError::BufferTooShort {
                requested_bits,
                available_bits,
                bit_pos,
            } => vec![
                ("requested_bits", requested_bits.to_string()),
                ("available_bits", available_bits.to_string()),
                ("bit_pos", bit_pos.to_string()),
            ],
            SpatError::ConstraintViolation {
                field,
                value,
                lower,
                upper,
            } => vec![
                ("field", field.clone()),
                ("value", value.to_string()),
                ("lower", lower.to_string()),
                ("upper", upper.to_string()),
            ],
            SpatError::DecodeError { context, message }
            | SpatError::EncodeError { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            SpatError::UnsupportedMessage { message_id } => {
                vec![("message_id", message_id.to_string())]
            }
            SpatError::GateRejected { reason } => vec![("reason", reason.clone())],
            SpatError::InvalidConfig { key, reason } => {
                vec![("key", key.clone()), ("reason", reason.clone())]
            }
            SpatError::Transport { message } => vec![("message", message.clone())],
            SpatError::Other(msg) => vec![("message", msg.clone())],
        }
    }

    /// Render [`log_fields`](Self::log_fields) as `key=value` pairs.
    pub fn log_line(&self) -> String {
        self.log_fields()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for SpatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatError::BufferTooShort {
                requested_bits,
                available_bits,
                bit_pos,
            } => write!(
                f,
                "Buffer too short: requested {requested_bits} bits at bit {bit_pos}, but only {available_bits} bits available"
            ),
            SpatError::ConstraintViolation {
                field,
                value,
                lower,
                upper,
            } => write!(
                f,
                "Constraint violation in {field}: {value} not in {lower}..={upper}"
            ),
            SpatError::DecodeError { context, message } => {
                write!(f, "Decode error in {context}: {message}")
            }
            SpatError::EncodeError { context, message } => {
                write!(f, "Encode error in {context}: {message}")
            }
            SpatError::UnsupportedMessage { message_id } => {
                write!(f, "Unsupported DSRC message ID: {message_id}")
            }
            SpatError::GateRejected { reason } => write!(f, "Datagram rejected: {reason}"),
            SpatError::InvalidConfig { key, reason } => {
                write!(f, "Invalid config '{key}': {reason}")
            }
            SpatError::Transport { message } => write!(f, "Transport error: {message}"),
            SpatError::Other(msg) => write!(f, "Other error: {msg}"),
        }
    }
}

impl std::error::Error for SpatError {}

impl From<std::io::Error> for SpatError {
    fn from(err: std::io::Error) -> Self {
        SpatError::Transport {
            message: err.to_string(),
        }
    }
}

/// Result type for spat-relay operations.
pub type Result<T> = std::result::Result<T, SpatError>;
