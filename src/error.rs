//! Error types for dplinkcheck.
//!
//! This module defines the error types used throughout the crate. It separates
//! field lookup failures, configuration problems and per-state checker
//! failures. The `thiserror` crate is used for ergonomic error definitions.
//!
//! Conformance violations are *not* errors in this sense: they are reported as
//! plain messages through the [`ErrorLedger`](crate::ledger::ErrorLedger).

use thiserror::Error;

/// Errors raised while extracting a field from a state record.
///
/// These replace the "-1" sentinel a lookup service would otherwise hand back,
/// so an unavailable field is never confused with a legitimate value of 0.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The field name is not present in the active layout.
    #[error("Unknown state field '{0}'")]
    UnknownField(String),

    /// The raw input does not have the size of a state record.
    #[error("Malformed state record: expected {expected} bytes, got {got}")]
    MalformedRecord { expected: usize, got: usize },

    /// The requested bit range does not lie inside the record.
    #[error("Bit range {offset}+{width} lies outside the {record_bits}-bit state record")]
    OutOfRange {
        offset: u16,
        width: u8,
        record_bits: usize,
    },

    /// Field widths must be between 1 and 32 bits.
    #[error("Unsupported field width {0}; expected 1..=32 bits")]
    UnsupportedWidth(u8),

    /// A lane outside the active link width was requested.
    #[error("Lane {lane} is not active on a {width}-lane link")]
    InactiveLane { lane: usize, width: usize },
}

/// Errors raised while building or validating a link configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required configuration parameter was not supplied.
    #[error("Missing configuration parameter: {0}")]
    MissingParameter(&'static str),

    /// The link width is not one of 1, 2 or 4.
    #[error("Invalid link width '{0}'; expected 1, 2 or 4")]
    InvalidWidth(String),

    /// The link speed identifier is not recognized.
    #[error("Invalid link speed '{0}'; expected 1.67G, 2.7G, 5.4G or 8.1G")]
    InvalidSpeed(String),

    /// The error report cap could not be parsed.
    #[error("Invalid error report cap '{0}'")]
    InvalidErrorCap(String),
}

/// Errors that abort the processing of a single state inside a checker.
///
/// The harness converts these into a "Processing Error" message and continues
/// with the next state, so they never reach the caller of
/// [`CheckerRun::process_state`](crate::harness::CheckerRun::process_state).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckerError {
    /// A state field could not be read.
    #[error("{0}")]
    Field(#[from] FieldError),

    /// The checker's configuration is unusable.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Unexpected internal logic error, likely a bug in dplinkcheck.
    #[error("Internal logic error: {0}")]
    Internal(String),
}

/// Main error type for dplinkcheck operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DpCheckError {
    /// Field extraction failed.
    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    /// Configuration was rejected.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A checker failed outside of per-state processing.
    #[error("Checker error: {0}")]
    Checker(#[from] CheckerError),

    /// A checker of this kind is already registered with the engine.
    #[error("Checker '{0}' is already registered")]
    AlreadyRegistered(String),

    /// No checker matches the requested test group and number.
    #[error("Unknown test {number} in the {group} group")]
    UnknownTest { group: String, number: u32 },
}
