/*!
 * Error types for the ttml2srt application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that abort the conversion of a single TTML document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Frame based expressions (`f` unit or `HH:MM:SS:FF` clock values)
    #[error("unsupported: frame-based time expressions ({0})")]
    UnsupportedTimeUnit(String),

    /// Tick expression in a document that declares no `tickRate`
    #[error("unsupported: tick expression without declared tick rate ({0})")]
    MissingTickRate(String),

    /// A `begin`/`end`/`dur` value that matches no known grammar
    #[error("invalid time expression: {0}")]
    InvalidTimeExpression(String),

    /// The root `tickRate` attribute is not a positive integer
    #[error("invalid tickRate: {0}")]
    InvalidTickRate(String),

    /// The input is not well-formed XML
    #[error("XML error: {0}")]
    Xml(String),

    /// The document root has no `<body>` child
    #[error("document has no <body> element")]
    MissingBody,
}

impl From<quick_xml::Error> for ConversionError {
    fn from(error: quick_xml::Error) -> Self {
        Self::Xml(error.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ConversionError {
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from converting a document
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Some inputs of a batch could not be converted
    #[error("{failed} of {total} inputs failed to convert")]
    Batch {
        /// Number of failed inputs
        failed: usize,
        /// Number of inputs in the batch
        total: usize,
    },

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
