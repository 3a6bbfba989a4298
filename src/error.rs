//! Error types for MARCXML operations.
//!
//! This module provides the [`MxError`] type for all library operations
//! and the [`Result`] convenience type.
//!
//! An occurrence index outside the bounds of a record is not an error: the
//! query functions in [`crate::locator`] return `None` for it.

use thiserror::Error;

/// Error type for all MARCXML library operations.
#[derive(Error, Debug)]
pub enum MxError {
    /// The input could not be parsed into a document tree.
    #[error("Failed to parse XML: {0}")]
    Parse(String),

    /// The document parsed but did not match the schema.
    #[error("XML did not match schema: {0}")]
    SchemaMismatch(String),

    /// The schema file could not be read or understood.
    #[error("Failed to load schema: {0}")]
    SchemaLoad(String),

    /// A record query was given an element that is not a `record`.
    #[error("Expected a record element, found <{0}>")]
    NotARecord(String),

    /// A collection operation was given a root that is not a `collection`.
    #[error("Invalid root element <{0}>, expected <collection>")]
    InvalidRoot(String),

    /// A record selection pattern did not have the `<field>=<regex>` shape.
    #[error("Incorrect match pattern {0:?}, expected <field>=<regex> with field one of a, t, p")]
    InvalidSelector(String),

    /// A regular expression failed to compile.
    #[error("Regex compilation failed: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// An argument did not satisfy an operation's precondition.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error raised by the XML tokenizer.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`MxError`].
pub type Result<T> = std::result::Result<T, MxError>;
