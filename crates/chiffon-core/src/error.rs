//! Error type for registry operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by registry validation, formats, and storage.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A required text field was empty.
    #[error("empty {field}")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A text field contained a line break. The agent feed format is
    /// line-oriented, so embedded line breaks would corrupt it.
    #[error("{field} contains a line break")]
    EmbeddedLineBreak {
        /// Name of the offending field.
        field: &'static str,
    },

    /// An install path was not absolute.
    #[error("install path is not absolute: {path}")]
    RelativePath {
        /// The rejected path.
        path: PathBuf,
    },

    /// An install path was not valid UTF-8 and cannot be keyed or encoded.
    #[error("install path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// The rejected path.
        path: PathBuf,
    },

    /// A snapshot did not start with the expected magic bytes.
    #[error("bad snapshot magic")]
    BadMagic,

    /// A snapshot header carried an unknown format version.
    #[error("unsupported snapshot format version {0}")]
    UnsupportedFormatVersion(u16),

    /// A snapshot was shorter than its fixed header.
    #[error("truncated snapshot header")]
    TruncatedHeader,

    /// A database carried an unknown schema version.
    #[error("unsupported registry schema version {0}")]
    UnsupportedSchema(u64),

    /// Binary payload encoding or decoding failed.
    #[error("snapshot payload error: {0}")]
    Codec(#[from] postcard::Error),

    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Database open failure.
    #[error(transparent)]
    Database(#[from] redb::DatabaseError),

    /// Database transaction failure.
    #[error(transparent)]
    Transaction(#[from] redb::TransactionError),

    /// Database table failure.
    #[error(transparent)]
    Table(#[from] redb::TableError),

    /// Database read/write failure.
    #[error(transparent)]
    Storage(#[from] redb::StorageError),

    /// Database commit failure.
    #[error(transparent)]
    Commit(#[from] redb::CommitError),
}
