//! core/error.rs
//! One error type for the whole conversion pipeline.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing/invalid path or wrong extension. Nothing was touched.
    #[error("{0}")]
    Validation(String),

    /// Unparseable time string or marker table without a usable header.
    #[error("{0}")]
    Format(String),

    /// Malformed table-of-contents bytes on read.
    #[error("malformed CTOC frame: {0}")]
    Parse(String),

    #[error("no CTOC frame found")]
    NoTableOfContents,

    /// The CTOC child count is a single byte.
    #[error("too many chapters for one table of contents: {0} (maximum is 255)")]
    TooManyChildren(usize),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("{context} '{path}': {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("tag error on '{path}': {source}")]
    Tag { path: PathBuf, source: id3::Error },

    #[error("failed to read marker file '{path}': {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

impl Error {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            context,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn tag(path: impl Into<PathBuf>, source: id3::Error) -> Self {
        Error::Tag {
            path: path.into(),
            source,
        }
    }

    /// True when the user declined a confirmation prompt.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
