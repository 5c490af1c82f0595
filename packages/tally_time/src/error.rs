use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when querying a timer or writing timing records.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller asked for the accumulated time of a category that was never started.
    #[error("unknown timer category: '{category}' has never been started on this timer")]
    UnknownCategory {
        /// The category that was requested.
        category: String,
    },

    /// Timing records could not be appended to the CSV file.
    #[error("failed to append timing records to '{}'", path.display())]
    Io {
        /// The file (or the directory that was to contain it) that could not be written.
        path: PathBuf,

        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// A specialized `Result` type for timer operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
