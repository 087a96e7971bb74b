//! Error types for the `rar:unrar` function.
//!
//! This module provides the [`Error`] type which covers every way a call to
//! [`UnrarFunction::eval`] can fail. Conditions that only skip an entry
//! (per-entry encryption, filter rejection) or fall back to another
//! representation (markup decoding) are not errors and never show up here.
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | Usage | [`MissingFunction`], [`InvalidArity`], [`PermissionDenied`] | Raised before the archive is opened |
//! | Archive | [`Archive`] | Open, header, or extraction failure in the archive library |
//! | Callback | [`Callback`], [`InvalidTargetPath`] | A user function failed or returned an unusable path |
//! | Store | [`Store`], [`Io`] | The document store rejected a write |
//! | Config | [`Config`] | Module configuration could not be loaded |
//!
//! ## Example
//!
//! ```rust,ignore
//! use xmldb_rar::Error;
//!
//! match function.eval(call, &mut ctx) {
//!     Ok(results) => println!("{} item(s)", results.len()),
//!     Err(Error::PermissionDenied { user }) => eprintln!("{user} is not a DBA"),
//!     Err(e) if e.is_archive_error() => eprintln!("bad archive: {e}"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! ```
//!
//! [`UnrarFunction::eval`]: crate::UnrarFunction::eval
//! [`MissingFunction`]: Error::MissingFunction
//! [`InvalidArity`]: Error::InvalidArity
//! [`PermissionDenied`]: Error::PermissionDenied
//! [`Archive`]: Error::Archive
//! [`Callback`]: Error::Callback
//! [`InvalidTargetPath`]: Error::InvalidTargetPath
//! [`Store`]: Error::Store
//! [`Io`]: Error::Io
//! [`Config`]: Error::Config

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed error coming out of a collaborator (archive library, store backend).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The archive operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOperation {
    Open,
    ReadHeader,
    Extract,
}

impl fmt::Display for ArchiveOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::ReadHeader => "read entry header of",
            Self::Extract => "extract entry from",
        };
        f.write_str(name)
    }
}

/// Error type for `rar:unrar` calls.
#[derive(Debug, Error)]
pub enum Error {
    /// A required callback argument was not supplied.
    ///
    /// `parameter` is the signature name of the argument, `entry-filter` or
    /// `entry-data`.
    #[error("No {parameter} function provided.")]
    MissingFunction { parameter: &'static str },

    /// A callback declares fewer parameters than the call shape needs.
    #[error("{parameter} function must take at least {required} arguments, it takes {arity}")]
    InvalidArity {
        parameter: &'static str,
        arity: usize,
        required: usize,
    },

    /// The calling user does not hold the administrative role.
    #[error("Permission denied, calling user '{user}' must be a DBA to call this function.")]
    PermissionDenied { user: String },

    /// The archive library failed. The archive handle, if one was opened, has
    /// still been closed.
    #[error("failed to {operation} archive {}: {source}", path.display())]
    Archive {
        operation: ArchiveOperation,
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// A user-supplied function raised an error.
    #[error("call to {function} failed: {message}")]
    Callback { function: String, message: String },

    /// The path-returning store function produced a path that cannot be
    /// mapped into the store.
    #[error("invalid target path '{path}': {reason}")]
    InvalidTargetPath { path: String, reason: &'static str },

    /// The document store rejected an operation.
    #[error("store error: {0}")]
    Store(String),

    /// Filesystem failure in a store backend.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Module configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Wrap a collaborator failure from the archive library.
    pub fn archive(
        operation: ArchiveOperation,
        path: impl Into<PathBuf>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Archive {
            operation,
            path: path.into(),
            source: source.into(),
        }
    }

    /// Error raised from inside a user function.
    pub fn callback(function: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Callback {
            function: function.into(),
            message: message.to_string(),
        }
    }

    /// Usage errors fail fast, before any archive I/O.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::MissingFunction { .. } | Self::InvalidArity { .. } | Self::PermissionDenied { .. }
        )
    }

    pub fn is_archive_error(&self) -> bool {
        matches!(self, Self::Archive { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_error_message() {
        let err = Error::archive(
            ArchiveOperation::Extract,
            "/tmp/data.rar",
            io::Error::new(io::ErrorKind::InvalidData, "bad data"),
        );
        assert_eq!(
            err.to_string(),
            "failed to extract entry from archive /tmp/data.rar: bad data"
        );
        assert!(err.is_archive_error());
        assert!(!err.is_usage_error());
    }

    #[test]
    fn test_usage_errors() {
        let missing = Error::MissingFunction {
            parameter: "entry-filter",
        };
        assert_eq!(missing.to_string(), "No entry-filter function provided.");
        assert!(missing.is_usage_error());

        let denied = Error::PermissionDenied {
            user: "guest".to_string(),
        };
        assert!(denied.is_usage_error());
        assert!(denied.to_string().contains("'guest'"));
    }

    #[test]
    fn test_source_is_kept() {
        use std::error::Error as _;

        let err = Error::archive(
            ArchiveOperation::Open,
            "a.rar",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.source().is_some());
    }
}
