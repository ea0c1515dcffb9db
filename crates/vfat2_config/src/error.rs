//! Error types for document parse and write operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::schema::DocumentKind;

/// Errors that can occur while parsing or writing a configuration document.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document tree does not match the expected schema.
    #[error("{document} document schema error: {message}")]
    Schema {
        document: DocumentKind,
        message: String,
    },

    /// A register name (or identifier) has no translation.
    #[error("{document} document references unknown setting '{name}'")]
    UnknownSetting { document: DocumentKind, name: String },

    /// The bytes could not be turned into a node tree at all.
    #[error("Malformed XML in {}: {message}", path.display())]
    MalformedDocument { path: PathBuf, message: String },
}

impl ConfigError {
    /// Build a schema error for the given document.
    pub fn schema(document: DocumentKind, message: impl Into<String>) -> Self {
        Self::Schema {
            document,
            message: message.into(),
        }
    }

    /// Build an unknown-setting error carrying the raw name.
    pub fn unknown_setting(document: DocumentKind, name: impl Into<String>) -> Self {
        Self::UnknownSetting {
            document,
            name: name.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for document operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_setting_message_carries_name() {
        let err = ConfigError::unknown_setting(DocumentKind::Global, "VThreshold9");
        assert_eq!(
            err.to_string(),
            "Global document references unknown setting 'VThreshold9'"
        );
    }

    #[test]
    fn io_message_includes_path() {
        let err = ConfigError::io(
            "/tmp/missing.xml",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.to_string().contains("/tmp/missing.xml"));
    }
}
