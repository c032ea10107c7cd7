//! Error types for the HDFS file storage adapter

use thiserror::Error;

/// Result type alias using the storage Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the storage adapter
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Missing required setting: {setting}")]
    MissingSetting { setting: String },

    // Name and path errors
    #[error("Suspicious operation: {name} resolves outside of {root}")]
    SuspiciousOperation { name: String, root: String },

    #[error("The name argument is not allowed to be empty")]
    EmptyName,

    #[error("Cannot fit an available name for {name} in {max_length} characters")]
    NameTooLong { name: String, max_length: usize },

    #[error("This file is not accessible via a URL")]
    NoBaseUrl,

    // Remote filesystem errors
    #[error("Remote {operation} failed for {path}: {message}")]
    Remote {
        operation: String,
        path: String,
        message: String,
    },

    #[error("Remote path not found: {path}")]
    RemotePathNotFound { path: String },

    #[error("Invalid timestamp {timestamp} reported for {path}")]
    InvalidTimestamp { path: String, timestamp: i64 },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns true if the adapter instance cannot be used after this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfig { .. } | Error::MissingSetting { .. }
        )
    }

    /// Returns true if the error was rejected locally before reaching the
    /// remote filesystem
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::SuspiciousOperation { .. }
                | Error::EmptyName
                | Error::NameTooLong { .. }
                | Error::NoBaseUrl
        )
    }

    /// Returns true if the error came from the remote filesystem client
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Remote { .. } | Error::RemotePathNotFound { .. } | Error::Io(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
