//! Unified error types for the asset migrator.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire migrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Configuration failed to load or validate.
    Configuration,
    /// A verify-connection check against a remote service failed.
    Connection,
    /// A folder or asset references a category that was not migrated.
    UnresolvedCategory,
    /// An asset references a folder that was not migrated.
    UnresolvedFolder,
    /// Fetching from the source or uploading to the destination failed.
    Transfer,
    /// An execution context key was set twice.
    DuplicateKey,
    /// An execution context key was read before being set.
    KeyNotFound,
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A storage I/O error occurred.
    Storage,
    /// An external service returned an error.
    ExternalService,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Connection => write!(f, "CONNECTION"),
            Self::UnresolvedCategory => write!(f, "UNRESOLVED_CATEGORY"),
            Self::UnresolvedFolder => write!(f, "UNRESOLVED_FOLDER"),
            Self::Transfer => write!(f, "TRANSFER"),
            Self::DuplicateKey => write!(f, "DUPLICATE_KEY"),
            Self::KeyNotFound => write!(f, "KEY_NOT_FOUND"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Storage => write!(f, "STORAGE"),
            Self::ExternalService => write!(f, "EXTERNAL_SERVICE"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified error used throughout the migrator.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    /// Create an unresolved-category error for the given source category.
    pub fn unresolved_category(category_id: &str) -> Self {
        Self::new(
            ErrorKind::UnresolvedCategory,
            format!("Category \"{category_id}\" was not migrated."),
        )
    }

    /// Create an unresolved-folder error for the given source folder.
    pub fn unresolved_folder(category_id: &str, folder_id: &str) -> Self {
        Self::new(
            ErrorKind::UnresolvedFolder,
            format!("Folder \"{folder_id}\" of category \"{category_id}\" was not migrated."),
        )
    }

    /// Create a transfer error.
    pub fn transfer(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transfer, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create an external service error.
    pub fn external_service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns whether this error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let details = crate::config::format_validation_errors(&err);
        Self::with_source(
            ErrorKind::Configuration,
            format!("Invalid configuration:\n{details}"),
            err,
        )
    }
}
