//! Convenience result type alias for the migrator.

use crate::error::AppError;

/// A specialized `Result` type for migrator operations.
pub type AppResult<T> = Result<T, AppError>;
