//! # migrator-core
//!
//! Core crate for the asset migrator. Contains the capability traits the
//! migration engine consumes, configuration schemas, the source and
//! destination data model, the execution context shared between pipeline
//! stages, and the unified error system.
//!
//! This crate has **no** internal dependencies on other migrator crates.

pub mod config;
pub mod context;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use context::{ContextKey, ExecutionContext};
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
