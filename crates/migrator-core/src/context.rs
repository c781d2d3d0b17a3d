//! Write-once store threading shared state between pipeline stages.
//!
//! Values are addressed either by a typed [`ContextKey`] constant or by
//! their own type. A key may be set at most once per run, and reading a
//! key before it was set is an error rather than a silent default.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::error::{AppError, ErrorKind};
use crate::result::AppResult;

/// Typed name of a context entry.
///
/// Keys are declared once as constants so that every stage reading or
/// writing an entry agrees on both its name and its type.
pub struct ContextKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    /// Declare a key with the given name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The key's name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextKey<T> {}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextKey({})", self.name)
    }
}

/// Shared state of a single migration run.
///
/// The context only stores values; whatever it holds is owned by the
/// stage that constructed it. Values are handed out by clone, so large or
/// shared objects are stored behind an `Arc`.
#[derive(Default)]
pub struct ExecutionContext {
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl ExecutionContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under an explicit key.
    pub fn set<T: Send + Sync + 'static>(&mut self, key: ContextKey<T>, value: T) -> AppResult<()> {
        self.insert(key.name().to_string(), value)
    }

    /// Read a value stored under an explicit key.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, key: ContextKey<T>) -> AppResult<T> {
        self.lookup(key.name())
    }

    /// Store a value keyed by its own type.
    pub fn set_instance<T: Send + Sync + 'static>(&mut self, value: T) -> AppResult<()> {
        self.insert(type_name::<T>().to_string(), value)
    }

    /// Read a value keyed by its own type.
    pub fn instance<T: Clone + Send + Sync + 'static>(&self) -> AppResult<T> {
        self.lookup(type_name::<T>())
    }

    /// Whether a value is stored under the key.
    pub fn contains<T>(&self, key: ContextKey<T>) -> bool {
        self.values.contains_key(key.name())
    }

    /// Names of all stored entries, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    fn insert<T: Send + Sync + 'static>(&mut self, name: String, value: T) -> AppResult<()> {
        if self.values.contains_key(&name) {
            return Err(AppError::new(
                ErrorKind::DuplicateKey,
                format!("The instance of {name} is already set."),
            ));
        }

        self.values.insert(name, Box::new(value));
        Ok(())
    }

    fn lookup<T: Clone + Send + Sync + 'static>(&self, name: &str) -> AppResult<T> {
        let value = self.values.get(name).ok_or_else(|| {
            AppError::new(
                ErrorKind::KeyNotFound,
                format!("The instance of {name} is not set."),
            )
        })?;

        value.downcast_ref::<T>().cloned().ok_or_else(|| {
            AppError::internal(format!(
                "The instance of {name} is not a {}.",
                type_name::<T>()
            ))
        })
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("keys", &self.keys())
            .finish()
    }
}
