//! # migrator-storage
//!
//! Source storage adapters for the asset migrator and the factory that
//! resolves an adapter by its configured name.

pub mod adapters;
pub mod factory;

pub use factory::AdapterFactory;
