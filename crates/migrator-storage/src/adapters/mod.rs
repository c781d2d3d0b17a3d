//! Source storage adapter implementations.

pub mod local;

pub use local::LocalSourceAdapter;
