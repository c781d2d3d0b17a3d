//! # migrator-client
//!
//! Client for the destination asset service. Creates categories, folders
//! and assets over HTTP on behalf of the migration engine.

pub mod factory;
pub mod http;

pub use factory::HttpClientFactory;
pub use http::HttpDestinationClient;
