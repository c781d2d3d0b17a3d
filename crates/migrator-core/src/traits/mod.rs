//! Capability traits the migration engine consumes.
//!
//! Concrete implementations live in `migrator-storage` (source adapters),
//! `migrator-client` (destination service), `migrator-engine` (mapping
//! writer) and the CLI binary (terminal interaction).

pub mod destination;
pub mod interaction;
pub mod mapping;
pub mod storage;

pub use destination::{DestinationClient, DestinationClientFactory};
pub use interaction::UserInteraction;
pub use mapping::MappingSink;
pub use storage::{ByteStream, SourceStorageAdapter};
