//! Shared data types exchanged between the engine and its collaborators.

pub mod destination;
pub mod source;

pub use destination::{DestinationLocation, NewAsset, NewCategory, NewFolder, UploadedAsset};
pub use source::{SourceAsset, SourceCategory, SourceFolder, SourceLocation, SourceStructure};
