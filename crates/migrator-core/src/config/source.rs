//! Source storage configuration.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Selects the source adapter and carries its options.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SourceConfig {
    /// Name of the registered source adapter (e.g. `"local"`).
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "adapter type must not be empty"))]
    pub adapter_type: String,
    /// Adapter-specific options, validated by the adapter itself.
    #[validate(custom(function = "validate_options_object"))]
    pub options: serde_json::Value,
}

fn validate_options_object(options: &serde_json::Value) -> Result<(), ValidationError> {
    if options.is_object() {
        Ok(())
    } else {
        let mut error = ValidationError::new("object");
        error.message = Some("source options must be an object".into());
        Err(error)
    }
}
