//! Destination asset service configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Connection settings for the destination asset service.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DestinationConfig {
    /// Base URL of the destination service API.
    #[validate(url(message = "service origin must be a valid URL"))]
    pub service_origin: String,
    /// Access token sent verbatim in the `Authorization` header.
    #[validate(length(min = 1, message = "access token must not be empty"))]
    pub access_token: String,
    /// Optional workspace the migrated assets are created in.
    #[serde(default)]
    #[validate(length(equal = 20, message = "workspace id must be 20 characters long"))]
    pub workspace_id: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 3600))]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    60
}
