//! Console interaction trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Concise, human-facing progress output and prompts.
///
/// Detailed diagnostics go to the log, not through this trait.
#[async_trait]
pub trait UserInteraction: Send + Sync + std::fmt::Debug {
    /// Informational message.
    fn info(&self, message: &str);

    /// Warning message.
    fn warn(&self, message: &str);

    /// Ongoing-activity message, replaced by the next notification.
    fn spinner(&self, message: &str);

    /// Success message.
    fn succeed(&self, message: &str);

    /// Failure message.
    fn fail(&self, message: &str);

    /// Ask the user a question and return the raw answer.
    async fn prompt(&self, message: &str) -> AppResult<String>;
}
