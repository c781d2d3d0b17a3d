//! Terminal output and prompts.

use async_trait::async_trait;

use migrator_core::error::AppError;
use migrator_core::result::AppResult;
use migrator_core::traits::UserInteraction;

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print an informational message
pub fn print_info(msg: &str) {
    println!("ℹ {}", msg);
}

/// Print a progress message
pub fn print_progress(msg: &str) {
    println!("… {}", msg);
}

/// [`UserInteraction`] writing to the terminal and prompting via `dialoguer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalInteraction;

impl TerminalInteraction {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UserInteraction for TerminalInteraction {
    fn info(&self, message: &str) {
        print_info(message);
    }

    fn warn(&self, message: &str) {
        print_warning(message);
    }

    fn spinner(&self, message: &str) {
        print_progress(message);
    }

    fn succeed(&self, message: &str) {
        print_success(message);
    }

    fn fail(&self, message: &str) {
        print_error(message);
    }

    async fn prompt(&self, message: &str) -> AppResult<String> {
        let prompt = message.trim_end().to_string();
        tokio::task::spawn_blocking(move || {
            dialoguer::Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| AppError::internal(format!("Input error: {}", e)))
        })
        .await
        .map_err(|e| AppError::internal(format!("Prompt task failed: {}", e)))?
    }
}
