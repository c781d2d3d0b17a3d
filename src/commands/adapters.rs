//! Lists the registered source adapters.

use migrator_core::error::AppError;
use migrator_storage::AdapterFactory;

/// Print the name of every built-in source adapter
pub fn execute() -> Result<(), AppError> {
    println!("Available source adapters:");
    for name in AdapterFactory::with_defaults().names() {
        println!("  - {}", name);
    }
    Ok(())
}
