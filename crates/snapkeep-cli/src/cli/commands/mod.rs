//! CLI command handlers. Each command is in its own file for clarity.

mod cleanup;
mod clear;
mod completions;
mod history;
mod import;
mod log;
mod pin;
mod remove;

pub use cleanup::run_cleanup;
pub use clear::run_clear;
pub use completions::run_completions;
pub use history::run_history;
pub use import::run_import;
pub use log::run_log;
pub use pin::run_pin;
pub use remove::run_remove;
