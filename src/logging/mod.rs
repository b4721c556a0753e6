//! Logging infrastructure for structured console and file output.

mod logger;
mod memory;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use memory::MemoryLog;
pub use subscriber::{ConsoleTarget, init_subscriber};
pub use types::Log;

/// Tracing target for stage headers.
pub(crate) const STAGE_TARGET: &str = "stack_starter::stage";

/// Tracing target for dry-run previews.
pub(crate) const DRY_RUN_TARGET: &str = "stack_starter::dry_run";
