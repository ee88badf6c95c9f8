//! CLI command modules

pub mod load;
pub mod query;
pub mod stats;
pub mod summary;

pub use load::LoadOptions;
pub use query::execute_query_command;
pub use stats::execute_stats_command;
pub use summary::{execute_monitor_command, execute_summary_command};
