pub mod engine;
pub mod runtime;

// Re-export the runtime functions so frontends can simply do:
pub use runtime::{run_monitor_mode, run_simulation_mode, RunOptions, RunSummary};
