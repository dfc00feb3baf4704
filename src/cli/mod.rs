//! CLI command implementations

mod context;
mod run;
pub mod style;

pub use context::RunSettings;
pub use run::{RunOptions, run_automerge};
