#![forbid(unsafe_code)]

pub mod cli;
pub mod error;
pub mod script;

pub use cli::run_from_env;
pub use error::{ReplayError, Result};
pub use script::{IgnoredStep, MAX_SCRIPT_PAGES, PageLayout, ReplaySummary, Script, Step, replay};
