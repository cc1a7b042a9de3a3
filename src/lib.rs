//! Tailwind CSS build dispatcher
//!
//! A Rust CLI tool that resolves a base directory, enumerates an ordered set
//! of source/destination stylesheet mappings, and invokes an external CSS
//! compiler process for each pair, reporting per-entry outcomes.

pub mod build;
pub mod cli;
pub mod error;

// Re-export commonly used types
pub use build::{
    BuildConfig, BuildReport, BuildStatistics, Dispatcher, MappingEntry, PathMapping, ToolCommand,
    ToolRunner,
};
pub use error::{BuildError, DispatchError, DispatchResult, ManifestError};

/// Dispatch every entry of a mapping with the given configuration. Status
/// lines are suppressed; per-entry failures are reported to stderr and
/// recorded in the returned report. Only pre-dispatch problems (e.g. an
/// unreadable directory entry) error.
pub fn run_mapping(mapping: &PathMapping, config: &BuildConfig) -> DispatchResult<BuildReport> {
    let entries = mapping.expand(&config.base_dir, config.recursive)?;
    let dispatcher = Dispatcher::new(config, true, false);
    Ok(dispatcher.dispatch(&entries))
}
