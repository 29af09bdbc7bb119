//! Log file filters applied by discovery.
//!
//! Each filter takes an instance's listing and returns the entries that pass,
//! preserving input order. Filters are chained in sequence with logical AND
//! semantics; [`apply_filters`] runs a chain.

use anyhow::Result;
use tracing::debug;

use crate::types::RdsLogFile;

mod filter_properties;
pub mod file_name_pattern;
pub mod latest_written;

pub use file_name_pattern::FileNamePatternFilter;
pub use latest_written::LatestWrittenFilter;

/// Trait implemented by all log file filters.
pub trait LogFileFilter: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, files: Vec<RdsLogFile>) -> Vec<RdsLogFile>;
}

/// The chain discovery uses: name pattern first, then the latest-written
/// exclusion over whatever matched.
pub fn default_filters() -> Result<Vec<Box<dyn LogFileFilter>>> {
    Ok(vec![
        Box::new(FileNamePatternFilter::new()?),
        Box::new(LatestWrittenFilter::new()),
    ])
}

pub fn apply_filters(
    filters: &[Box<dyn LogFileFilter>],
    files: Vec<RdsLogFile>,
) -> Vec<RdsLogFile> {
    filters.iter().fold(files, |files, filter| {
        let before = files.len();
        let passed = filter.apply(files);
        debug!(
            name = filter.name(),
            before = before,
            after = passed.len(),
            "filter has been completed."
        );
        passed
    })
}
