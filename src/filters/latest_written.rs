//! Latest-written exclusion filter.
//!
//! The file with the newest `last_written` timestamp is the one the database
//! is still appending to. Every file sharing that maximum is dropped; ties
//! are all dropped.

use tracing::debug;

use crate::filters::LogFileFilter;
use crate::types::RdsLogFile;

const FILTER_NAME: &str = "LatestWrittenFilter";

#[derive(Default)]
pub struct LatestWrittenFilter;

impl LatestWrittenFilter {
    pub fn new() -> Self {
        Self
    }
}

impl LogFileFilter for LatestWrittenFilter {
    fn name(&self) -> &'static str {
        FILTER_NAME
    }

    fn apply(&self, files: Vec<RdsLogFile>) -> Vec<RdsLogFile> {
        let Some(latest) = files.iter().map(|f| f.last_written).max() else {
            return files;
        };

        files
            .into_iter()
            .filter(|file| is_not_latest(file, latest))
            .collect()
    }
}

fn is_not_latest(file: &RdsLogFile, latest: i64) -> bool {
    if file.last_written == latest {
        debug!(
            name = FILTER_NAME,
            instance_id = file.instance_id,
            file_name = file.file_name,
            last_written = file.last_written,
            "log file filtered."
        );
        return false;
    }

    true
}
