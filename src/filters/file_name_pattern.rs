//! Log file name pattern filter.
//!
//! Passes hourly PostgreSQL log files (`postgresql.log.YYYY-MM-DD-HHMM`) and
//! drops everything else the instance exposes (upgrade logs, trace files,
//! files with extra suffixes).

use anyhow::{Context, Result};
use fancy_regex::Regex;
use tracing::debug;

use crate::filters::LogFileFilter;
use crate::types::RdsLogFile;

pub const LOG_FILE_NAME_PATTERN: &str = r"postgresql\.log\.\d{4}-\d{2}-\d{2}-\d{4}$";

const FILTER_NAME: &str = "FileNamePatternFilter";

pub struct FileNamePatternFilter {
    pattern: Regex,
}

impl FileNamePatternFilter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(LOG_FILE_NAME_PATTERN)
                .context("invalid log file name pattern.")?,
        })
    }
}

impl LogFileFilter for FileNamePatternFilter {
    fn name(&self) -> &'static str {
        FILTER_NAME
    }

    fn apply(&self, files: Vec<RdsLogFile>) -> Vec<RdsLogFile> {
        files
            .into_iter()
            .filter(|file| is_match(&self.pattern, file))
            .collect()
    }
}

fn is_match(pattern: &Regex, file: &RdsLogFile) -> bool {
    // A regex runtime error (backtrack limit) counts as no match.
    let match_result = pattern.is_match(&file.file_name).unwrap_or(false);

    if !match_result {
        debug!(
            name = FILTER_NAME,
            instance_id = file.instance_id,
            file_name = file.file_name,
            pattern = pattern.as_str(),
            "log file filtered."
        );
    }

    match_result
}
