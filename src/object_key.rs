//! Destination key layout.
//!
//! `{cluster}/{instance}/raw/{yyyy}/{mm}/{dd}/{hh}/postgresql.log.{date_part}`
//! with `.gz` appended when compression is enabled. The hour partition comes
//! from the timestamp embedded in the file name, not from `LastWritten`.

use chrono::NaiveDateTime;
use tracing::warn;

const FILE_NAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H%M";
const PARTITION_FORMAT: &str = "%Y/%m/%d/%H";

pub const COMPRESSED_SUFFIX: &str = ".gz";

/// Returns `None` (after logging a warning) when the file name does not end in
/// a `YYYY-MM-DD-HHMM` timestamp.
///
/// ```
/// use aurora_log_archiver::object_key::generate_object_key;
///
/// let key = generate_object_key(
///     "database-1",
///     "db-instance-1",
///     "error/postgresql.log.2024-01-01-0000",
///     false,
/// );
/// assert_eq!(
///     key.as_deref(),
///     Some("database-1/db-instance-1/raw/2024/01/01/00/postgresql.log.2024-01-01-0000")
/// );
/// ```
pub fn generate_object_key(
    cluster_id: &str,
    instance_id: &str,
    file_name: &str,
    compression_enabled: bool,
) -> Option<String> {
    let date_part = file_name.rsplit('.').next().unwrap_or_default();

    let timestamp = match NaiveDateTime::parse_from_str(date_part, FILE_NAME_TIMESTAMP_FORMAT) {
        Ok(timestamp) => timestamp,
        Err(e) => {
            warn!(
                instance_id = instance_id,
                file_name = file_name,
                error = e.to_string(),
                "failed to parse timestamp from log file name. skipping."
            );
            return None;
        }
    };

    let mut key = format!(
        "{cluster_id}/{instance_id}/raw/{}/postgresql.log.{date_part}",
        timestamp.format(PARTITION_FORMAT)
    );
    if compression_enabled {
        key.push_str(COMPRESSED_SUFFIX);
    }

    Some(key)
}
