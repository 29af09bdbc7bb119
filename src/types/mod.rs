use serde::{Deserialize, Serialize};

use crate::types::error::ArchiverError;

pub mod error;
pub mod event;
pub mod token;

/// A log file that still needs to be exported.
///
/// Produced by discovery and consumed, one record at a time, by the transfer
/// function. Serialized with the field names the workflow passes along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFile {
    #[serde(rename = "DbInstanceIdentifier")]
    instance_id: String,
    #[serde(rename = "LogDestinationBucket")]
    destination_bucket: String,
    #[serde(rename = "LastWritten")]
    last_written: i64,
    #[serde(rename = "LogFileName")]
    file_name: String,
    #[serde(rename = "ObjectKey")]
    object_key: String,
}

impl LogFile {
    pub fn new(
        instance_id: &str,
        destination_bucket: &str,
        last_written: i64,
        file_name: &str,
        object_key: &str,
    ) -> Result<Self, ArchiverError> {
        require_non_empty(instance_id, "DbInstanceIdentifier")?;
        require_non_empty(destination_bucket, "LogDestinationBucket")?;
        require_non_zero(last_written, "LastWritten")?;
        require_non_empty(file_name, "LogFileName")?;
        require_non_empty(object_key, "ObjectKey")?;

        Ok(Self {
            instance_id: instance_id.to_string(),
            destination_bucket: destination_bucket.to_string(),
            last_written,
            file_name: file_name.to_string(),
            object_key: object_key.to_string(),
        })
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn destination_bucket(&self) -> &str {
        &self.destination_bucket
    }

    pub fn last_written(&self) -> i64 {
        self.last_written
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn object_key(&self) -> &str {
        &self.object_key
    }
}

/// One entry of an instance's log file listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdsLogFile {
    pub instance_id: String,
    pub file_name: String,
    /// Epoch milliseconds.
    pub last_written: i64,
    pub size: i64,
}

pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<(), ArchiverError> {
    if value.is_empty() {
        return Err(ArchiverError::InvalidConfig(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn require_non_zero(value: i64, field: &str) -> Result<(), ArchiverError> {
    if value == 0 {
        return Err(ArchiverError::InvalidConfig(format!("{field} is required")));
    }
    Ok(())
}
