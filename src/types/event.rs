//! Lambda trigger payloads and responses.
//!
//! Fields are optional on the wire so that a missing value is reported as an
//! [`ArchiverError::InvalidConfig`](crate::types::error::ArchiverError) naming
//! the field, not as a serde error.

use serde::{Deserialize, Serialize};

/// Payload that starts a discovery run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiscoveryEvent {
    #[serde(rename = "DbClusterIdentifier")]
    pub db_cluster_identifier: Option<String>,
    #[serde(rename = "LogDestinationBucket")]
    pub log_destination_bucket: Option<String>,
    #[serde(rename = "LogRangeMinutes")]
    pub log_range_minutes: Option<i64>,
}

/// Payload that starts one transfer. Matches the records discovery returns.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransferEvent {
    #[serde(rename = "DbInstanceIdentifier")]
    pub db_instance_identifier: Option<String>,
    #[serde(rename = "LogFileName")]
    pub log_file_name: Option<String>,
    #[serde(rename = "LogDestinationBucket")]
    pub log_destination_bucket: Option<String>,
    #[serde(rename = "LastWritten")]
    pub last_written: Option<i64>,
    #[serde(rename = "ObjectKey")]
    pub object_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: TransferResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferResponseBody {
    pub message: String,
    pub db_instance: String,
    pub log_file: String,
    pub object_key: String,
    pub last_written: i64,
}
