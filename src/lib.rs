/*!
# Overview
aurora-log-archiver exports Aurora PostgreSQL log files to Amazon S3.

It ships as two AWS Lambda functions:
- **log-file-filter** lists the hourly `postgresql.log.YYYY-MM-DD-HHMM` files of
  every cluster member, drops the file still being written and the files
  already exported, and returns the rest.
- **log-uploader** downloads one of those files from the RDS
  `downloadCompleteLogFile` endpoint with a SigV4-signed request, optionally
  gzips it, and uploads it with metadata (multipart above 8 MiB).

Both binaries are thin wrappers over this library.

Example usage
=============

```no_run
use aurora_log_archiver::config::env::ProcessEnv;
use aurora_log_archiver::handler::discovery_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let payload = serde_json::json!({
        "DbClusterIdentifier": "database-1",
        "LogDestinationBucket": "log-bucket",
        "LogRangeMinutes": 60,
    });

    for log_file in discovery_handler(payload, &ProcessEnv).await? {
        println!("{}", log_file.object_key());
    }
    Ok(())
}
```
*/

pub mod client_builder;
pub mod compressor;
pub mod config;
pub mod discovery;
pub mod downloader;
pub mod filters;
pub mod handler;
pub mod object_key;
pub mod rds;
pub mod storage;
pub mod tracing_init;
pub mod transfer;
pub mod types;
pub mod uploader;

#[cfg(test)]
mod property_tests;
#[cfg(test)]
pub(crate) mod test_utils;

pub use discovery::LogFileDiscoverer;
pub use transfer::LogFileTransfer;
pub use types::LogFile;
pub use types::error::{ArchiverError, exit_code_from_error};
