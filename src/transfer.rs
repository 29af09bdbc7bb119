//! One download, compress and upload cycle.

use anyhow::Result;
use tempfile::NamedTempFile;
use tracing::info;

use crate::config::TransferConfig;
use crate::downloader::LogFileDownloader;
use crate::types::error::ArchiverError;
use crate::types::event::{TransferResponse, TransferResponseBody};
use crate::uploader::LogFileUploader;

pub const SUCCESS_MESSAGE: &str = "Successfully processed log file";

pub struct LogFileTransfer {
    downloader: LogFileDownloader,
    uploader: LogFileUploader,
}

impl LogFileTransfer {
    pub fn new(downloader: LogFileDownloader, uploader: LogFileUploader) -> Self {
        Self {
            downloader,
            uploader,
        }
    }

    /// The scratch file lives until this call returns, whatever the outcome.
    pub async fn transfer(&self, config: &TransferConfig) -> Result<TransferResponse> {
        let scratch = NamedTempFile::new().map_err(|e| {
            anyhow::anyhow!(ArchiverError::Io(format!(
                "failed to create temporary file: {e}"
            )))
        })?;
        let path = scratch.path();

        info!(
            instance_id = config.instance_id,
            file_name = config.file_name,
            key = config.object_key,
            "transferring log file."
        );

        if !self
            .downloader
            .download(&config.instance_id, &config.file_name, path)
            .await
        {
            return Err(anyhow::anyhow!(ArchiverError::Download(format!(
                "{}/{}",
                config.instance_id, config.file_name
            ))));
        }

        if !self
            .uploader
            .upload(
                path,
                &config.object_key,
                &config.instance_id,
                config.last_written,
            )
            .await
        {
            return Err(anyhow::anyhow!(ArchiverError::Upload(format!(
                "s3://{}/{}",
                config.destination_bucket, config.object_key
            ))));
        }

        Ok(TransferResponse {
            status_code: 200,
            body: TransferResponseBody {
                message: SUCCESS_MESSAGE.to_string(),
                db_instance: config.instance_id.clone(),
                log_file: config.file_name.clone(),
                object_key: config.object_key.clone(),
                last_written: config.last_written,
            },
        })
    }
}
