//! Optional compression followed by the S3 upload of one log file.

use std::path::Path;

use tracing::{error, info, warn};

use crate::compressor::compress_file;
use crate::config::CompressionConfig;
use crate::storage::{ObjectAttributes, Storage};

pub struct LogFileUploader {
    storage: Storage,
    compression: CompressionConfig,
}

impl LogFileUploader {
    pub fn new(storage: Storage, compression: CompressionConfig) -> Self {
        Self {
            storage,
            compression,
        }
    }

    /// Compresses `path` in place when enabled, then uploads it.
    ///
    /// Headers and the `Compressed` metadata flag follow whether compression
    /// actually happened; a failed compression uploads the plain file. Upload
    /// errors are logged and reported as `false`.
    pub async fn upload(
        &self,
        path: &Path,
        object_key: &str,
        instance_id: &str,
        last_written: i64,
    ) -> bool {
        let compressed = self.compress_if_enabled(path).await;
        let attributes = ObjectAttributes::for_log_file(instance_id, last_written, compressed);

        match self
            .storage
            .upload_file(object_key, path, &attributes)
            .await
        {
            Ok(()) => {
                info!(
                    bucket = self.storage.bucket(),
                    key = object_key,
                    instance_id = instance_id,
                    compressed = compressed,
                    "log file uploaded."
                );
                true
            }
            Err(e) => {
                error!(
                    bucket = self.storage.bucket(),
                    key = object_key,
                    instance_id = instance_id,
                    "failed to upload log file: {e:#}"
                );
                false
            }
        }
    }

    async fn compress_if_enabled(&self, path: &Path) -> bool {
        if !self.compression.enabled {
            return false;
        }

        match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.len() == 0 => return false,
            Ok(_) => {}
            Err(e) => {
                warn!(path = %path.display(), "failed to read log file metadata: {e}");
                return false;
            }
        }

        if !compress_file(path, &self.compression).await {
            warn!(
                path = %path.display(),
                "compression failed. uploading uncompressed log file."
            );
            return false;
        }

        true
    }
}
