//! Log file download with constant-delay retries.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use dyn_clone::DynClone;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{error, info, warn};

use crate::config::DownloadConfig;
use crate::types::error::is_stream_interrupted_error;

pub mod http_source;
pub mod signer;

pub use http_source::SignedHttpSource;
pub use signer::{RequestSigner, SigV4Signer};

/// Where log file bytes come from.
#[async_trait]
pub trait LogFileSource: DynClone {
    /// Streams the whole file into `writer` and returns the number of bytes
    /// written. An interrupted body is reported as
    /// [`ArchiverError::StreamInterrupted`](crate::types::error::ArchiverError).
    async fn fetch(
        &self,
        instance_id: &str,
        file_name: &str,
        writer: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64>;
}

dyn_clone::clone_trait_object!(LogFileSource);

pub struct LogFileDownloader {
    source: Box<dyn LogFileSource + Send + Sync>,
    config: DownloadConfig,
}

impl LogFileDownloader {
    pub fn new(source: Box<dyn LogFileSource + Send + Sync>, config: DownloadConfig) -> Self {
        Self { source, config }
    }

    /// Downloads into `output_path`, retrying up to `config.retries` attempts.
    ///
    /// Any byte count, including zero, is success. After the last failed
    /// attempt the output file is truncated and `false` is returned.
    pub async fn download(&self, instance_id: &str, file_name: &str, output_path: &Path) -> bool {
        let retries = self.config.retries;

        for attempt in 1..=retries {
            match self.try_download(instance_id, file_name, output_path).await {
                Ok(bytes) => {
                    info!(
                        instance_id = instance_id,
                        file_name = file_name,
                        bytes = bytes,
                        attempt = attempt,
                        "log file downloaded."
                    );
                    return true;
                }
                Err(e) => {
                    if is_stream_interrupted_error(&e) {
                        warn!(
                            instance_id = instance_id,
                            file_name = file_name,
                            attempt = attempt,
                            max_attempts = retries,
                            "log file stream interrupted: {e:#}"
                        );
                    } else {
                        error!(
                            instance_id = instance_id,
                            file_name = file_name,
                            attempt = attempt,
                            max_attempts = retries,
                            "log file download failed: {e:#}"
                        );
                    }

                    if attempt < retries {
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        if let Err(e) = tokio::fs::File::create(output_path).await {
            warn!(
                path = %output_path.display(),
                "failed to truncate partial download: {e}"
            );
        }

        error!(
            instance_id = instance_id,
            file_name = file_name,
            attempts = retries,
            "all download attempts failed."
        );

        false
    }

    async fn try_download(
        &self,
        instance_id: &str,
        file_name: &str,
        output_path: &Path,
    ) -> Result<u64> {
        // Each attempt starts from an empty file.
        let file = tokio::fs::File::create(output_path)
            .await
            .with_context(|| format!("Failed to create {}", output_path.display()))?;
        let mut writer = BufWriter::with_capacity(self.config.chunk_size.max(1), file);

        let bytes = self
            .source
            .fetch(instance_id, file_name, &mut writer)
            .await?;
        writer
            .flush()
            .await
            .with_context(|| format!("Failed to flush {}", output_path.display()))?;

        Ok(bytes)
    }
}
