//! Streams a log file from the RDS `downloadCompleteLogFile` endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::downloader::LogFileSource;
use crate::downloader::signer::RequestSigner;
use crate::types::error::ArchiverError;

const LOG_DOWNLOAD_PATH: &str = "v13/downloadCompleteLogFile";

pub fn rds_endpoint(region: &str) -> String {
    format!("https://rds.{region}.amazonaws.com")
}

/// `{endpoint}/v13/downloadCompleteLogFile/{instance_id}/{file_name}`.
///
/// The file name keeps its directory part (`error/...`) unescaped.
pub fn log_download_url(endpoint: &str, instance_id: &str, file_name: &str) -> String {
    format!(
        "{}/{LOG_DOWNLOAD_PATH}/{instance_id}/{file_name}",
        endpoint.trim_end_matches('/')
    )
}

#[derive(Clone)]
pub struct SignedHttpSource {
    http_client: reqwest::Client,
    signer: Box<dyn RequestSigner + Send + Sync>,
    endpoint: String,
}

impl SignedHttpSource {
    pub fn new(signer: Box<dyn RequestSigner + Send + Sync>, region: &str) -> Self {
        Self::with_endpoint(signer, &rds_endpoint(region))
    }

    pub fn with_endpoint(signer: Box<dyn RequestSigner + Send + Sync>, endpoint: &str) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            signer,
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl LogFileSource for SignedHttpSource {
    async fn fetch(
        &self,
        instance_id: &str,
        file_name: &str,
        writer: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64> {
        let url = log_download_url(&self.endpoint, instance_id, file_name);

        let mut request = self.http_client.get(&url);
        for (name, value) in self.signer.sign_get(&url).await? {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .context("reqwest::RequestBuilder::send() failed.")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "log download endpoint returned {status} for {instance_id}/{file_name}: {body}"
            );
        }

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                anyhow::anyhow!(ArchiverError::StreamInterrupted(format!(
                    "{e} after {written} bytes"
                )))
            })?;
            writer
                .write_all(&chunk)
                .await
                .context("failed to write log file chunk.")?;
            written += chunk.len() as u64;
        }

        writer.flush().await.context("failed to flush log file.")?;

        Ok(written)
    }
}
