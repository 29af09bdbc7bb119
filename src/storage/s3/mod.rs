use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::UploadConfig;
use crate::storage::{ObjectAttributes, Storage, StorageTrait};
use crate::types::error::extract_sdk_error_details;

const HTTP_STATUS_NOT_FOUND: u16 = 404;

/// HeadObject has no error body, so a 404 may surface either as the modeled
/// `NotFound` or as an unmodeled error with a 404 status.
fn is_head_object_not_found(e: &SdkError<HeadObjectError, HttpResponse>) -> bool {
    if e.as_service_error().is_some_and(|se| se.is_not_found()) {
        return true;
    }

    e.raw_response()
        .is_some_and(|response| response.status().as_u16() == HTTP_STATUS_NOT_FOUND)
}

/// Part layout of a multipart upload: `(part_number, offset, length)`.
/// Part numbers start at 1.
pub(crate) fn plan_parts(file_size: u64, part_size: u64) -> Vec<(i32, u64, u64)> {
    let part_size = part_size.max(1);
    let total_parts = file_size.div_ceil(part_size);

    (0..total_parts)
        .map(|part_index| {
            let offset = part_index * part_size;
            let length = part_size.min(file_size - offset);
            ((part_index + 1) as i32, offset, length)
        })
        .collect()
}

#[derive(Clone)]
pub struct S3Storage {
    bucket: String,
    client: Arc<Client>,
    upload_config: UploadConfig,
}

impl S3Storage {
    pub fn new(client: Client, bucket: &str, upload_config: UploadConfig) -> Self {
        Self {
            bucket: bucket.to_string(),
            client: Arc::new(client),
            upload_config,
        }
    }

    pub fn boxed(client: Client, bucket: &str, upload_config: UploadConfig) -> Storage {
        Box::new(Self::new(client, bucket, upload_config))
    }

    async fn put_object(
        &self,
        key: &str,
        path: &Path,
        attributes: &ObjectAttributes,
    ) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(&attributes.content_type)
            .content_encoding(&attributes.content_encoding)
            .set_metadata(Some(attributes.metadata.clone()))
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                tracing::error!(
                    bucket = self.bucket,
                    key = key,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 PutObject API call failed for s3://{}/{}: {} ({}).",
                    self.bucket,
                    key,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow::anyhow!(e).context("aws_sdk_s3::client::put_object() failed.")
            })?;

        Ok(())
    }

    async fn multipart_upload(
        &self,
        key: &str,
        path: &Path,
        file_size: u64,
        attributes: &ObjectAttributes,
    ) -> Result<()> {
        let output = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(&attributes.content_type)
            .content_encoding(&attributes.content_encoding)
            .set_metadata(Some(attributes.metadata.clone()))
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                tracing::error!(
                    bucket = self.bucket,
                    key = key,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 CreateMultipartUpload API call failed for s3://{}/{}: {} ({}).",
                    self.bucket,
                    key,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow::anyhow!(e).context("aws_sdk_s3::client::create_multipart_upload() failed.")
            })?;

        let upload_id = output
            .upload_id()
            .context("CreateMultipartUpload response has no upload id.")?
            .to_string();

        tracing::debug!(
            bucket = self.bucket,
            key = key,
            upload_id = upload_id,
            file_size = file_size,
            "multipart upload started."
        );

        let result = match self.upload_parts(key, &upload_id, path, file_size).await {
            Ok(parts) => self.complete_upload(key, &upload_id, parts).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::error!(
                bucket = self.bucket,
                key = key,
                upload_id = upload_id,
                "multipart upload failed, aborting: {e:#}"
            );
            if let Err(abort_error) = self
                .client
                .abort_multipart_upload()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(&upload_id)
                .send()
                .await
            {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&abort_error);
                tracing::warn!(
                    bucket = self.bucket,
                    key = key,
                    upload_id = upload_id,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "failed to abort multipart upload."
                );
            }
            return Err(e);
        }

        Ok(())
    }

    async fn upload_parts(
        &self,
        key: &str,
        upload_id: &str,
        path: &Path,
        file_size: u64,
    ) -> Result<Vec<CompletedPart>> {
        let parts = plan_parts(file_size, self.upload_config.multipart_chunk_size);
        let semaphore = Arc::new(Semaphore::new(self.upload_config.max_concurrency.max(1)));
        let mut join_set = JoinSet::new();

        tracing::debug!(
            key = key,
            part_count = parts.len(),
            part_size = self.upload_config.multipart_chunk_size,
            "uploading parts."
        );

        let mut completed_parts = Vec::with_capacity(parts.len());
        for (part_number, offset, length) in parts.iter().copied() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .context("upload semaphore closed.")?;

            // Stop spawning as soon as a finished part reports a failure.
            while let Some(result) = join_set.try_join_next() {
                completed_parts.push(completed_part(result)?);
            }

            let client = self.client.clone();
            let bucket = self.bucket.clone();
            let key = key.to_string();
            let upload_id = upload_id.to_string();
            let path = path.to_path_buf();

            join_set.spawn(async move {
                let _permit = permit;

                let chunk = read_file_chunk(&path, offset, length).await?;
                let output = client
                    .upload_part()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(upload_id)
                    .part_number(part_number)
                    .body(ByteStream::from(chunk))
                    .send()
                    .await
                    .map_err(|e| {
                        let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                        tracing::error!(
                            part_number = part_number,
                            s3_error_code = s3_error_code,
                            s3_error_message = s3_error_message,
                            "S3 UploadPart API call failed."
                        );
                        anyhow::anyhow!(e).context("aws_sdk_s3::client::upload_part() failed.")
                    })?;

                let e_tag = output
                    .e_tag()
                    .context("UploadPart response has no ETag.")?
                    .to_string();
                Ok::<_, anyhow::Error>((part_number, e_tag))
            });
        }

        while let Some(result) = join_set.join_next().await {
            completed_parts.push(completed_part(result)?);
        }

        completed_parts.sort_unstable_by_key(|part| part.part_number());
        Ok(completed_parts)
    }

    async fn complete_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: Vec<CompletedPart>,
    ) -> Result<()> {
        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                tracing::error!(
                    bucket = self.bucket,
                    key = key,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 CompleteMultipartUpload API call failed for s3://{}/{}: {} ({}).",
                    self.bucket,
                    key,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow::anyhow!(e)
                    .context("aws_sdk_s3::client::complete_multipart_upload() failed.")
            })?;

        Ok(())
    }
}

#[async_trait]
impl StorageTrait for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn object_exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_head_object_not_found(&e) => Ok(false),
            Err(e) => {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                tracing::error!(
                    bucket = self.bucket,
                    key = key,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 HeadObject API call failed for s3://{}/{}: {} ({}).",
                    self.bucket,
                    key,
                    s3_error_code,
                    s3_error_message,
                );
                Err(anyhow::anyhow!(e).context("aws_sdk_s3::client::head_object() failed."))
            }
        }
    }

    async fn upload_file(
        &self,
        key: &str,
        path: &Path,
        attributes: &ObjectAttributes,
    ) -> Result<()> {
        let started_at = Instant::now();
        let file_size = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to read metadata of {}", path.display()))?
            .len();

        if file_size >= self.upload_config.multipart_threshold {
            self.multipart_upload(key, path, file_size, attributes)
                .await?;
        } else {
            self.put_object(key, path, attributes).await?;
        }

        tracing::info!(
            bucket = self.bucket,
            key = key,
            file_size = file_size,
            elapsed_millis = started_at.elapsed().as_millis() as u64,
            "upload completed."
        );

        Ok(())
    }
}

/// Remaining part tasks are aborted when the `JoinSet` is dropped on error.
fn completed_part(
    result: Result<Result<(i32, String)>, tokio::task::JoinError>,
) -> Result<CompletedPart> {
    let (part_number, e_tag) = result.context("upload part task failed.")??;
    Ok(CompletedPart::builder()
        .part_number(part_number)
        .e_tag(e_tag)
        .build())
}

async fn read_file_chunk(path: &Path, offset: u64, length: u64) -> Result<Bytes> {
    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    file.seek(std::io::SeekFrom::Start(offset)).await?;

    let mut buffer = vec![0u8; length as usize];
    file.read_exact(&mut buffer)
        .await
        .with_context(|| format!("Failed to read {length} bytes at {offset}"))?;

    Ok(Bytes::from(buffer))
}
