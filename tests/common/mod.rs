//! Shared test infrastructure for aurora-log-archiver.
//!
//! Provides in-memory implementations of the public RDS, storage and log
//! source traits for integration tests, and `TestHelper` for E2E tests that
//! run against real AWS S3 with the `aurora-log-archiver-e2e-test` profile.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::operation::head_object::HeadObjectOutput;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier,
};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

use aurora_log_archiver::downloader::LogFileSource;
use aurora_log_archiver::rds::RdsApi;
use aurora_log_archiver::storage::{ObjectAttributes, StorageTrait};
use aurora_log_archiver::types::RdsLogFile;

/// AWS profile used for all E2E tests.
pub const AWS_PROFILE: &str = "aurora-log-archiver-e2e-test";

/// Default region for E2E tests (used when creating buckets).
const DEFAULT_REGION: &str = "us-east-1";

// ---------------------------------------------------------------------------
// In-memory collaborators
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct StaticRds {
    pub members: Option<Vec<String>>,
    pub log_files: HashMap<String, Vec<RdsLogFile>>,
}

impl StaticRds {
    pub fn new(members: &[&str]) -> Self {
        Self {
            members: Some(members.iter().map(|m| m.to_string()).collect()),
            log_files: HashMap::new(),
        }
    }

    pub fn log_file(mut self, instance_id: &str, file_name: &str, last_written: i64) -> Self {
        self.log_files
            .entry(instance_id.to_string())
            .or_default()
            .push(RdsLogFile {
                instance_id: instance_id.to_string(),
                file_name: file_name.to_string(),
                last_written,
                size: 0,
            });
        self
    }
}

#[async_trait]
impl RdsApi for StaticRds {
    async fn describe_cluster_members(&self, _cluster_id: &str) -> Result<Option<Vec<String>>> {
        Ok(self.members.clone())
    }

    async fn describe_log_files(
        &self,
        instance_id: &str,
        filename_contains: &str,
        last_written_after: i64,
    ) -> Result<Vec<RdsLogFile>> {
        Ok(self
            .log_files
            .get(instance_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|f| f.file_name.contains(filename_contains))
            .filter(|f| f.last_written >= last_written_after)
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub attributes: ObjectAttributes,
}

/// Bucket held in memory; uploads become visible to `object_exists`.
#[derive(Clone)]
pub struct MemoryStorage {
    pub bucket: String,
    pub objects: Arc<Mutex<HashMap<String, StoredObject>>>,
}

impl MemoryStorage {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn keys(&self) -> HashSet<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl StorageTrait for MemoryStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn object_exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn upload_file(
        &self,
        key: &str,
        path: &Path,
        attributes: &ObjectAttributes,
    ) -> Result<()> {
        let body = tokio::fs::read(path).await?;
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body,
                attributes: attributes.clone(),
            },
        );
        Ok(())
    }
}

/// Serves `"{instance_id}:{file_name}\n"` repeated `repeat` times.
#[derive(Clone)]
pub struct EchoSource {
    pub repeat: usize,
}

#[async_trait]
impl LogFileSource for EchoSource {
    async fn fetch(
        &self,
        instance_id: &str,
        file_name: &str,
        writer: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64> {
        let body = format!("{instance_id}:{file_name}\n").repeat(self.repeat);
        writer.write_all(body.as_bytes()).await?;
        Ok(body.len() as u64)
    }
}

// ---------------------------------------------------------------------------
// E2E helpers
// ---------------------------------------------------------------------------

/// RAII guard that deletes all objects and the bucket when dropped.
///
/// This ensures cleanup ALWAYS runs, even if the test panics.
pub struct BucketGuard {
    helper: Arc<TestHelper>,
    bucket: String,
    cleaned: bool,
}

impl BucketGuard {
    /// Deletes the bucket at the end of a passing test.
    pub async fn cleanup(mut self) {
        self.helper.delete_bucket_cascade(&self.bucket).await;
        self.cleaned = true;
    }
}

impl Drop for BucketGuard {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        let helper = self.helper.clone();
        let bucket = self.bucket.clone();
        // Catch panics from block_on() to avoid double-panic abort when the
        // runtime is shutting down (e.g., if the test already panicked).
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tokio::task::block_in_place(|| {
                tokio::runtime::Handle::current().block_on(async move {
                    helper.delete_bucket_cascade(&bucket).await;
                });
            });
        }));
    }
}

/// Wraps an AWS S3 `Client` built with the e2e test profile.
pub struct TestHelper {
    client: Client,
    region: String,
}

impl TestHelper {
    pub async fn new() -> Arc<Self> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .profile_name(AWS_PROFILE)
            .load()
            .await;

        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let client = Client::new(&sdk_config);

        Arc::new(Self { client, region })
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn bucket_guard(self: &Arc<Self>, bucket: &str) -> BucketGuard {
        BucketGuard {
            helper: Arc::clone(self),
            bucket: bucket.to_string(),
            cleaned: false,
        }
    }

    /// Returns a name like `aurora-log-e2e-<uuid>`.
    pub fn generate_bucket_name(&self) -> String {
        format!("aurora-log-e2e-{}", Uuid::new_v4())
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub async fn create_bucket(&self, bucket: &str) {
        let mut builder = self.client.create_bucket().bucket(bucket);

        // us-east-1 must NOT specify a location constraint
        if self.region != "us-east-1" {
            let constraint = BucketLocationConstraint::from(self.region.as_str());
            let config = CreateBucketConfiguration::builder()
                .location_constraint(constraint)
                .build();
            builder = builder.create_bucket_configuration(config);
        }

        builder
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to create bucket {bucket}: {e}"));
    }

    pub async fn delete_bucket_cascade(&self, bucket: &str) {
        loop {
            let resp = match self.client.list_objects_v2().bucket(bucket).send().await {
                Ok(r) => r,
                Err(_) => break,
            };

            let objects: Vec<ObjectIdentifier> = resp
                .contents()
                .iter()
                .filter_map(|obj| {
                    obj.key()
                        .map(|k| ObjectIdentifier::builder().key(k).build().unwrap())
                })
                .collect();
            if objects.is_empty() {
                break;
            }

            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .unwrap();
            let _ = self
                .client
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await;
        }

        let _ = self.client.delete_bucket().bucket(bucket).send().await;
    }

    pub async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body.into())
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to put object {key} in {bucket}: {e}"));
    }

    pub async fn head_object(&self, bucket: &str, key: &str) -> HeadObjectOutput {
        self.client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to head object {key} in {bucket}: {e}"))
    }

    pub async fn get_object_bytes(&self, bucket: &str, key: &str) -> Vec<u8> {
        self.client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to get object {key} in {bucket}: {e}"))
            .body
            .collect()
            .await
            .unwrap()
            .into_bytes()
            .to_vec()
    }
}

/// Default timeout for E2E tests (5 minutes).
pub const E2E_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(300);

/// Wraps an async E2E test body with a timeout.
#[macro_export]
macro_rules! e2e_timeout {
    ($body:expr) => {
        tokio::time::timeout(common::E2E_TIMEOUT, $body)
            .await
            .expect("E2E test timed out")
    };
}
