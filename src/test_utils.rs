//! Shared test utilities for the library crate.
//!
//! Mock implementations of the AWS seams plus small constructors used across
//! unit and property tests.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use crate::rds::RdsApi;
use crate::storage::{ObjectAttributes, StorageTrait};
use crate::types::RdsLogFile;

/// Initialise a dummy tracing subscriber for tests.
///
/// Uses `try_init` so that only the first call in a process actually
/// installs the subscriber; subsequent calls are silently ignored.
pub(crate) fn init_dummy_tracing_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("dummy=trace")
        .try_init();
}

/// A listing entry for `db-instance-1`.
pub(crate) fn make_rds_log_file(file_name: &str, last_written: i64) -> RdsLogFile {
    make_instance_log_file("db-instance-1", file_name, last_written)
}

pub(crate) fn make_instance_log_file(
    instance_id: &str,
    file_name: &str,
    last_written: i64,
) -> RdsLogFile {
    RdsLogFile {
        instance_id: instance_id.to_string(),
        file_name: file_name.to_string(),
        last_written,
        size: 1024,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedUpload {
    pub key: String,
    pub body: Vec<u8>,
    pub attributes: ObjectAttributes,
}

/// In-memory destination bucket.
#[derive(Clone)]
pub(crate) struct MockStorage {
    pub bucket: String,
    pub existing: HashSet<String>,
    pub fail_upload: bool,
    pub fail_exists: bool,
    pub uploads: Arc<Mutex<Vec<RecordedUpload>>>,
    pub checked_keys: Arc<Mutex<Vec<String>>>,
}

impl MockStorage {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            existing: HashSet::new(),
            fail_upload: false,
            fail_exists: false,
            uploads: Arc::new(Mutex::new(Vec::new())),
            checked_keys: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_existing(mut self, keys: &[&str]) -> Self {
        self.existing = keys.iter().map(|k| k.to_string()).collect();
        self
    }
}

#[async_trait]
impl StorageTrait for MockStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn object_exists(&self, key: &str) -> Result<bool> {
        self.checked_keys.lock().unwrap().push(key.to_string());
        if self.fail_exists {
            anyhow::bail!("HeadObject failed: AccessDenied");
        }
        Ok(self.existing.contains(key))
    }

    async fn upload_file(
        &self,
        key: &str,
        path: &Path,
        attributes: &ObjectAttributes,
    ) -> Result<()> {
        if self.fail_upload {
            anyhow::bail!("PutObject failed: InternalError");
        }
        let body = tokio::fs::read(path).await?;
        self.uploads.lock().unwrap().push(RecordedUpload {
            key: key.to_string(),
            body,
            attributes: attributes.clone(),
        });
        Ok(())
    }
}

/// In-memory RDS cluster.
#[derive(Clone, Default)]
pub(crate) struct MockRds {
    /// `None` means the cluster does not exist.
    pub members: Option<Vec<String>>,
    pub log_files: HashMap<String, Vec<RdsLogFile>>,
    pub failing_instances: HashSet<String>,
    pub listing_requests: Arc<Mutex<Vec<(String, String, i64)>>>,
}

impl MockRds {
    pub fn with_members(members: &[&str]) -> Self {
        Self {
            members: Some(members.iter().map(|m| m.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn with_log_files(mut self, instance_id: &str, files: Vec<RdsLogFile>) -> Self {
        self.log_files.insert(instance_id.to_string(), files);
        self
    }

    pub fn with_failing_instance(mut self, instance_id: &str) -> Self {
        self.failing_instances.insert(instance_id.to_string());
        self
    }
}

#[async_trait]
impl RdsApi for MockRds {
    async fn describe_cluster_members(&self, _cluster_id: &str) -> Result<Option<Vec<String>>> {
        Ok(self.members.clone())
    }

    async fn describe_log_files(
        &self,
        instance_id: &str,
        filename_contains: &str,
        last_written_after: i64,
    ) -> Result<Vec<RdsLogFile>> {
        self.listing_requests.lock().unwrap().push((
            instance_id.to_string(),
            filename_contains.to_string(),
            last_written_after,
        ));
        if self.failing_instances.contains(instance_id) {
            anyhow::bail!("DescribeDBLogFiles failed for {instance_id}: Throttling");
        }
        Ok(self.log_files.get(instance_id).cloned().unwrap_or_default())
    }
}
