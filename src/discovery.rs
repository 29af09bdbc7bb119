//! Discovery of log files that still need exporting.
//!
//! Each cluster member is listed on its own task, bounded by a semaphore.
//! The first failing instance cancels the rest and fails the whole call.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::config::{FilterConfig, MAX_DISCOVERY_WORKERS};
use crate::filters::{LogFileFilter, apply_filters, default_filters};
use crate::object_key::generate_object_key;
use crate::rds::Rds;
use crate::storage::Storage;
use crate::types::error::ArchiverError;
use crate::types::token::{DiscoveryCancellationToken, create_discovery_cancellation_token};
use crate::types::{LogFile, RdsLogFile};

/// Substring passed to `DescribeDBLogFiles` to narrow the listing server side.
pub const LOG_FILE_NAME_CONTAINS: &str = "postgresql.log";

/// Epoch milliseconds of `now - lookback_minutes`.
///
/// A window reaching outside the representable time range is an
/// [`ArchiverError::InvalidConfig`].
pub fn time_threshold_millis(
    now: DateTime<Utc>,
    lookback_minutes: i64,
) -> Result<i64, ArchiverError> {
    Duration::try_minutes(lookback_minutes)
        .and_then(|lookback| now.checked_sub_signed(lookback))
        .map(|threshold| threshold.timestamp_millis())
        .ok_or_else(|| {
            ArchiverError::InvalidConfig("LogRangeMinutes is out of range".to_string())
        })
}

pub struct LogFileDiscoverer {
    rds: Rds,
    storage: Storage,
    max_workers: usize,
}

impl LogFileDiscoverer {
    pub fn new(rds: Rds, storage: Storage) -> Self {
        Self {
            rds,
            storage,
            max_workers: MAX_DISCOVERY_WORKERS,
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub async fn discover(&self, config: &FilterConfig) -> Result<Vec<LogFile>> {
        self.discover_at(config, Utc::now()).await
    }

    pub async fn discover_at(
        &self,
        config: &FilterConfig,
        now: DateTime<Utc>,
    ) -> Result<Vec<LogFile>> {
        let threshold = time_threshold_millis(now, config.lookback_minutes)?;
        let instances = self.cluster_members(&config.cluster_id).await?;
        let filters = Arc::new(default_filters()?);

        info!(
            cluster_id = config.cluster_id,
            instance_count = instances.len(),
            last_written_after = threshold,
            "discovering log files."
        );

        let cancellation_token = create_discovery_cancellation_token();
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut join_set = JoinSet::new();

        for instance_id in instances {
            let worker = InstanceWorker {
                rds: self.rds.clone(),
                storage: self.storage.clone(),
                filters: filters.clone(),
                config: config.clone(),
                cancellation_token: cancellation_token.clone(),
            };
            let semaphore = semaphore.clone();

            join_set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .context("discovery semaphore closed.")?;
                worker.run(&instance_id, threshold).await
            });
        }

        let mut log_files = Vec::new();
        while let Some(join_result) = join_set.join_next().await {
            let result = match join_result {
                Err(join_error) => Err(anyhow::anyhow!(join_error)),
                Ok(result) => result,
            };

            match result {
                Ok(files) => log_files.extend(files),
                Err(e) => {
                    cancellation_token.cancel();
                    join_set.abort_all();
                    error!(
                        cluster_id = config.cluster_id,
                        "log file discovery failed: {e:#}"
                    );
                    return Err(e);
                }
            }
        }

        info!(
            cluster_id = config.cluster_id,
            log_file_count = log_files.len(),
            "log file discovery completed."
        );

        Ok(log_files)
    }

    async fn cluster_members(&self, cluster_id: &str) -> Result<Vec<String>> {
        match self.rds.describe_cluster_members(cluster_id).await? {
            None => Err(anyhow::anyhow!(ArchiverError::NotFound(format!(
                "DB cluster {cluster_id} not found"
            )))),
            Some(members) if members.is_empty() => Err(anyhow::anyhow!(ArchiverError::NotFound(
                format!("DB cluster {cluster_id} has no members")
            ))),
            Some(members) => Ok(members),
        }
    }
}

struct InstanceWorker {
    rds: Rds,
    storage: Storage,
    filters: Arc<Vec<Box<dyn LogFileFilter>>>,
    config: FilterConfig,
    cancellation_token: DiscoveryCancellationToken,
}

impl InstanceWorker {
    async fn run(&self, instance_id: &str, threshold: i64) -> Result<Vec<LogFile>> {
        if self.cancellation_token.is_cancelled() {
            debug!(instance_id = instance_id, "discovery has been cancelled.");
            return Ok(vec![]);
        }

        let listed = self
            .rds
            .describe_log_files(instance_id, LOG_FILE_NAME_CONTAINS, threshold)
            .await
            .with_context(|| format!("failed to list log files of {instance_id}"))?;
        let candidates = apply_filters(&self.filters, listed);

        let mut log_files = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if self.cancellation_token.is_cancelled() {
                debug!(instance_id = instance_id, "discovery has been cancelled.");
                return Ok(vec![]);
            }

            if let Some(log_file) = self.to_pending_log_file(&candidate).await? {
                log_files.push(log_file);
            }
        }

        debug!(
            instance_id = instance_id,
            log_file_count = log_files.len(),
            "instance discovery completed."
        );

        Ok(log_files)
    }

    /// `None` when the key cannot be derived or the object is already exported.
    async fn to_pending_log_file(&self, candidate: &RdsLogFile) -> Result<Option<LogFile>> {
        let Some(object_key) = generate_object_key(
            &self.config.cluster_id,
            &candidate.instance_id,
            &candidate.file_name,
            self.config.compression_enabled,
        ) else {
            return Ok(None);
        };

        if self.storage.object_exists(&object_key).await? {
            debug!(
                instance_id = candidate.instance_id,
                key = object_key,
                "log file already exported."
            );
            return Ok(None);
        }

        Ok(Some(LogFile::new(
            &candidate.instance_id,
            &self.config.destination_bucket,
            candidate.last_written,
            &candidate.file_name,
            &object_key,
        )?))
    }
}
