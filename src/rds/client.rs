use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_rds::Client;
use aws_sdk_rds::types::{DbCluster, DescribeDbLogFilesDetails};

use crate::rds::RdsApi;
use crate::types::RdsLogFile;
use crate::types::error::extract_sdk_error_details;

#[derive(Clone)]
pub struct RdsClient {
    client: Arc<Client>,
}

impl RdsClient {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl RdsApi for RdsClient {
    async fn describe_cluster_members(&self, cluster_id: &str) -> Result<Option<Vec<String>>> {
        let output = match self
            .client
            .describe_db_clusters()
            .db_cluster_identifier(cluster_id)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_db_cluster_not_found_fault()) =>
            {
                return Ok(None);
            }
            Err(e) => {
                let (rds_error_code, rds_error_message) = extract_sdk_error_details(&e);
                tracing::error!(
                    cluster_id = cluster_id,
                    rds_error_code = rds_error_code,
                    rds_error_message = rds_error_message,
                    "RDS DescribeDBClusters API call failed for {}: {} ({}).",
                    cluster_id,
                    rds_error_code,
                    rds_error_message,
                );
                return Err(anyhow::anyhow!(e)
                    .context("aws_sdk_rds::client::describe_db_clusters() failed."));
            }
        };

        Ok(output.db_clusters().first().map(member_instance_ids))
    }

    async fn describe_log_files(
        &self,
        instance_id: &str,
        filename_contains: &str,
        last_written_after: i64,
    ) -> Result<Vec<RdsLogFile>> {
        let mut log_files = Vec::new();
        let mut marker = None;

        loop {
            let output = self
                .client
                .describe_db_log_files()
                .db_instance_identifier(instance_id)
                .filename_contains(filename_contains)
                .file_last_written(last_written_after)
                .set_marker(marker.clone())
                .send()
                .await
                .map_err(|e| {
                    let (rds_error_code, rds_error_message) = extract_sdk_error_details(&e);
                    tracing::error!(
                        instance_id = instance_id,
                        rds_error_code = rds_error_code,
                        rds_error_message = rds_error_message,
                        "RDS DescribeDBLogFiles API call failed for {}: {} ({}).",
                        instance_id,
                        rds_error_code,
                        rds_error_message,
                    );
                    anyhow::anyhow!(e)
                        .context("aws_sdk_rds::client::describe_db_log_files() failed.")
                })?;

            log_files.extend(to_rds_log_files(instance_id, output.describe_db_log_files()));

            match output.marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        tracing::debug!(
            instance_id = instance_id,
            log_file_count = log_files.len(),
            "log files listed."
        );

        Ok(log_files)
    }
}

fn member_instance_ids(cluster: &DbCluster) -> Vec<String> {
    cluster
        .db_cluster_members()
        .iter()
        .filter_map(|member| member.db_instance_identifier())
        .map(str::to_string)
        .collect()
}

fn to_rds_log_files(instance_id: &str, details: &[DescribeDbLogFilesDetails]) -> Vec<RdsLogFile> {
    details
        .iter()
        .filter_map(|detail| {
            Some(RdsLogFile {
                instance_id: instance_id.to_string(),
                file_name: detail.log_file_name()?.to_string(),
                last_written: detail.last_written().unwrap_or_default(),
                size: detail.size().unwrap_or_default(),
            })
        })
        .collect()
}
