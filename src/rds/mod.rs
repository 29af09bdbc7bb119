use anyhow::Result;
use async_trait::async_trait;
use aws_config::SdkConfig;
use dyn_clone::DynClone;

use crate::config::ClientConfig;
use crate::types::RdsLogFile;

pub mod client;

/// Type alias for a boxed RDS API trait object.
pub type Rds = Box<dyn RdsApi + Send + Sync>;

/// RDS operations discovery needs.
#[async_trait]
pub trait RdsApi: DynClone {
    /// Instance identifiers of the cluster's members.
    ///
    /// `Ok(None)` when the cluster does not exist. A cluster with no members
    /// is `Ok(Some(vec![]))`.
    async fn describe_cluster_members(&self, cluster_id: &str) -> Result<Option<Vec<String>>>;

    /// Every log file of the instance whose name contains `filename_contains`
    /// and that was last written at or after `last_written_after` (epoch ms).
    async fn describe_log_files(
        &self,
        instance_id: &str,
        filename_contains: &str,
        last_written_after: i64,
    ) -> Result<Vec<RdsLogFile>>;
}

dyn_clone::clone_trait_object!(RdsApi);

pub fn create_rds(client_config: &ClientConfig, sdk_config: &SdkConfig) -> Rds {
    Box::new(client::RdsClient::new(
        client_config.build_rds_client(sdk_config),
    ))
}
