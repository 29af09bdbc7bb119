//! AWS client construction shared by the RDS and S3 clients.

use std::time::Duration;

use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig as SdkRetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};

use crate::config::{ClientConfig, RetryConfig};

/// Region used when neither the configuration nor the environment names one.
pub const FALLBACK_REGION: &str = "us-east-1";

impl ClientConfig {
    pub async fn load_sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(self.region_provider())
            .retry_config(build_retry_config(&self.retry_config));

        if let Some(endpoint_url) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }

        loader.load().await
    }

    pub fn build_s3_client(&self, sdk_config: &SdkConfig) -> aws_sdk_s3::Client {
        let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
            .force_path_style(self.force_path_style)
            .build();

        aws_sdk_s3::Client::from_conf(s3_config)
    }

    pub fn build_rds_client(&self, sdk_config: &SdkConfig) -> aws_sdk_rds::Client {
        aws_sdk_rds::Client::new(sdk_config)
    }

    /// Region the signed log download URL is built for.
    pub async fn resolve_region(&self) -> Region {
        self.region_provider()
            .region()
            .await
            .unwrap_or_else(|| Region::new(FALLBACK_REGION))
    }

    fn region_provider(&self) -> RegionProviderChain {
        RegionProviderChain::first_try(self.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(Region::new(FALLBACK_REGION))
    }
}

fn build_retry_config(retry_config: &RetryConfig) -> SdkRetryConfig {
    SdkRetryConfig::standard()
        .with_max_attempts(retry_config.aws_max_attempts)
        .with_initial_backoff(Duration::from_millis(
            retry_config.initial_backoff_milliseconds,
        ))
}
