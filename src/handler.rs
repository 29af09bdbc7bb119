//! Lambda entry points.
//!
//! Each handler validates its payload before any AWS client is created, so
//! configuration errors surface without network access.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::env::EnvSource;
use crate::config::{
    ClientConfig, CompressionConfig, DownloadConfig, FilterConfig, TransferConfig, UploadConfig,
};
use crate::discovery::LogFileDiscoverer;
use crate::downloader::{LogFileDownloader, SigV4Signer, SignedHttpSource};
use crate::rds::create_rds;
use crate::storage::create_storage;
use crate::transfer::LogFileTransfer;
use crate::types::LogFile;
use crate::types::error::ArchiverError;
use crate::types::event::{DiscoveryEvent, TransferEvent, TransferResponse};
use crate::uploader::LogFileUploader;

fn parse_event<T: DeserializeOwned>(payload: Value) -> Result<T, ArchiverError> {
    serde_json::from_value(payload)
        .map_err(|e| ArchiverError::InvalidConfig(format!("invalid event payload: {e}")))
}

pub fn parse_discovery_event(payload: Value, env: &dyn EnvSource) -> Result<FilterConfig> {
    let event: DiscoveryEvent = parse_event(payload)?;
    Ok(FilterConfig::from_event(&event, env)?)
}

pub fn parse_transfer_event(payload: Value) -> Result<TransferConfig> {
    let event: TransferEvent = parse_event(payload)?;
    Ok(TransferConfig::from_event(&event)?)
}

pub async fn discovery_handler(payload: Value, env: &dyn EnvSource) -> Result<Vec<LogFile>> {
    let config = parse_discovery_event(payload, env)?;
    let client_config = ClientConfig::from_env(env);

    let sdk_config = client_config.load_sdk_config().await;
    let rds = create_rds(&client_config, &sdk_config);
    let storage = create_storage(
        &client_config,
        &sdk_config,
        &config.destination_bucket,
        UploadConfig::default(),
    );

    LogFileDiscoverer::new(rds, storage).discover(&config).await
}

pub async fn transfer_handler(payload: Value, env: &dyn EnvSource) -> Result<TransferResponse> {
    let config = parse_transfer_event(payload)?;
    let client_config = ClientConfig::from_env(env);

    let sdk_config = client_config.load_sdk_config().await;
    let region = client_config.resolve_region().await;
    let credentials_provider = sdk_config
        .credentials_provider()
        .ok_or_else(|| {
            ArchiverError::AwsSdk("no AWS credentials provider is configured".to_string())
        })?;

    let signer = SigV4Signer::new(credentials_provider, region.as_ref());
    let downloader = LogFileDownloader::new(
        Box::new(SignedHttpSource::new(Box::new(signer), region.as_ref())),
        DownloadConfig::default(),
    );

    let storage = create_storage(
        &client_config,
        &sdk_config,
        &config.destination_bucket,
        UploadConfig::default(),
    );
    let uploader = LogFileUploader::new(storage, CompressionConfig::from_env(env));

    LogFileTransfer::new(downloader, uploader)
        .transfer(&config)
        .await
}
