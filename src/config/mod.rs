pub mod env;

use std::time::Duration;

use crate::config::env::{EnvSource, is_env_true};
use crate::types::error::ArchiverError;
use crate::types::event::{DiscoveryEvent, TransferEvent};
use crate::types::{require_non_empty, require_non_zero};

// ---------------------------------------------------------------------------
// Default constants
// ---------------------------------------------------------------------------

pub const DEFAULT_LOG_RANGE_MINUTES: i64 = 180;
pub const MAX_DISCOVERY_WORKERS: usize = 4;

const DEFAULT_DOWNLOAD_RETRIES: u32 = 3;
const DEFAULT_DOWNLOAD_RETRY_DELAY_SECONDS: u64 = 5;
const DEFAULT_DOWNLOAD_CHUNK_SIZE: usize = 8192;

const DEFAULT_COMPRESSION_LEVEL: u32 = 6;
const DEFAULT_FUNCTION_MEMORY_SIZE_MB: usize = 1024;
const MEMORY_SIZE_CHUNK_DIVISOR: usize = 8;

const DEFAULT_MULTIPART_THRESHOLD: u64 = 8 * 1024 * 1024;
const DEFAULT_MULTIPART_CHUNK_SIZE: u64 = 8 * 1024 * 1024;
const DEFAULT_MAX_UPLOAD_CONCURRENCY: usize = 10;

const DEFAULT_AWS_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_INITIAL_BACKOFF_MILLISECONDS: u64 = 100;

// ---------------------------------------------------------------------------
// Environment variable names
// ---------------------------------------------------------------------------

pub const ENV_ENABLE_COMPRESSION: &str = "ENABLE_COMPRESSION";
pub const ENV_FUNCTION_MEMORY_SIZE: &str = "AWS_LAMBDA_FUNCTION_MEMORY_SIZE";
pub const ENV_AWS_REGION: &str = "AWS_REGION";
pub const ENV_AWS_ENDPOINT_URL: &str = "AWS_ENDPOINT_URL";
pub const ENV_AWS_MAX_ATTEMPTS: &str = "AWS_MAX_ATTEMPTS";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_POWERTOOLS_LOG_LEVEL: &str = "POWERTOOLS_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
pub const ENV_AWS_SDK_TRACING: &str = "AWS_SDK_TRACING";

/// Settings for one discovery run.
///
/// Built once per invocation from the trigger event and the
/// `ENABLE_COMPRESSION` environment variable.
///
/// ```
/// use aurora_log_archiver::config::FilterConfig;
///
/// let config = FilterConfig::new("database-1", "log-bucket", 30, true).unwrap();
/// assert_eq!(config.lookback_minutes, 30);
/// assert!(FilterConfig::new("database-1", "log-bucket", 0, false).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub cluster_id: String,
    pub destination_bucket: String,
    pub lookback_minutes: i64,
    pub compression_enabled: bool,
}

impl FilterConfig {
    pub fn new(
        cluster_id: &str,
        destination_bucket: &str,
        lookback_minutes: i64,
        compression_enabled: bool,
    ) -> Result<Self, ArchiverError> {
        require_non_empty(cluster_id, "DbClusterIdentifier")?;
        require_non_empty(destination_bucket, "LogDestinationBucket")?;
        if lookback_minutes <= 0 {
            return Err(ArchiverError::InvalidConfig(
                "LogRangeMinutes must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            cluster_id: cluster_id.to_string(),
            destination_bucket: destination_bucket.to_string(),
            lookback_minutes,
            compression_enabled,
        })
    }

    pub fn from_event(event: &DiscoveryEvent, env: &dyn EnvSource) -> Result<Self, ArchiverError> {
        Self::new(
            event.db_cluster_identifier.as_deref().unwrap_or_default(),
            event.log_destination_bucket.as_deref().unwrap_or_default(),
            event.log_range_minutes.unwrap_or(DEFAULT_LOG_RANGE_MINUTES),
            is_env_true(env, ENV_ENABLE_COMPRESSION),
        )
    }
}

/// Settings for one download + upload cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferConfig {
    pub instance_id: String,
    pub file_name: String,
    pub destination_bucket: String,
    pub last_written: i64,
    pub object_key: String,
}

impl TransferConfig {
    pub fn new(
        instance_id: &str,
        file_name: &str,
        destination_bucket: &str,
        last_written: i64,
        object_key: &str,
    ) -> Result<Self, ArchiverError> {
        require_non_empty(instance_id, "DbInstanceIdentifier")?;
        require_non_empty(file_name, "LogFileName")?;
        require_non_empty(destination_bucket, "LogDestinationBucket")?;
        require_non_zero(last_written, "LastWritten")?;
        require_non_empty(object_key, "ObjectKey")?;

        Ok(Self {
            instance_id: instance_id.to_string(),
            file_name: file_name.to_string(),
            destination_bucket: destination_bucket.to_string(),
            last_written,
            object_key: object_key.to_string(),
        })
    }

    pub fn from_event(event: &TransferEvent) -> Result<Self, ArchiverError> {
        Self::new(
            event.db_instance_identifier.as_deref().unwrap_or_default(),
            event.log_file_name.as_deref().unwrap_or_default(),
            event.log_destination_bucket.as_deref().unwrap_or_default(),
            event.last_written.unwrap_or_default(),
            event.object_key.as_deref().unwrap_or_default(),
        )
    }
}

/// Retry settings for the log file download.
///
/// The delay between attempts is constant; there is no backoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadConfig {
    pub retries: u32,
    pub retry_delay: Duration,
    /// Write buffer size for the output file.
    pub chunk_size: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        DownloadConfig {
            retries: DEFAULT_DOWNLOAD_RETRIES,
            retry_delay: Duration::from_secs(DEFAULT_DOWNLOAD_RETRY_DELAY_SECONDS),
            chunk_size: DEFAULT_DOWNLOAD_CHUNK_SIZE,
        }
    }
}

/// Gzip settings for the uploader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub level: u32,
    /// Read buffer size, derived from the function's memory budget.
    pub chunk_size: usize,
}

impl CompressionConfig {
    pub fn from_env(env: &dyn EnvSource) -> Self {
        let memory_size_mb = env
            .var(ENV_FUNCTION_MEMORY_SIZE)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_FUNCTION_MEMORY_SIZE_MB);

        CompressionConfig {
            enabled: is_env_true(env, ENV_ENABLE_COMPRESSION),
            level: DEFAULT_COMPRESSION_LEVEL,
            chunk_size: memory_size_mb * 1024 * 1024 / MEMORY_SIZE_CHUNK_DIVISOR,
        }
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        CompressionConfig {
            enabled: false,
            level: DEFAULT_COMPRESSION_LEVEL,
            chunk_size: DEFAULT_FUNCTION_MEMORY_SIZE_MB * 1024 * 1024 / MEMORY_SIZE_CHUNK_DIVISOR,
        }
    }
}

/// Multipart settings for the S3 upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadConfig {
    pub multipart_threshold: u64,
    pub multipart_chunk_size: u64,
    pub max_concurrency: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            multipart_threshold: DEFAULT_MULTIPART_THRESHOLD,
            multipart_chunk_size: DEFAULT_MULTIPART_CHUNK_SIZE,
            max_concurrency: DEFAULT_MAX_UPLOAD_CONCURRENCY,
        }
    }
}

/// AWS client configuration shared by the RDS and S3 clients.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub retry_config: RetryConfig,
}

impl ClientConfig {
    pub fn from_env(env: &dyn EnvSource) -> Self {
        let endpoint_url = env.var(ENV_AWS_ENDPOINT_URL).filter(|v| !v.is_empty());
        ClientConfig {
            region: env.var(ENV_AWS_REGION).filter(|v| !v.is_empty()),
            // Local S3 emulators generally need path-style addressing.
            force_path_style: endpoint_url.is_some(),
            endpoint_url,
            retry_config: RetryConfig {
                aws_max_attempts: env
                    .var(ENV_AWS_MAX_ATTEMPTS)
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(DEFAULT_AWS_MAX_ATTEMPTS),
                initial_backoff_milliseconds: DEFAULT_INITIAL_BACKOFF_MILLISECONDS,
            },
        }
    }
}

/// Retry configuration for AWS SDK operations (exponential backoff inside the SDK).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    pub aws_max_attempts: u32,
    pub initial_backoff_milliseconds: u64,
}

/// Tracing (logging) configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracingConfig {
    pub tracing_level: log::Level,
    pub json_tracing: bool,
    pub aws_sdk_tracing: bool,
    pub span_events_tracing: bool,
    pub disable_color_tracing: bool,
}

impl TracingConfig {
    /// Reads `LOG_LEVEL` (or `POWERTOOLS_LOG_LEVEL`), `LOG_FORMAT` and
    /// `AWS_SDK_TRACING`. JSON output is the default.
    pub fn from_env(env: &dyn EnvSource) -> Self {
        let tracing_level = env
            .var(ENV_LOG_LEVEL)
            .or_else(|| env.var(ENV_POWERTOOLS_LOG_LEVEL))
            .and_then(|v| parse_log_level(&v))
            .unwrap_or(log::Level::Info);

        let json_tracing = !env
            .var(ENV_LOG_FORMAT)
            .is_some_and(|v| v.eq_ignore_ascii_case("text"));

        TracingConfig {
            tracing_level,
            json_tracing,
            aws_sdk_tracing: is_env_true(env, ENV_AWS_SDK_TRACING),
            span_events_tracing: false,
            disable_color_tracing: true,
        }
    }
}

/// Accepts `log` level names plus the Powertools spellings `WARNING` and `CRITICAL`.
pub fn parse_log_level(value: &str) -> Option<log::Level> {
    match value.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Some(log::Level::Trace),
        "DEBUG" => Some(log::Level::Debug),
        "INFO" => Some(log::Level::Info),
        "WARN" | "WARNING" => Some(log::Level::Warn),
        "ERROR" | "CRITICAL" => Some(log::Level::Error),
        _ => None,
    }
}
