use anyhow::Error;
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use thiserror::Error;

/// Application-level error types for the log archiver.
///
/// ## Exit Codes
///
/// Each variant maps to an exit code (via `exit_code()`):
/// - 1: Runtime errors (NotFound, AwsSdk, StreamInterrupted, Download,
///   Compression, Upload, Io)
/// - 2: Configuration errors (InvalidConfig)
#[derive(Error, Debug, PartialEq)]
pub enum ArchiverError {
    /// Missing or invalid input (non-retryable).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The referenced DB cluster does not exist or has no members.
    #[error("Not found: {0}")]
    NotFound(String),

    /// AWS SDK error.
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    /// The log file body stream ended before completion.
    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    /// All download attempts failed.
    #[error("Failed to download log file: {0}")]
    Download(String),

    /// Gzip compression failed.
    #[error("Compression error: {0}")]
    Compression(String),

    /// Uploading to the destination bucket failed.
    #[error("Failed to upload log file: {0}")]
    Upload(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl ArchiverError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ArchiverError::InvalidConfig(_) => 2,
            _ => 1,
        }
    }

    /// Returns true for faults the downloader reports as transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, ArchiverError::StreamInterrupted(_))
    }
}

/// Check if an anyhow::Error wraps an interrupted body stream.
pub fn is_stream_interrupted_error(e: &Error) -> bool {
    if let Some(err) = e.downcast_ref::<ArchiverError>() {
        return err.is_transient();
    }
    false
}

/// Check if an anyhow::Error wraps a not-found error.
pub fn is_not_found_error(e: &Error) -> bool {
    matches!(
        e.downcast_ref::<ArchiverError>(),
        Some(ArchiverError::NotFound(_))
    )
}

/// Extract the exit code from an anyhow::Error, defaulting to 1.
pub fn exit_code_from_error(e: &Error) -> i32 {
    if let Some(err) = e.downcast_ref::<ArchiverError>() {
        return err.exit_code();
    }
    1
}

/// Extracts the service error code and message from an AWS SDK error.
///
/// For service errors (API responses), returns the error code
/// (e.g. "AccessDenied", "DBClusterNotFoundFault") and the human-readable
/// message from the response. For other error types (network, timeout,
/// construction failure), returns "N/A" as the code and the full error
/// description as the message.
pub fn extract_sdk_error_details<E: std::error::Error + ProvideErrorMetadata + 'static>(
    e: &SdkError<E, HttpResponse>,
) -> (String, String) {
    if let Some(service_err) = e.as_service_error() {
        (
            service_err.code().unwrap_or("unknown").to_string(),
            service_err.message().unwrap_or("no message").to_string(),
        )
    } else {
        ("N/A".to_string(), e.to_string())
    }
}
