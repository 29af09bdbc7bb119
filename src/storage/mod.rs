use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use aws_config::SdkConfig;
use dyn_clone::DynClone;

use crate::config::{ClientConfig, UploadConfig};

pub mod s3;

pub const METADATA_LAST_WRITTEN: &str = "LastWritten";
pub const METADATA_DB_INSTANCE_IDENTIFIER: &str = "DbInstanceIdentifier";
pub const METADATA_COMPRESSED: &str = "Compressed";

pub const CONTENT_TYPE_TEXT: &str = "text/plain";
pub const CONTENT_TYPE_GZIP: &str = "application/gzip";
pub const CONTENT_ENCODING_IDENTITY: &str = "identity";
pub const CONTENT_ENCODING_GZIP: &str = "gzip";

/// Type alias for a boxed Storage trait object.
pub type Storage = Box<dyn StorageTrait + Send + Sync>;

/// Headers and user metadata attached to an uploaded log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAttributes {
    pub content_type: String,
    pub content_encoding: String,
    pub metadata: HashMap<String, String>,
}

impl ObjectAttributes {
    /// `compressed` must reflect what is actually in the file being uploaded.
    pub fn for_log_file(instance_id: &str, last_written: i64, compressed: bool) -> Self {
        let (content_type, content_encoding) = if compressed {
            (CONTENT_TYPE_GZIP, CONTENT_ENCODING_GZIP)
        } else {
            (CONTENT_TYPE_TEXT, CONTENT_ENCODING_IDENTITY)
        };

        let metadata = HashMap::from([
            (METADATA_LAST_WRITTEN.to_string(), last_written.to_string()),
            (
                METADATA_DB_INSTANCE_IDENTIFIER.to_string(),
                instance_id.to_string(),
            ),
            (METADATA_COMPRESSED.to_string(), compressed.to_string()),
        ]);

        Self {
            content_type: content_type.to_string(),
            content_encoding: content_encoding.to_string(),
            metadata,
        }
    }
}

/// Destination bucket operations needed by discovery and transfer.
///
/// Keys are full object keys; there is no prefix handling.
#[async_trait]
pub trait StorageTrait: DynClone {
    fn bucket(&self) -> &str;

    /// Metadata-only existence check. A missing object is `Ok(false)`; any
    /// other failure is an error.
    async fn object_exists(&self, key: &str) -> Result<bool>;

    /// Upload a local file, switching to multipart above the configured
    /// threshold.
    async fn upload_file(&self, key: &str, path: &Path, attributes: &ObjectAttributes)
    -> Result<()>;
}

dyn_clone::clone_trait_object!(StorageTrait);

pub fn create_storage(
    client_config: &ClientConfig,
    sdk_config: &SdkConfig,
    bucket: &str,
    upload_config: UploadConfig,
) -> Storage {
    s3::S3Storage::boxed(client_config.build_s3_client(sdk_config), bucket, upload_config)
}
