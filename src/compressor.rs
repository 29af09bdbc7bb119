//! In-place gzip compression of a downloaded log file.

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{error, info, warn};

use crate::config::CompressionConfig;
use crate::types::error::ArchiverError;

const TMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOutcome {
    pub original_size: u64,
    pub compressed_size: u64,
}

/// Replaces the file at `path` with its gzip encoding.
///
/// An empty file is left as is and counts as success. On failure the
/// original file is untouched and the `.tmp` sibling is removed.
pub async fn compress_file(path: &Path, config: &CompressionConfig) -> bool {
    let path_buf = path.to_path_buf();
    let config = *config;

    let result = tokio::task::spawn_blocking(move || compress_in_place(&path_buf, &config))
        .await
        .context("compression task failed.");

    match result.and_then(|r| r) {
        Ok(None) => {
            info!(path = %path.display(), "log file is empty. skipping compression.");
            true
        }
        Ok(Some(outcome)) => {
            info!(
                path = %path.display(),
                original_size = outcome.original_size,
                compressed_size = outcome.compressed_size,
                compression_ratio = format!("{:.2}%", compression_ratio(&outcome)),
                "log file compressed."
            );
            true
        }
        Err(e) => {
            let e = ArchiverError::Compression(format!("{}: {e:#}", path.display()));
            error!("{e}");
            false
        }
    }
}

/// Compressed size as a percentage of the original size.
fn compression_ratio(outcome: &CompressionOutcome) -> f64 {
    if outcome.original_size == 0 {
        return 0.0;
    }
    outcome.compressed_size as f64 / outcome.original_size as f64 * 100.0
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(TMP_SUFFIX);
    PathBuf::from(tmp)
}

fn compress_in_place(
    path: &Path,
    config: &CompressionConfig,
) -> Result<Option<CompressionOutcome>> {
    let original_size = fs::metadata(path)
        .with_context(|| format!("failed to read metadata: {}", path.display()))?
        .len();
    if original_size == 0 {
        return Ok(None);
    }

    let tmp_path = tmp_path_for(path);
    match write_compressed(path, &tmp_path, config) {
        Ok(compressed_size) => {
            if let Err(e) = fs::rename(&tmp_path, path) {
                remove_tmp(&tmp_path);
                return Err(e).with_context(|| {
                    format!(
                        "failed to rename {} -> {}",
                        tmp_path.display(),
                        path.display()
                    )
                });
            }
            Ok(Some(CompressionOutcome {
                original_size,
                compressed_size,
            }))
        }
        Err(e) => {
            remove_tmp(&tmp_path);
            Err(e)
        }
    }
}

fn write_compressed(src: &Path, tmp_path: &Path, config: &CompressionConfig) -> Result<u64> {
    let src_file =
        File::open(src).with_context(|| format!("failed to open source file: {}", src.display()))?;
    let tmp_file = File::create(tmp_path)
        .with_context(|| format!("failed to create temp file: {}", tmp_path.display()))?;

    let mut encoder = GzEncoder::new(tmp_file, Compression::new(config.level));
    let mut reader = BufReader::with_capacity(config.chunk_size.max(1), src_file);
    io::copy(&mut reader, &mut encoder).context("failed to compress file")?;

    let mut out_file = encoder.finish().context("failed to finalize gzip compression")?;
    out_file.flush()?;
    out_file
        .sync_all()
        .context("failed to sync compressed file")?;

    Ok(out_file.metadata()?.len())
}

fn remove_tmp(tmp_path: &Path) {
    if !tmp_path.exists() {
        return;
    }
    if let Err(e) = fs::remove_file(tmp_path) {
        warn!(path = %tmp_path.display(), "failed to remove temporary file: {e}");
    }
}
