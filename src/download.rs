use std::{fs, path::PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::{encoding, error::ExportAsError};

/// A decoded file payload: raw bytes plus the mime type they were declared
/// with.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub mime: String,
    pub data: Bytes,
}

/// Capability seam for persisting an exported file. The engine ships with a
/// filesystem implementation; embedders with other storage (tests, WASM
/// hosts) inject their own.
pub trait SaveTarget: Send + Sync {
    fn save(&self, file_name: &str, blob: &Blob) -> Result<(), ExportAsError>;
}

/// Writes blobs into a base directory.
pub struct FsSaveTarget {
    dir: PathBuf,
}

impl FsSaveTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for FsSaveTarget {
    fn default() -> Self {
        Self::new(".")
    }
}

impl SaveTarget for FsSaveTarget {
    fn save(&self, file_name: &str, blob: &Blob) -> Result<(), ExportAsError> {
        let path = self.dir.join(file_name);
        debug!(file = %path.display(), mime = %blob.mime, bytes = blob.data.len(), "saving export");
        fs::write(&path, &blob.data)?;
        Ok(())
    }
}

/// Standalone mirror of the dispatcher's download path: decode a data URL and
/// hand the blob to the target.
pub fn download_from_data_url(
    target: &dyn SaveTarget,
    file_name: &str,
    data_url: &str,
) -> Result<(), ExportAsError> {
    let blob = encoding::content_to_blob(data_url)?;
    target.save(file_name, &blob)
}
