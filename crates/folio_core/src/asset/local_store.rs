//! Directory-backed asset uploader.
//!
//! # Invariants
//! - Stored file names are generated (`<uuid>[.<ext>]`); the caller's file
//!   name only contributes a sanitized extension.
//! - Returned URLs are `<url_prefix>/<stored name>`.

use super::{AssetRef, AssetUploader, UploadError, UploadResult};
use log::{error, info};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Default public prefix for stored assets.
pub const DEFAULT_ASSET_URL_PREFIX: &str = "/uploads";
const MAX_EXTENSION_CHARS: usize = 10;

/// Uploader writing assets into one local directory.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalAssetStore {
    /// Creates a store under `root` using the default URL prefix.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_url_prefix(root, DEFAULT_ASSET_URL_PREFIX)
    }

    pub fn with_url_prefix(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let url_prefix = url_prefix.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            url_prefix,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a returned URL back to its file on disk.
    pub fn resolve(&self, asset: &AssetRef) -> Option<PathBuf> {
        let relative = asset
            .url
            .strip_prefix(self.url_prefix.as_str())?
            .trim_start_matches('/');
        if relative.is_empty() || relative.contains('/') || relative.contains("..") {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl AssetUploader for LocalAssetStore {
    fn upload_asset(&self, file_name: &str, bytes: &[u8]) -> UploadResult<AssetRef> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        let stored_name = match sanitized_extension(file_name) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };

        let write_result = std::fs::create_dir_all(&self.root)
            .and_then(|()| std::fs::write(self.root.join(&stored_name), bytes));
        if let Err(err) = write_result {
            error!(
                "event=asset_upload module=asset status=error bytes={} error={}",
                bytes.len(),
                err
            );
            return Err(UploadError::Transport(err.to_string()));
        }

        info!(
            "event=asset_upload module=asset status=ok bytes={} stored={}",
            bytes.len(),
            stored_name
        );
        Ok(AssetRef::new(format!("{}/{stored_name}", self.url_prefix)))
    }
}

fn sanitized_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    if ext.is_empty()
        || ext.chars().count() > MAX_EXTENSION_CHARS
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
