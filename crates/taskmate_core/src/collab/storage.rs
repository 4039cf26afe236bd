//! Object storage contract and a directory-backed implementation.

use super::{CollabResult, CollaboratorError};
use log::info;
use std::fs;
use std::path::PathBuf;

/// Handle to an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub bucket: String,
    pub id: String,
    pub file_name: String,
    pub size: u64,
}

pub trait ObjectStorage {
    fn upload(&self, bucket: &str, id: &str, bytes: &[u8], file_name: &str)
        -> CollabResult<FileRef>;

    fn public_url(&self, bucket: &str, id: &str) -> CollabResult<String>;
}

impl<T: ObjectStorage + ?Sized> ObjectStorage for &T {
    fn upload(
        &self,
        bucket: &str,
        id: &str,
        bytes: &[u8],
        file_name: &str,
    ) -> CollabResult<FileRef> {
        (**self).upload(bucket, id, bytes, file_name)
    }

    fn public_url(&self, bucket: &str, id: &str) -> CollabResult<String> {
        (**self).public_url(bucket, id)
    }
}

/// Stores objects as `<root>/<bucket>/<id>` and serves `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: &str, id: &str) -> CollabResult<PathBuf> {
        for segment in [bucket, id] {
            if !is_safe_segment(segment) {
                return Err(CollaboratorError::Rejected(format!(
                    "invalid object path segment `{segment}`"
                )));
            }
        }
        Ok(self.root.join(bucket).join(id))
    }
}

impl ObjectStorage for LocalObjectStorage {
    fn upload(
        &self,
        bucket: &str,
        id: &str,
        bytes: &[u8],
        file_name: &str,
    ) -> CollabResult<FileRef> {
        let path = self.object_path(bucket, id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        info!(
            "event=object_upload module=storage status=ok bucket={} size={}",
            bucket,
            bytes.len()
        );
        Ok(FileRef {
            bucket: bucket.to_string(),
            id: id.to_string(),
            file_name: file_name.to_string(),
            size: bytes.len() as u64,
        })
    }

    fn public_url(&self, bucket: &str, id: &str) -> CollabResult<String> {
        let path = self.object_path(bucket, id)?;
        let absolute = fs::canonicalize(&path)?;
        Ok(format!("file://{}", absolute.display()))
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with('.')
        && segment
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
}
