//! Path resolution - resource handle to canonical absolute path
//!
//! Resolution either yields a path the native core can open or an explicit
//! [`ResolveError`]. Nothing here panics on bad input.

use crate::resource::{HandleTarget, ResourceHandle, DOWNLOADS_AUTHORITY, EXTERNAL_STORAGE_AUTHORITY};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Unsupported URI scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Unsupported document provider: {0}")]
    UnsupportedAuthority(String),
    #[error("Malformed document id: {0}")]
    MalformedDocumentId(String),
    #[error("Unknown storage volume: {0}")]
    UnknownVolume(String),
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("Not a regular file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Turns a resource handle into the path string handed to `Load`
pub trait PathResolver {
    fn resolve(&self, handle: &ResourceHandle) -> Result<String, ResolveError>;
}

/// Where storage-provider volume ids live on the local filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageVolumes {
    /// Mount point of the `primary` volume (internal shared storage)
    pub primary: PathBuf,
    /// Parent directory of removable volumes, mounted as `<root>/<volume id>`
    pub root: PathBuf,
}

impl Default for StorageVolumes {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("/storage/emulated/0"),
            root: PathBuf::from("/storage"),
        }
    }
}

impl StorageVolumes {
    /// Map a provider document id to a local path without touching the filesystem
    pub fn locate(&self, authority: &str, document_id: &str) -> Result<PathBuf, ResolveError> {
        match authority {
            EXTERNAL_STORAGE_AUTHORITY => self.locate_volume_document(document_id),
            DOWNLOADS_AUTHORITY => match document_id.strip_prefix("raw:") {
                Some(path) => Ok(PathBuf::from(path)),
                None => Err(ResolveError::MalformedDocumentId(document_id.to_string())),
            },
            other => Err(ResolveError::UnsupportedAuthority(other.to_string())),
        }
    }

    fn locate_volume_document(&self, document_id: &str) -> Result<PathBuf, ResolveError> {
        let (volume, relative) = document_id
            .split_once(':')
            .ok_or_else(|| ResolveError::MalformedDocumentId(document_id.to_string()))?;

        let base = match volume {
            "primary" => self.primary.clone(),
            "home" => self.primary.join("Documents"),
            id if !id.is_empty() && !id.contains(['/', '\\']) && id != "." && id != ".." => {
                self.root.join(id)
            }
            other => return Err(ResolveError::UnknownVolume(other.to_string())),
        };

        Ok(if relative.is_empty() {
            base
        } else {
            base.join(relative.trim_start_matches('/'))
        })
    }
}

/// Resolves handles against the local filesystem.
///
/// The returned path is canonical (symlinks and `..` removed), names a
/// regular file, and was readable at resolution time.
#[derive(Debug, Clone, Default)]
pub struct CanonicalResolver {
    volumes: StorageVolumes,
}

impl CanonicalResolver {
    pub fn new(volumes: StorageVolumes) -> Self {
        Self { volumes }
    }

    fn local_path(&self, handle: &ResourceHandle) -> Result<PathBuf, ResolveError> {
        match handle.target()? {
            HandleTarget::Path(path) => Ok(path),
            HandleTarget::Document {
                authority,
                document_id,
            } => self.volumes.locate(&authority, &document_id),
        }
    }
}

impl PathResolver for CanonicalResolver {
    fn resolve(&self, handle: &ResourceHandle) -> Result<String, ResolveError> {
        let local = self.local_path(handle)?;
        let canonical = fs::canonicalize(&local).map_err(|e| classify(e, &local))?;

        let metadata = fs::metadata(&canonical).map_err(|e| classify(e, &canonical))?;
        if !metadata.is_file() {
            return Err(ResolveError::NotAFile(canonical));
        }

        // The core only gets a path, so make sure it can actually be opened
        File::open(&canonical).map_err(|e| classify(e, &canonical))?;

        canonical
            .into_os_string()
            .into_string()
            .map_err(|raw| ResolveError::NonUtf8Path(raw.to_string_lossy().into_owned()))
    }
}

fn classify(err: io::Error, path: &Path) -> ResolveError {
    match err.kind() {
        io::ErrorKind::NotFound => ResolveError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => ResolveError::PermissionDenied(path.to_path_buf()),
        _ => ResolveError::IoError(err),
    }
}
