//! Resource handles - opaque references to a user-selected document
//!
//! A handle is whatever the platform chooser hands back: a `file://` URI, a
//! storage-provider `content://` URI, or a plain path from a desktop dialog.
//! Handles are never paths themselves; [`crate::resolver`] turns them into one.

use crate::resolver::ResolveError;
use percent_encoding::percent_decode_str;
use std::fmt;
use std::path::{Path, PathBuf};

pub const FILE_SCHEME: &str = "file";
pub const CONTENT_SCHEME: &str = "content";

/// Document provider backing the Android "open document" chooser for local storage
pub const EXTERNAL_STORAGE_AUTHORITY: &str = "com.android.externalstorage.documents";
/// Document provider for the Downloads collection
pub const DOWNLOADS_AUTHORITY: &str = "com.android.providers.downloads.documents";

/// Opaque platform reference to a selected file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle(String);

/// What a handle points at, after URI parsing but before touching the filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleTarget {
    /// A local path (bare path or `file://` URI), already percent-decoded
    Path(PathBuf),
    /// A storage-provider document such as `primary:Games/game.3ds`
    Document {
        authority: String,
        document_id: String,
    },
}

impl ResourceHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Wrap a path returned by a desktop file dialog.
    ///
    /// `Load` takes a string, so a path that is not valid UTF-8 can never be
    /// handed on and is rejected here rather than mangled.
    pub fn from_path(path: &Path) -> Result<Self, ResolveError> {
        path.to_str()
            .map(Self::new)
            .ok_or_else(|| ResolveError::NonUtf8Path(path.to_string_lossy().into_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the handle into the thing it refers to
    pub fn target(&self) -> Result<HandleTarget, ResolveError> {
        let Some((scheme, rest)) = self.0.split_once("://") else {
            return Ok(HandleTarget::Path(PathBuf::from(&self.0)));
        };

        let rest = strip_query(rest);
        let (authority, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };

        match scheme.to_ascii_lowercase().as_str() {
            FILE_SCHEME => {
                if !authority.is_empty() && !authority.eq_ignore_ascii_case("localhost") {
                    return Err(ResolveError::UnsupportedAuthority(authority.to_string()));
                }
                Ok(HandleTarget::Path(PathBuf::from(decode(path)?)))
            }
            CONTENT_SCHEME => {
                let document_id = document_id(path)
                    .ok_or_else(|| ResolveError::MalformedDocumentId(path.to_string()))?;
                Ok(HandleTarget::Document {
                    authority: authority.to_string(),
                    document_id: decode(document_id)?,
                })
            }
            other => Err(ResolveError::UnsupportedScheme(other.to_string())),
        }
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceHandle {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ResourceHandle {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// A handle paired with the canonical path it resolved to.
///
/// Lives only as long as the completion callback that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedResource {
    pub handle: ResourceHandle,
    pub path: String,
}

fn strip_query(rest: &str) -> &str {
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

/// Document ids sit after `/document/`, either directly or below a `/tree/<id>/` grant
fn document_id(path: &str) -> Option<&str> {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    match segments.as_slice() {
        ["document", id] | ["tree", _, "document", id] if !id.is_empty() => Some(*id),
        _ => None,
    }
}

fn decode(raw: &str) -> Result<String, ResolveError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| ResolveError::NonUtf8Path(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_path_is_taken_verbatim() {
        let handle = ResourceHandle::new("/storage/emulated/0/Games/game.3ds");
        assert_eq!(
            handle.target().unwrap(),
            HandleTarget::Path(PathBuf::from("/storage/emulated/0/Games/game.3ds"))
        );
    }

    #[test]
    fn file_uri_is_decoded() {
        let handle = ResourceHandle::new("file:///sdcard/My%20Games/zelda.3ds?x=1");
        assert_eq!(
            handle.target().unwrap(),
            HandleTarget::Path(PathBuf::from("/sdcard/My Games/zelda.3ds"))
        );
    }

    #[test]
    fn file_uri_with_remote_host_is_rejected() {
        let handle = ResourceHandle::new("file://fileserver/share/game.3ds");
        assert!(matches!(
            handle.target(),
            Err(ResolveError::UnsupportedAuthority(host)) if host == "fileserver"
        ));
    }

    #[test]
    fn content_document_uri() {
        let handle = ResourceHandle::new(
            "content://com.android.externalstorage.documents/document/primary%3AGames%2Fgame.3ds",
        );
        assert_eq!(
            handle.target().unwrap(),
            HandleTarget::Document {
                authority: EXTERNAL_STORAGE_AUTHORITY.to_string(),
                document_id: "primary:Games/game.3ds".to_string(),
            }
        );
    }

    #[test]
    fn content_tree_document_uri() {
        let handle = ResourceHandle::new(
            "content://com.android.externalstorage.documents/tree/primary%3AGames/document/primary%3AGames%2Fpokemon.cia",
        );
        match handle.target().unwrap() {
            HandleTarget::Document { document_id, .. } => {
                assert_eq!(document_id, "primary:Games/pokemon.cia")
            }
            other => panic!("unexpected target: {:?}", other),
        }
    }

    #[test]
    fn content_uri_without_document_segment_is_malformed() {
        let handle = ResourceHandle::new("content://media/external/images/12");
        assert!(matches!(
            handle.target(),
            Err(ResolveError::MalformedDocumentId(_))
        ));
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let handle = ResourceHandle::new("https://example.com/game.3ds");
        assert!(matches!(
            handle.target(),
            Err(ResolveError::UnsupportedScheme(scheme)) if scheme == "https"
        ));
    }

    #[test]
    fn dialog_path_becomes_handle() {
        let handle = ResourceHandle::from_path(Path::new("/home/user/Games/game.3ds")).unwrap();
        assert_eq!(handle.as_str(), "/home/user/Games/game.3ds");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_dialog_path_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/games/\xFFzelda.3ds"));
        assert!(matches!(
            ResourceHandle::from_path(path),
            Err(ResolveError::NonUtf8Path(_))
        ));
    }

    #[test]
    fn invalid_utf8_escape_is_rejected() {
        let handle = ResourceHandle::new("file:///games/%FF.3ds");
        assert!(matches!(handle.target(), Err(ResolveError::NonUtf8Path(_))));
    }
}
