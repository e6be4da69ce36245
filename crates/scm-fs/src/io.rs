//! Filesystem probes and destructive workspace operations

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::{Error, Result};

/// Check whether `path` exists.
///
/// A missing path is `Ok(false)`. Denied access is reported as
/// [`Error::PermissionDenied`] rather than folded into "missing".
pub fn probe_exists(path: &Path) -> Result<bool> {
    match path.try_exists() {
        Ok(found) => Ok(found),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(Error::PermissionDenied {
            path: path.to_path_buf(),
            source: e,
        }),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Delete `path` and everything below it.
///
/// Deleting a path that does not exist succeeds. Symlinks are removed,
/// never followed.
pub fn remove_tree(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::io(path, e)),
    };

    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(|e| Error::io(path, e))?;
    } else {
        fs::remove_file(path).map_err(|e| Error::io(path, e))?;
    }
    tracing::debug!(path = %path.display(), "Removed workspace tree");
    Ok(())
}
