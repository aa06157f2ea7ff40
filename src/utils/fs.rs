use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Writes `bytes` to a temp file next to `path`, syncs it and renames it
/// over the target. On failure the previous file is left as it was.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> AppResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|err| AppError::io(dir, err))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|err| AppError::io(path, err))?;
    temp.write_all(bytes).map_err(|err| AppError::io(path, err))?;
    temp.as_file()
        .sync_all()
        .map_err(|err| AppError::io(path, err))?;
    temp.persist(path)
        .map_err(|err| AppError::io(path, err.error))?;

    debug!(target: "app::io", path = %path.display(), bytes = bytes.len(), "file written");
    Ok(())
}

/// Reads a file, returning `None` when it does not exist.
pub fn read_optional(path: &Path) -> AppResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(AppError::io(path, err)),
    }
}

pub fn read(path: &Path) -> AppResult<Vec<u8>> {
    fs::read(path).map_err(|err| AppError::io(path, err))
}
