//! Saving a local copy of a selected file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::DownloadError;
use crate::models::UploadFile;

/// Where downloads go when no directory is given: the platform download
/// folder, else the home directory.
pub fn default_download_dir() -> Option<PathBuf> {
    dirs::download_dir().or_else(dirs::home_dir)
}

/// Write the held bytes of `file` under its original name in `dir`.
///
/// Purely local. The bytes are staged in a temp file next to the target and
/// moved into place; the temp file is removed whether or not the move
/// succeeds. An existing file is never overwritten, a ` (n)` suffix is
/// added instead.
pub fn download(file: &UploadFile, dir: Option<&Path>) -> Result<PathBuf, DownloadError> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => default_download_dir().ok_or(DownloadError::NoDownloadDir)?,
    };
    std::fs::create_dir_all(&dir).map_err(|source| DownloadError::Io {
        path: dir.clone(),
        source,
    })?;

    let target = available_path(&dir, &file.name);
    write_staged(&dir, file.content(), &target)?;

    info!(path = %target.display(), bytes = file.size(), "saved download");
    Ok(target)
}

/// Stage `bytes` in a temp file inside `dir`, then move it to `target`
/// without clobbering. The temp file is dropped, and so deleted, on every
/// error path.
fn write_staged(dir: &Path, bytes: &[u8], target: &Path) -> Result<(), DownloadError> {
    let io_err = |source| DownloadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(io_err)?;
    staged.write_all(bytes).map_err(io_err)?;
    staged.flush().map_err(io_err)?;

    staged
        .persist_noclobber(target)
        .map_err(|e| DownloadError::Io {
            path: target.to_path_buf(),
            source: e.error,
        })?;
    Ok(())
}

/// First path in `dir` for `name` that does not exist yet.
fn available_path(dir: &Path, name: &str) -> PathBuf {
    let name = Path::new(name)
        .file_name()
        .map_or_else(|| "download".to_string(), |n| n.to_string_lossy().to_string());
    let candidate = dir.join(&name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(&name);
    let stem = path
        .file_stem()
        .map_or_else(|| name.clone(), |s| s.to_string_lossy().to_string());
    let ext = path.extension().map(|e| e.to_string_lossy().to_string());

    (1..)
        .map(|n| match &ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
