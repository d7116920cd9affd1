use crate::errors::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// A file may be written when it does not exist yet, or when `force` is set.
pub(crate) fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if !path.exists() || force {
        return Ok(());
    }
    Err(AppError::Export(format!(
        "'{}' already exists (use --force to overwrite)",
        path.display()
    )))
}

/// Create `dir` if needed and return the path of `file` inside it, checked
/// with `ensure_writable`.
pub(crate) fn output_path(dir: &Path, file: &str, force: bool) -> AppResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file);
    ensure_writable(&path, force)?;
    Ok(path)
}
