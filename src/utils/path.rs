//! Path helpers for command-line arguments.

use std::path::{Path, PathBuf};

pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

/// Output folder of one project when several projects share `base`.
pub fn project_output_dir(base: &Path, project_id: &str, multi: bool) -> PathBuf {
    if multi {
        base.join(project_id)
    } else {
        base.to_path_buf()
    }
}
