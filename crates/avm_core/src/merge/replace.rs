//! Swapping a merged file into the original's place.
//!
//! Only called after a verified encode. The original is deleted first and
//! the staging file renamed second, so on any failure the staging file is
//! still on disk.

use std::fs;
use std::path::Path;

use super::errors::ReplaceError;

/// Replace `source` with `staging`, ending at `final_path`.
///
/// Refuses to run when `final_path` is a different existing file, before
/// anything is deleted.
pub fn commit(source: &Path, staging: &Path, final_path: &Path) -> Result<(), ReplaceError> {
    if final_path.exists() && !same_file(source, final_path) {
        return Err(ReplaceError::Collision(final_path.to_path_buf()));
    }

    fs::remove_file(source).map_err(ReplaceError::Delete)?;
    fs::rename(staging, final_path).map_err(ReplaceError::Rename)?;

    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
