//! Crash-safe file replacement.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Writes `contents` to `path` via temp file + rename.
///
/// With `fsync` set, the temp file and its parent directory are synced so
/// the rename survives a crash. Readers never observe a partial file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8], fsync: bool) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");

    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(contents)?;
        if fsync {
            file.sync_all()?;
        }
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    // fsync parent directory (Unix-specific for crash safety)
    #[cfg(unix)]
    if fsync {
        if let Some(parent) = path.parent() {
            if let Ok(dir_file) = File::open(parent) {
                let _ = dir_file.sync_all();
            }
        }
    }

    Ok(())
}
