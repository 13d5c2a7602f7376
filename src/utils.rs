//! Durable filesystem primitives
//!
//! Persistence adapters write through [`atomic_write_file`] so a crash leaves
//! either the previous contents or the new contents on disk, never a torn
//! write, and read through [`read_file_limited`] so a corrupt or hostile file
//! cannot balloon memory.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use uuid::Uuid;

/// Writes `bytes` to `path` atomically.
///
/// The data lands in a temporary file in the target directory (same
/// filesystem, so the final rename is atomic), is flushed to disk, and is
/// then renamed over the destination. The temporary file is removed on any
/// failure.
pub fn atomic_write_file(path: &Path, bytes: &[u8], mode: u32) -> io::Result<()> {
    let directory = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "target path has no parent")
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "target path has no name"))?;

    let tmp_path = directory.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let result = (|| {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(mode))?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Reads at most `max_bytes` from `path`.
///
/// Both a pre-flight size check and a limited reader guard the bound, so a
/// file that grows between stat and read still cannot exceed the limit, and
/// no buffer larger than the limit is ever allocated.
pub fn read_file_limited(path: &Path, max_bytes: u64) -> io::Result<Vec<u8>> {
    let metadata = fs::metadata(path)?;
    if metadata.len() > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("file exceeds the {} byte read limit", max_bytes),
        ));
    }

    let file = File::open(path)?;
    let mut buffer = Vec::new();
    let mut limited = file.take(max_bytes + 1);
    limited.read_to_end(&mut buffer)?;

    if buffer.len() as u64 > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("file exceeds the {} byte read limit", max_bytes),
        ));
    }
    Ok(buffer)
}
