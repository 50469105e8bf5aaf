//! Recent-file listing: finished artifacts in the download directory.
//!
//! Pure read of the directory at call time; files are not linked to jobs.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::humanize::{format_size, relative_time};

/// A finished artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadedFile {
    pub name: String,
    /// Relative time since last modification, e.g. "3 minutes ago".
    pub modified: String,
    /// Decimal size, e.g. "12.3M".
    pub size: String,
    pub size_bytes: u64,
}

/// Lists regular files in `dir` whose name ends with `.{extension}`,
/// most recently modified first. `now` is Unix seconds.
///
/// Symlinks are followed. Entries that vanish while the directory is being
/// read (downloader fragments, dangling links) are skipped; any other I/O
/// error fails the listing. Ties keep directory enumeration order.
pub fn list_recent_files(dir: &Path, extension: &str, now: i64) -> io::Result<Vec<DownloadedFile>> {
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let mut found: Vec<(SystemTime, DownloadedFile)> = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(&suffix) {
            continue;
        }
        let Some((meta, mtime)) = skip_vanished(&name, stat(&entry.path()))? else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let mtime_secs = mtime
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        found.push((
            mtime,
            DownloadedFile {
                name,
                modified: relative_time(now - mtime_secs),
                size: format_size(meta.len()),
                size_bytes: meta.len(),
            },
        ));
    }

    // Stable sort: equal mtimes stay in enumeration order.
    found.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(found.into_iter().map(|(_, file)| file).collect())
}

fn stat(path: &Path) -> io::Result<(fs::Metadata, SystemTime)> {
    let meta = fs::metadata(path)?;
    let mtime = meta.modified()?;
    Ok((meta, mtime))
}

fn skip_vanished<T>(name: &str, res: io::Result<T>) -> io::Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::trace!(file = %name, "entry vanished during listing");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
