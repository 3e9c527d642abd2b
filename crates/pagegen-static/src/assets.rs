//! Output directory reset and static asset copying.

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Errors that can occur while preparing the output directory.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to walk {path}: {message}")]
    Walk { path: String, message: String },

    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: String,
        #[source]
        source: io::Error,
    },
}

impl AssetError {
    fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        AssetError::Io {
            action,
            path: path.display().to_string(),
            source,
        }
    }

    /// Whether the failure happened while reading the source tree.
    pub fn is_read(&self) -> bool {
        matches!(self, AssetError::Walk { .. })
    }
}

/// Static asset utilities.
pub struct StaticAssets;

impl StaticAssets {
    /// Delete `output_dir` if present, then repopulate it.
    ///
    /// If `static_dir` is a directory it is copied recursively to `output_dir`
    /// and `on_copy` is called after each file lands. Otherwise an empty
    /// `output_dir` is created. Returns the number of files copied.
    pub fn reset_output<F>(
        static_dir: &Path,
        output_dir: &Path,
        on_copy: F,
    ) -> Result<usize, AssetError>
    where
        F: FnMut(&Path, &Path),
    {
        if output_dir.exists() {
            fs::remove_dir_all(output_dir).map_err(|e| AssetError::io("remove", output_dir, e))?;
            tracing::debug!("Removed {}", output_dir.display());
        }

        if static_dir.is_dir() {
            Self::copy_tree(static_dir, output_dir, on_copy)
        } else {
            fs::create_dir(output_dir).map_err(|e| AssetError::io("create", output_dir, e))?;
            Ok(0)
        }
    }

    /// Recursively copy `src` to `dst`, preserving permissions and timestamps.
    ///
    /// `dst` must not exist yet.
    pub fn copy_tree<F>(src: &Path, dst: &Path, mut on_copy: F) -> Result<usize, AssetError>
    where
        F: FnMut(&Path, &Path),
    {
        let mut copied = 0;
        // Directory metadata is applied after their contents are written.
        let mut dirs: Vec<(PathBuf, PathBuf)> = Vec::new();

        for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| AssetError::Walk {
                path: src.display().to_string(),
                message: e.to_string(),
            })?;

            let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
            let target = dst.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir(&target).map_err(|e| AssetError::io("create", &target, e))?;
                dirs.push((entry.path().to_path_buf(), target));
                continue;
            }

            copy_file(entry.path(), &target)?;
            on_copy(entry.path(), &target);
            copied += 1;
        }

        for (source, target) in dirs.iter().rev() {
            copy_dir_metadata(source, target)?;
        }

        Ok(copied)
    }
}

/// Copy one file with its permissions and timestamps.
pub fn copy_file(src: &Path, dst: &Path) -> Result<(), AssetError> {
    fs::copy(src, dst).map_err(|e| AssetError::io("copy", src, e))?;
    copy_times(src, dst)
}

/// Copy permissions and timestamps from directory `src` onto `dst`.
fn copy_dir_metadata(src: &Path, dst: &Path) -> Result<(), AssetError> {
    let metadata = fs::metadata(src).map_err(|e| AssetError::io("stat", src, e))?;
    fs::set_permissions(dst, metadata.permissions())
        .map_err(|e| AssetError::io("set permissions on", dst, e))?;

    // Not every platform lets a directory handle take new times.
    if let Err(e) = copy_times(src, dst) {
        tracing::debug!("Keeping fresh timestamps on {}: {}", dst.display(), e);
    }

    Ok(())
}

fn copy_times(src: &Path, dst: &Path) -> Result<(), AssetError> {
    let metadata = fs::metadata(src).map_err(|e| AssetError::io("stat", src, e))?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }

    // futimens only needs ownership, so read-only copies still take new times.
    #[cfg(unix)]
    let file = File::open(dst);
    #[cfg(not(unix))]
    let file = File::options().write(true).open(dst);

    let file = file.map_err(|e| AssetError::io("open", dst, e))?;
    file.set_times(times)
        .map_err(|e| AssetError::io("set times on", dst, e))
}
