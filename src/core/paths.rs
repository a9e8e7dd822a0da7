//! Storage path utilities
//!
//! Alfred keeps per-workflow data under two directories in the user's home,
//! namespaced by bundle id. Settings files are looked up in the workflow's
//! working directory first, then the data and cache directories.

use std::path::{Path, PathBuf};

/// Volatile per-workflow data, relative to `$HOME`
pub const CACHE_PATH: &str = "Library/Caches/com.runningwithcrayons.Alfred-2/Workflow Data";

/// Persistent per-workflow data, relative to `$HOME`
pub const DATA_PATH: &str = "Library/Application Support/Alfred 2/Workflow Data";

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Cache directory for a workflow
pub fn cache_dir(home: &Path, bundle: &str) -> PathBuf {
    home.join(CACHE_PATH).join(bundle)
}

/// Data directory for a workflow
pub fn data_dir(home: &Path, bundle: &str) -> PathBuf {
    home.join(DATA_PATH).join(bundle)
}

/// Return `dir/filename` for the first candidate where that file exists,
/// otherwise `fallback/filename` (which need not exist yet).
pub fn resolve_storage_path<P: AsRef<Path>>(
    candidates: &[P],
    filename: &str,
    fallback: &Path,
) -> PathBuf {
    for dir in candidates {
        let path = dir.as_ref().join(filename);
        if path.exists() {
            tracing::debug!(path = %path.display(), "found existing storage file");
            return path;
        }
    }

    let path = fallback.join(filename);
    tracing::debug!(path = %path.display(), "no existing storage file; using fallback");
    path
}

/// The directories a workflow may keep a given file in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub cache_dir: PathBuf,
    pub data_dir: PathBuf,
    pub working_dir: PathBuf,
    pub filename: String,
}

impl StoragePaths {
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            data_dir: data_dir.into(),
            working_dir: working_dir.into(),
            filename: filename.into(),
        }
    }

    /// Where to read/write the file: working dir, data dir, cache dir, in that
    /// order; the data dir when none has it.
    pub fn storage_path(&self) -> PathBuf {
        resolve_storage_path(
            &[&self.working_dir, &self.data_dir, &self.cache_dir],
            &self.filename,
            &self.data_dir,
        )
    }
}
