//! Workflow session
//!
//! One `Workflow` per script invocation: it knows the workflow's directories
//! and owns the results being accumulated for Alfred.

use std::path::{Path, PathBuf};

use crate::backends::mdfind;
use crate::core::error::{Result, WorkflowError};
use crate::core::model::{ItemOptions, ResultEntry, ResultList};
use crate::core::paths::{self, StoragePaths};
use crate::core::render::{self, Payload};
use crate::workflow::bundle::{read_bundle_id, INFO_PLIST};

#[derive(Debug, Clone)]
pub struct Workflow {
    bundle: String,
    home: PathBuf,
    working_dir: PathBuf,
    cache_dir: PathBuf,
    data_dir: PathBuf,
    results: ResultList,
}

impl Workflow {
    /// Start a session for the current user and working directory.
    ///
    /// `bundle_id` overrides the one in `info.plist`.
    pub fn new(bundle_id: Option<&str>) -> Result<Self> {
        let home = dirs::home_dir().ok_or(WorkflowError::HomeNotFound)?;
        let working_dir = std::env::current_dir().map_err(|e| WorkflowError::io(".", e))?;
        Self::with_dirs(bundle_id, home, working_dir)
    }

    /// Start a session with explicit home and working directories.
    ///
    /// Creates the cache and data directories if they do not exist.
    pub fn with_dirs(
        bundle_id: Option<&str>,
        home: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let home = home.into();
        let working_dir = working_dir.into();

        let bundle = match bundle_id {
            Some(id) => id.to_string(),
            None => {
                let plist = working_dir.join(INFO_PLIST);
                let from_plist = if plist.exists() {
                    read_bundle_id(&plist)?
                } else {
                    None
                };
                from_plist.ok_or(WorkflowError::MissingBundleId)?
            }
        };

        let cache_dir = paths::cache_dir(&home, &bundle);
        let data_dir = paths::data_dir(&home, &bundle);
        for dir in [&cache_dir, &data_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| WorkflowError::io(dir, e))?;
                tracing::debug!(dir = %dir.display(), "created workflow directory");
            }
        }

        Ok(Self {
            bundle,
            home,
            working_dir,
            cache_dir,
            data_dir,
            results: ResultList::new(),
        })
    }

    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Results accumulated so far, in insertion order
    pub fn results(&self) -> &ResultList {
        &self.results
    }

    pub fn storage_paths(&self, filename: impl Into<String>) -> StoragePaths {
        StoragePaths::new(
            &self.cache_dir,
            &self.data_dir,
            &self.working_dir,
            filename,
        )
    }

    /// Where `filename` should be read from or written to
    pub fn storage_path(&self, filename: &str) -> PathBuf {
        self.storage_paths(filename).storage_path()
    }

    /// Record a result and return it as normalized
    pub fn add_result(&mut self, options: ItemOptions) -> ResultEntry {
        self.results.add_result(options)
    }

    /// Render the accumulated results, or `payload` when there are none.
    /// `Ok(None)` means there is nothing to show.
    pub fn to_xml(&self, payload: impl Into<Payload>) -> Result<Option<String>> {
        render::to_xml(&self.results, payload.into())
    }

    /// Search the Spotlight index
    pub fn mdfind(&self, query: &str) -> Result<Vec<String>> {
        mdfind::mdfind(query)
    }
}
