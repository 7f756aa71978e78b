//! On-disk layout of the provisioned data tree.
//!
//! ```text
//! {root}/{run}/volumes/{service}/{logical volume}
//! {root}/logs/{run}.{n}
//! ```

use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{IspawnError, Result};

/// Path arithmetic over one namespace's data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Layout rooted at `$HOME/.ispawn/user/{namespace}`.
    #[must_use]
    pub fn for_namespace(namespace: &str) -> Self {
        Self::at(constants::user_data_root(namespace))
    }

    /// Layout rooted at an explicit directory.
    #[must_use]
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory owned by one run.
    #[must_use]
    pub fn run_dir(&self, run: &str) -> PathBuf {
        self.root.join(run)
    }

    /// Host directory backing one logical volume of one service.
    #[must_use]
    pub fn volume_dir(&self, run: &str, service: &str, logical: &str) -> PathBuf {
        self.run_dir(run).join("volumes").join(service).join(logical)
    }

    /// Directory holding every run's numbered log directories.
    #[must_use]
    pub fn logs_root(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Log directory number `n` of a run.
    #[must_use]
    pub fn log_dir(&self, run: &str, n: u32) -> PathBuf {
        self.logs_root().join(format!("{run}.{n}"))
    }

    /// Returns the existing log directory numbers of a run, ascending.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the logs root exists but cannot be read.
    pub fn log_indices(&self, run: &str) -> Result<Vec<u32>> {
        let logs = self.logs_root();
        if !logs.is_dir() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&logs).map_err(|e| IspawnError::io(&logs, e))?;
        let prefix = format!("{run}.");
        let mut indices: Vec<u32> = entries
            .filter_map(std::result::Result::ok)
            .filter(|e| e.path().is_dir())
            .filter_map(|e| {
                e.file_name()
                    .to_str()
                    .and_then(|name| name.strip_prefix(&prefix))
                    .and_then(|n| n.parse().ok())
            })
            .collect();
        indices.sort_unstable();
        Ok(indices)
    }

    /// Returns the most recent log directory of a run, if any.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the logs root cannot be read.
    pub fn latest_log_dir(&self, run: &str) -> Result<Option<PathBuf>> {
        Ok(self
            .log_indices(run)?
            .last()
            .map(|n| self.log_dir(run, *n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_dir_is_scoped_by_run_and_service() {
        let layout = DataLayout::at("/data/ispawn");
        assert_eq!(
            layout.volume_dir("a", "jupyter", "ipython"),
            PathBuf::from("/data/ispawn/a/volumes/jupyter/ipython")
        );
    }

    #[test]
    fn log_dir_is_numbered() {
        let layout = DataLayout::at("/data/ispawn");
        assert_eq!(layout.log_dir("a", 3), PathBuf::from("/data/ispawn/logs/a.3"));
    }

    #[test]
    fn log_indices_ignore_other_runs_and_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let layout = DataLayout::at(tmp.path());
        for name in ["a.1", "a.10", "a.2", "ab.4", "b.1"] {
            std::fs::create_dir_all(layout.logs_root().join(name)).expect("mkdir");
        }
        std::fs::write(layout.logs_root().join("a.7"), "").expect("file");

        assert_eq!(layout.log_indices("a").expect("scan"), vec![1, 2, 10]);
        assert_eq!(
            layout.latest_log_dir("a").expect("scan"),
            Some(layout.log_dir("a", 10))
        );
    }

    #[test]
    fn log_indices_empty_without_logs_root() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let layout = DataLayout::at(tmp.path().join("missing"));
        assert!(layout.log_indices("a").expect("scan").is_empty());
        assert_eq!(layout.latest_log_dir("a").expect("scan"), None);
    }
}
