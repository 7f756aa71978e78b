//! Log lookup for a run: the engine log plus the files of the run's most
//! recent log directory.

use std::path::PathBuf;

use ispawn_common::error::{IspawnError, Result};
use ispawn_common::layout::DataLayout;

use crate::engine::Engine;

/// Logs gathered for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLogs {
    /// Engine log of the container, if the container still exists.
    pub engine: Option<String>,
    /// Most recent log directory of the run.
    pub dir: Option<PathBuf>,
    /// Files of that directory with their contents, sorted by path.
    pub files: Vec<(PathBuf, String)>,
}

/// Reads the files of the most recent log directory of `run`.
///
/// # Errors
///
/// Returns an I/O error if the directory or a file cannot be read.
pub fn read_latest(layout: &DataLayout, run: &str) -> Result<(Option<PathBuf>, Vec<(PathBuf, String)>)> {
    let Some(dir) = layout.latest_log_dir(run)? else {
        return Ok((None, Vec::new()));
    };
    let entries = std::fs::read_dir(&dir).map_err(|e| IspawnError::io(&dir, e))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();
    let files = paths
        .into_iter()
        .map(|p| {
            let bytes = std::fs::read(&p).map_err(|e| IspawnError::io(&p, e))?;
            Ok((p, String::from_utf8_lossy(&bytes).into_owned()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((Some(dir), files))
}

/// Collects the engine log and the latest log files of a run.
///
/// A container that no longer exists yields no engine log rather than an
/// error, so logs of removed runs stay readable.
///
/// # Errors
///
/// Returns an error if the engine or the log files cannot be read.
pub fn collect(engine: &Engine, layout: &DataLayout, container: &str, run: &str) -> Result<RunLogs> {
    let engine_log = match engine.backend().get_container(container)? {
        Some(_) => Some(engine.logs(container)?),
        None => None,
    };
    let (dir, files) = read_latest(layout, run)?;
    Ok(RunLogs {
        engine: engine_log,
        dir,
        files,
    })
}
