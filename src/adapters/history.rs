//! Append-only text logs (baseline history, result history).

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app::ports::{HistoryLog, LogTarget};
use crate::config::LogPaths;
use crate::error::PersistError;

pub struct FileHistoryLog {
    baseline_log: PathBuf,
    result_log: PathBuf,
}

impl FileHistoryLog {
    pub fn new(paths: &LogPaths) -> Self {
        Self {
            baseline_log: paths.baseline_log.clone(),
            result_log: paths.result_log.clone(),
        }
    }

    fn path(&self, target: LogTarget) -> &Path {
        match target {
            LogTarget::Baseline => &self.baseline_log,
            LogTarget::Results => &self.result_log,
        }
    }
}

impl HistoryLog for FileHistoryLog {
    fn append(&mut self, target: LogTarget, line: &str) -> Result<(), PersistError> {
        let path = self.path(target);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}
