//! Config-file baseline store.
//!
//! Implements [`BaselinePort`] on top of the JSON config file: the
//! `baseline` section holds the single persisted record and every other
//! section is carried through untouched.
//!
//! Writes go to `<file>.tmp`, are fsynced, then renamed over the original,
//! so a crash mid-write leaves either the old or the new file, never a
//! torn one.  A stray `.tmp` is simply overwritten by the next commit.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use log::info;
use serde_json::{Map, Value};

use crate::app::ports::BaselinePort;
use crate::baseline::Baseline;
use crate::config::BaselineRecord;
use crate::error::PersistError;

const BASELINE_KEY: &str = "baseline";

pub struct ConfigFileStore {
    path: PathBuf,
}

impl ConfigFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(ToOwned::to_owned).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_document(&self) -> Result<Map<String, Value>, PersistError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(PersistError::Corrupted),
        }
    }

    fn write_atomically(&self, bytes: &[u8]) -> Result<(), PersistError> {
        let tmp = self.tmp_path();
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl BaselinePort for ConfigFileStore {
    fn load(&self) -> Result<Option<Baseline>, PersistError> {
        let doc = self.read_document()?;
        match doc.get(BASELINE_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(section) => {
                let record: BaselineRecord =
                    serde_json::from_value(section.clone()).map_err(|_| PersistError::Corrupted)?;
                Ok(record.to_baseline())
            }
        }
    }

    fn save(&mut self, baseline: &Baseline) -> Result<(), PersistError> {
        let mut doc = self.read_document()?;
        let record = serde_json::to_value(BaselineRecord::from(baseline)).map_err(|_| PersistError::Encode)?;
        doc.insert(BASELINE_KEY.into(), record);

        let bytes = serde_json::to_vec_pretty(&Value::Object(doc)).map_err(|_| PersistError::Encode)?;
        self.write_atomically(&bytes)?;
        info!("Baseline updated in {}", self.path.display());
        Ok(())
    }
}
