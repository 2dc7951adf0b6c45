//! One JSON file per scenario inside a calibration directory

use super::record::CalibrationRecord;
use super::traits::{
    validate_scenario_name, CalibrationResult, CalibrationStore, OpenStore,
};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Directory-backed calibration store
///
/// Each scenario `name` lives at `<root>/<name>.json`. Writes go to a
/// sibling temporary file and are renamed into place, so a reader never
/// sees a half-written record.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, scenario: &str) -> CalibrationResult<PathBuf> {
        validate_scenario_name(scenario)?;
        Ok(self.root.join(format!("{}.{}", scenario, EXTENSION)))
    }
}

impl OpenStore for DirectoryStore {
    fn open(path: impl AsRef<Path>) -> CalibrationResult<Self> {
        let root = path.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }
}

impl CalibrationStore for DirectoryStore {
    fn load(&self, scenario: &str) -> CalibrationResult<Option<CalibrationRecord>> {
        let path = self.record_path(scenario)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        CalibrationRecord::parse_for(scenario, &text).map(Some)
    }

    fn save(&self, scenario: &str, record: &CalibrationRecord) -> CalibrationResult<()> {
        let path = self.record_path(scenario)?;
        let tmp = path.with_extension(format!("{}.tmp", EXTENSION));
        fs::write(&tmp, record.to_json()?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// A file that exists counts as recorded, even if it no longer parses
    fn contains(&self, scenario: &str) -> CalibrationResult<bool> {
        Ok(self.record_path(scenario)?.is_file())
    }

    fn list(&self) -> CalibrationResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_scenario_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
