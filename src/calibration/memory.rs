//! In-process calibration store

use super::record::CalibrationRecord;
use super::traits::{validate_scenario_name, CalibrationResult, CalibrationStore};
use dashmap::DashMap;

/// Calibration records held in memory
///
/// Useful for tests and for seeding an oracle from records computed in the
/// same process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, CalibrationRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<(String, CalibrationRecord)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (String, CalibrationRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl CalibrationStore for MemoryStore {
    fn load(&self, scenario: &str) -> CalibrationResult<Option<CalibrationRecord>> {
        validate_scenario_name(scenario)?;
        Ok(self.records.get(scenario).map(|r| *r.value()))
    }

    fn save(&self, scenario: &str, record: &CalibrationRecord) -> CalibrationResult<()> {
        validate_scenario_name(scenario)?;
        self.records.insert(scenario.to_string(), *record);
        Ok(())
    }

    fn list(&self) -> CalibrationResult<Vec<String>> {
        let mut names: Vec<String> = self.records.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }
}
