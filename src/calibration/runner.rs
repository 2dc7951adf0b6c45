//! Producing calibration records by running scenarios in bulk

use super::record::CalibrationRecord;
use super::traits::{CalibrationError, CalibrationResult, CalibrationStore};
use crate::oracle::{Scenario, ScenarioKind, ScenarioRegistry};
use std::time::{Duration, Instant};
use tracing::info;

/// Default number of trials per unit of scenario multiplier
pub const DEFAULT_BATCH_SIZE: u64 = 10_000;

/// Outcome of calibrating one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReport {
    pub scenario: String,
    pub record: CalibrationRecord,
    pub elapsed: Duration,
    /// Record found in the baseline store, if any
    pub baseline: Option<CalibrationRecord>,
}

impl CalibrationReport {
    pub fn per_trial(&self) -> Duration {
        let trials = u32::try_from(self.record.trials).unwrap_or(u32::MAX);
        self.elapsed / trials.max(1)
    }
}

/// Runs calibrated scenarios and writes their records to a store
pub struct Calibrator<'a> {
    store: &'a dyn CalibrationStore,
    baseline: Option<&'a dyn CalibrationStore>,
    batch_size: u64,
}

impl<'a> Calibrator<'a> {
    pub fn new(store: &'a dyn CalibrationStore) -> Self {
        Self {
            store,
            baseline: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Compare each new rate against records in another store
    pub fn with_baseline(mut self, baseline: &'a dyn CalibrationStore) -> Self {
        self.baseline = Some(baseline);
        self
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    /// Run `batch_size * multiplier` trials and store the result
    pub fn calibrate(&self, scenario: &Scenario) -> CalibrationResult<CalibrationReport> {
        let ScenarioKind::Calibrated { multiplier } = scenario.kind() else {
            return Err(CalibrationError::NotCalibratable(scenario.name().to_string()));
        };
        let name = scenario.name();
        let trials = self.batch_size.saturating_mul(multiplier);
        let record = CalibrationRecord::new(0, trials)?;

        info!(scenario = name, trials, "calibrating");
        let step = trials / 10;
        let start = Instant::now();
        let mut successes = 0;
        for i in 0..trials {
            if step > 0 && i > 0 && i % step == 0 {
                info!(scenario = name, "{}%", i / step * 10);
            }
            let ok = scenario
                .run_trial()
                .map_err(|source| CalibrationError::Trial {
                    scenario: name.to_string(),
                    source,
                })?;
            if ok {
                successes += 1;
            }
        }
        let elapsed = start.elapsed();

        let record = CalibrationRecord {
            successes,
            ..record
        };
        self.store.save(name, &record)?;

        let report = CalibrationReport {
            scenario: name.to_string(),
            record,
            elapsed,
            baseline: match self.baseline {
                Some(store) => store.load(name)?,
                None => None,
            },
        };
        info!(
            scenario = name,
            per_trial = ?report.per_trial(),
            "success rate {:.2}%",
            record.success_rate() * 100.0
        );
        if let Some(standard) = report.baseline {
            info!(
                scenario = name,
                "standard is {:.2}%",
                standard.success_rate() * 100.0
            );
        }
        Ok(report)
    }

    /// Recalibrate every calibrated scenario in the registry
    pub fn calibrate_all(&self, registry: &ScenarioRegistry) -> CalibrationResult<Vec<CalibrationReport>> {
        registry.calibrated().map(|s| self.calibrate(s)).collect()
    }

    /// Calibrate only scenarios the store has no record for
    pub fn calibrate_new(&self, registry: &ScenarioRegistry) -> CalibrationResult<Vec<CalibrationReport>> {
        let mut reports = Vec::new();
        for scenario in registry.calibrated() {
            if self.store.contains(scenario.name())? {
                continue;
            }
            reports.push(self.calibrate(scenario)?);
        }
        Ok(reports)
    }
}
