//! Named scenarios the oracle and calibrator iterate over

use super::{OracleError, OracleResult};
use crate::solver::HarnessResult;
use std::fmt;

/// One trial of a scenario: `Ok(true)` on success, `Ok(false)` on an
/// ordinary failure, `Err` on a defect or harness problem
pub type TrialFn = Box<dyn Fn() -> HarnessResult<bool> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    /// Retried under a calibrated budget; calibration runs
    /// `batch_size * multiplier` trials
    Calibrated { multiplier: u64 },
    /// Must succeed on every one of `runs` attempts
    Perfect { runs: u64 },
}

pub struct Scenario {
    name: String,
    kind: ScenarioKind,
    trial: TrialFn,
}

impl Scenario {
    pub fn calibrated<F>(name: impl Into<String>, multiplier: u64, trial: F) -> Self
    where
        F: Fn() -> HarnessResult<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: ScenarioKind::Calibrated { multiplier },
            trial: Box::new(trial),
        }
    }

    pub fn perfect<F>(name: impl Into<String>, runs: u64, trial: F) -> Self
    where
        F: Fn() -> HarnessResult<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: ScenarioKind::Perfect { runs },
            trial: Box::new(trial),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ScenarioKind {
        self.kind
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self.kind, ScenarioKind::Calibrated { .. })
    }

    pub fn run_trial(&self) -> HarnessResult<bool> {
        (self.trial)()
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Scenarios in registration order, names unique
#[derive(Debug, Default)]
pub struct ScenarioRegistry {
    scenarios: Vec<Scenario>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, scenario: Scenario) -> OracleResult<()> {
        if self.get(scenario.name()).is_some() {
            return Err(OracleError::DuplicateScenario(scenario.name));
        }
        self.scenarios.push(scenario);
        Ok(())
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, scenario: Scenario) -> OracleResult<Self> {
        self.register(scenario)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn calibrated(&self) -> impl Iterator<Item = &Scenario> {
        self.iter().filter(|s| s.is_calibrated())
    }

    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_registration_order() {
        let registry = ScenarioRegistry::new()
            .with(Scenario::calibrated("b", 1, || Ok(true)))
            .unwrap()
            .with(Scenario::perfect("a", 3, || Ok(true)))
            .unwrap();
        assert_eq!(registry.names(), vec!["b", "a"]);
        assert_eq!(registry.calibrated().count(), 1);
        assert_eq!(registry.get("a").unwrap().kind(), ScenarioKind::Perfect { runs: 3 });
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ScenarioRegistry::new();
        registry.register(Scenario::calibrated("x", 1, || Ok(true))).unwrap();
        let err = registry
            .register(Scenario::perfect("x", 1, || Ok(false)))
            .unwrap_err();
        assert!(matches!(err, OracleError::DuplicateScenario(name) if name == "x"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn trial_runs_the_closure() {
        let scenario = Scenario::calibrated("flip", 1, || Ok(false));
        assert!(!scenario.run_trial().unwrap());
        assert!(format!("{:?}", scenario).contains("flip"));
    }
}
