//! Runs scenarios against their attempt budgets

use super::plan::{TrialPlan, DEFAULT_ACCEPT_PROB};
use super::registry::{Scenario, ScenarioKind, ScenarioRegistry};
use super::{OracleError, OracleResult};
use crate::calibration::CalibrationStore;
use tracing::{debug, info, warn};

/// A scenario that passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleVerdict {
    /// Attempts actually run
    pub attempts: u64,
    /// Attempts that were allowed
    pub budget: u64,
}

/// Raw success count over a fixed number of attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveyReport {
    pub successes: u64,
    pub attempts: u64,
}

impl SurveyReport {
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.successes as f64 / self.attempts as f64
    }
}

/// Decides pass/fail for randomized scenarios using stored calibrations
pub struct SequentialOracle<'a> {
    store: &'a dyn CalibrationStore,
    accept_prob: f64,
}

impl<'a> SequentialOracle<'a> {
    pub fn new(store: &'a dyn CalibrationStore) -> Self {
        Self {
            store,
            accept_prob: DEFAULT_ACCEPT_PROB,
        }
    }

    pub fn with_accept_prob(mut self, accept_prob: f64) -> Self {
        self.accept_prob = accept_prob;
        self
    }

    pub fn accept_prob(&self) -> f64 {
        self.accept_prob
    }

    /// Attempt budget for a calibrated scenario
    pub fn plan(&self, scenario: &str) -> OracleResult<TrialPlan> {
        let record = self
            .store
            .load(scenario)?
            .ok_or_else(|| OracleError::Uncalibrated(scenario.to_string()))?;
        TrialPlan::from_record(&record, self.accept_prob)
    }

    pub fn run(&self, scenario: &Scenario) -> OracleResult<OracleVerdict> {
        match scenario.kind() {
            ScenarioKind::Calibrated { .. } => self.run_calibrated(scenario),
            ScenarioKind::Perfect { runs } => self.run_perfect(scenario, runs),
        }
    }

    /// Run every scenario, in registration order
    pub fn run_all(&self, registry: &ScenarioRegistry) -> Vec<(String, OracleResult<OracleVerdict>)> {
        registry
            .iter()
            .map(|s| (s.name().to_string(), self.run(s)))
            .collect()
    }

    /// Count successes over `attempts` trials without judging them
    pub fn survey(&self, scenario: &Scenario, attempts: u64) -> OracleResult<SurveyReport> {
        let mut successes = 0;
        for _ in 0..attempts {
            if trial(scenario)? {
                successes += 1;
            }
        }
        info!(
            scenario = scenario.name(),
            successes, attempts, "survey complete"
        );
        Ok(SurveyReport {
            successes,
            attempts,
        })
    }

    fn run_calibrated(&self, scenario: &Scenario) -> OracleResult<OracleVerdict> {
        let plan = self.plan(scenario.name())?;
        debug!(scenario = scenario.name(), budget = plan.attempts, "running calibrated scenario");

        for attempt in 1..=plan.attempts {
            if trial(scenario)? {
                info!(scenario = scenario.name(), attempt, budget = plan.attempts, "passed");
                return Ok(OracleVerdict {
                    attempts: attempt,
                    budget: plan.attempts,
                });
            }
        }

        warn!(
            scenario = scenario.name(),
            tts = plan.attempts,
            residual = plan.residual,
            "no success within budget"
        );
        Err(OracleError::Exhausted {
            scenario: scenario.name().to_string(),
            tts: plan.attempts,
            residual: plan.residual,
        })
    }

    fn run_perfect(&self, scenario: &Scenario, runs: u64) -> OracleResult<OracleVerdict> {
        for attempt in 1..=runs {
            if !trial(scenario)? {
                warn!(scenario = scenario.name(), attempt, runs, "perfect scenario failed");
                return Err(OracleError::PerfectRunFailed {
                    scenario: scenario.name().to_string(),
                    attempt,
                    runs,
                });
            }
        }
        info!(scenario = scenario.name(), runs, "passed");
        Ok(OracleVerdict {
            attempts: runs,
            budget: runs,
        })
    }
}

fn trial(scenario: &Scenario) -> OracleResult<bool> {
    scenario.run_trial().map_err(|source| OracleError::Trial {
        scenario: scenario.name().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{CalibrationRecord, MemoryStore};
    use crate::solver::{HarnessError, HarnessResult};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn store_with(name: &str, s: u64, n: u64) -> MemoryStore {
        let store = MemoryStore::new();
        store.save(name, &CalibrationRecord::new(s, n).unwrap()).unwrap();
        store
    }

    /// Fails `failures` times, then succeeds forever; returns the call counter
    fn succeed_after(
        failures: u64,
    ) -> (Arc<AtomicU64>, impl Fn() -> HarnessResult<bool> + Send + Sync + 'static) {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let trial = move || -> HarnessResult<bool> {
            Ok(counter.fetch_add(1, Ordering::SeqCst) >= failures)
        };
        (calls, trial)
    }

    #[test]
    fn uncalibrated_scenario_refuses_to_run() {
        let store = MemoryStore::new();
        let oracle = SequentialOracle::new(&store);
        let scenario = Scenario::calibrated("fresh", 1, || Ok(true));
        assert!(matches!(
            oracle.run(&scenario),
            Err(OracleError::Uncalibrated(name)) if name == "fresh"
        ));
    }

    #[test]
    fn stops_at_first_success() {
        let store = store_with("s", 1, 2);
        let oracle = SequentialOracle::new(&store);
        let (calls, f) = succeed_after(3);
        let scenario = Scenario::calibrated("s", 1, f);

        let verdict = oracle.run(&scenario).unwrap();
        assert_eq!(verdict, OracleVerdict { attempts: 4, budget: 14 });
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn exhaustion_reports_budget_and_residual() {
        let store = store_with("s", 9997, 10000);
        let oracle = SequentialOracle::new(&store);
        let (calls, f) = succeed_after(u64::MAX);
        let scenario = Scenario::calibrated("s", 1, f);

        let err = oracle.run(&scenario).unwrap_err();
        let msg = err.to_string();
        match err {
            OracleError::Exhausted { tts, residual, .. } => {
                assert_eq!(tts, 2);
                assert!(residual < 1e-4);
                assert!(msg.contains(&format!("{residual:.3e}")), "{msg}");
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn exhaustion_message_states_expected_rate() {
        let err = OracleError::Exhausted {
            scenario: "s".into(),
            tts: 2,
            residual: 9e-8,
        };
        let msg = err.to_string();
        assert!(msg.contains("took 2 tries"), "{msg}");
        assert!(msg.contains("9.000e-8"), "{msg}");
    }

    #[test]
    fn perfect_scenario_runs_exactly_n() {
        let store = MemoryStore::new();
        let oracle = SequentialOracle::new(&store);
        let (calls, f) = succeed_after(0);
        let scenario = Scenario::perfect("p", 5, f);

        assert_eq!(oracle.run(&scenario).unwrap(), OracleVerdict { attempts: 5, budget: 5 });
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn perfect_scenario_fails_on_first_failure() {
        let store = MemoryStore::new();
        let oracle = SequentialOracle::new(&store);
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let scenario = Scenario::perfect("p", 5, move || {
            Ok(counter.fetch_add(1, Ordering::SeqCst) != 2)
        });

        assert!(matches!(
            oracle.run(&scenario),
            Err(OracleError::PerfectRunFailed { attempt: 3, runs: 5, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn trial_errors_propagate() {
        let store = store_with("s", 1, 2);
        let oracle = SequentialOracle::new(&store);
        let scenario = Scenario::calibrated("s", 1, || {
            Err(HarnessError::Other("solver crashed".into()))
        });
        assert!(matches!(oracle.run(&scenario), Err(OracleError::Trial { .. })));
    }

    #[test]
    fn stricter_accept_prob_grows_budget() {
        let store = store_with("s", 1, 2);
        let loose = SequentialOracle::new(&store).with_accept_prob(1e-2);
        let strict = SequentialOracle::new(&store).with_accept_prob(1e-8);
        assert!(loose.plan("s").unwrap().attempts < strict.plan("s").unwrap().attempts);
    }

    #[test]
    fn run_all_reports_each_scenario() {
        let store = store_with("cal", 1, 2);
        let oracle = SequentialOracle::new(&store);
        let registry = ScenarioRegistry::new()
            .with(Scenario::calibrated("cal", 1, || Ok(true)))
            .unwrap()
            .with(Scenario::calibrated("missing", 1, || Ok(true)))
            .unwrap()
            .with(Scenario::perfect("perfect", 2, || Ok(true)))
            .unwrap();

        let results = oracle.run_all(&registry);
        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(OracleError::Uncalibrated(_))));
        assert!(results[2].1.is_ok());
    }

    #[test]
    fn survey_counts_successes() {
        let store = MemoryStore::new();
        let oracle = SequentialOracle::new(&store);
        let (_, f) = succeed_after(3);
        let scenario = Scenario::calibrated("s", 1, f);

        let report = oracle.survey(&scenario, 10).unwrap();
        assert_eq!(report, SurveyReport { successes: 7, attempts: 10 });
        assert!((report.success_rate() - 0.7).abs() < 1e-12);
    }
}
