//! Building blocks for command-line front ends
//!
//! The `embedcheck` binary covers everything that does not need a scenario
//! registry. A harness binary that owns one can flatten [`CalibrateArgs`]
//! into its own clap parser and hand off to [`run_calibration`].

use crate::calibration::{
    CalibrationError, CalibrationReport, CalibrationStore, Calibrator, DirectoryStore, OpenStore,
};
use crate::config::ConfigError;
use crate::graph::Graph;
use crate::oracle::ScenarioRegistry;
use crate::validate::{
    check_args, check_embedding, ChainConstraints, ChainMap, Embedding, PreflightResult,
    ValidationReport,
};
use clap::{Args, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed problem file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("problem file has no embedding to validate")]
    MissingEmbedding,

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type CliResult<T> = Result<T, CliError>;

/// An embedding problem on string-labelled graphs
///
/// ```json
/// {
///   "source": [["a", "b"]],
///   "target": [["0", "1"], ["1", "2"]],
///   "embedding": {"a": ["0"], "b": ["1", "2"]},
///   "restrict_chains": {"a": ["0", "1"]}
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemFile {
    pub source: Vec<(String, String)>,
    pub target: Vec<(String, String)>,
    /// Nodes with no edges
    #[serde(default)]
    pub source_nodes: Vec<String>,
    #[serde(default)]
    pub target_nodes: Vec<String>,
    pub embedding: Option<Embedding<String, String>>,
    pub fixed_chains: Option<ChainMap<String, String>>,
    pub initial_chains: Option<ChainMap<String, String>>,
    pub restrict_chains: Option<ChainMap<String, String>>,
    #[serde(default)]
    pub skip_initialization: bool,
}

impl ProblemFile {
    pub fn from_json(text: &str) -> CliResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> CliResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn source_graph(&self) -> Graph<String> {
        Graph::from_edges(self.source.iter().cloned()).with_nodes(self.source_nodes.iter().cloned())
    }

    pub fn target_graph(&self) -> Graph<String> {
        Graph::from_edges(self.target.iter().cloned()).with_nodes(self.target_nodes.iter().cloned())
    }

    pub fn constraints(&self) -> ChainConstraints<String, String> {
        ChainConstraints {
            fixed: self.fixed_chains.clone(),
            initial: self.initial_chains.clone(),
            restrict: self.restrict_chains.clone(),
            skip_initialization: self.skip_initialization,
        }
    }

    /// Run the embedding validator over the file's embedding
    pub fn validate(&self) -> CliResult<ValidationReport<String, String>> {
        let embedding = self.embedding.as_ref().ok_or(CliError::MissingEmbedding)?;
        Ok(check_embedding(
            &self.source_graph(),
            &self.target_graph(),
            embedding,
            &self.constraints(),
        ))
    }

    /// Run the argument validator over the file's graphs and constraints
    pub fn preflight(&self) -> PreflightResult<String, String> {
        check_args(&self.source_graph(), &self.target_graph(), &self.constraints())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CalibrateMode {
    /// Recalibrate every calibrated scenario
    All,
    /// Calibrate only scenarios without a record
    New,
}

/// `calibrate all|new [--batch-size M] [--baseline DIR]`
#[derive(Debug, Clone, Args)]
pub struct CalibrateArgs {
    #[arg(value_enum)]
    pub mode: CalibrateMode,
    /// Trials per unit of scenario multiplier
    #[arg(long)]
    pub batch_size: Option<u64>,
    /// Calibration directory to compare new rates against
    #[arg(long)]
    pub baseline: Option<PathBuf>,
}

fn calibrate(
    registry: &ScenarioRegistry,
    store: &dyn CalibrationStore,
    args: &CalibrateArgs,
) -> CliResult<Vec<CalibrationReport>> {
    let baseline = args.baseline.as_ref().map(DirectoryStore::open).transpose()?;

    let mut calibrator = Calibrator::new(store);
    if let Some(batch_size) = args.batch_size {
        calibrator = calibrator.with_batch_size(batch_size);
    }
    if let Some(baseline) = &baseline {
        calibrator = calibrator.with_baseline(baseline);
    }

    let reports = match args.mode {
        CalibrateMode::All => calibrator.calibrate_all(registry)?,
        CalibrateMode::New => calibrator.calibrate_new(registry)?,
    };
    Ok(reports)
}

/// Calibrate a registry and print a summary; returns the process exit code
pub fn run_calibration(
    registry: &ScenarioRegistry,
    store: &dyn CalibrationStore,
    args: &CalibrateArgs,
) -> i32 {
    let reports = match calibrate(registry, store, args) {
        Ok(reports) => reports,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if reports.is_empty() {
        println!("Nothing to calibrate.");
        return 0;
    }

    println!(
        "{:<32}  {:>10}  {:>10}  {:>8}  {:>12}  {:>8}",
        "SCENARIO", "SUCCESSES", "TRIALS", "RATE", "PER TRIAL", "STANDARD"
    );
    println!("{}", "-".repeat(90));
    for report in &reports {
        let standard = report
            .baseline
            .map(|b| format!("{:.2}%", b.success_rate() * 100.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<32}  {:>10}  {:>10}  {:>7.2}%  {:>12}  {:>8}",
            report.scenario,
            report.record.successes,
            report.record.trials,
            report.record.success_rate() * 100.0,
            format!("{:?}", report.per_trial()),
            standard
        );
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{CalibrationRecord, MemoryStore};
    use crate::oracle::Scenario;
    use crate::validate::{ErrorCode, PreflightError};
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        calibrate: CalibrateArgs,
    }

    const PATH3: &str = r#"{
        "source": [["a", "b"]],
        "target": [["0", "1"], ["1", "2"]],
        "embedding": {"a": ["0"], "b": ["1", "2"]}
    }"#;

    #[test]
    fn validates_problem_file() {
        let problem = ProblemFile::from_json(PATH3).unwrap();
        let report = problem.validate().unwrap();
        assert!(report.is_valid());
        assert!(problem.preflight().is_ok());
    }

    #[test]
    fn reports_broken_chain_from_file() {
        let mut problem = ProblemFile::from_json(PATH3).unwrap();
        problem.target_nodes.push("3".into());
        problem.embedding = Some(
            [
                ("a".to_string(), vec!["0".to_string()]),
                ("b".to_string(), vec!["1".to_string(), "3".to_string()]),
            ]
            .into_iter()
            .collect(),
        );
        let report = problem.validate().unwrap();
        assert_eq!(report.error_code(), Some(ErrorCode::BrokenChain));
    }

    #[test]
    fn isolated_nodes_make_graphs_disconnected() {
        let mut problem = ProblemFile::from_json(PATH3).unwrap();
        problem.source_nodes.push("c".into());
        assert!(matches!(
            problem.preflight(),
            Err(PreflightError::SourceDisconnected)
        ));
    }

    #[test]
    fn missing_embedding_is_an_error() {
        let problem = ProblemFile::from_json(r#"{"source": [], "target": []}"#).unwrap();
        assert!(matches!(problem.validate(), Err(CliError::MissingEmbedding)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ProblemFile::from_json(r#"{"source": [], "target": [], "tries": 3}"#).is_err());
    }

    #[test]
    fn parses_calibrate_args() {
        let cli = Harness::parse_from(["harness", "new", "--batch-size", "20"]);
        assert_eq!(cli.calibrate.mode, CalibrateMode::New);
        assert_eq!(cli.calibrate.batch_size, Some(20));
        assert_eq!(cli.calibrate.baseline, None);
    }

    #[test]
    fn run_calibration_writes_records() {
        let store = MemoryStore::new();
        let registry = ScenarioRegistry::new()
            .with(Scenario::calibrated("always", 1, || Ok(true)))
            .unwrap();
        let args = CalibrateArgs {
            mode: CalibrateMode::All,
            batch_size: Some(5),
            baseline: None,
        };

        assert_eq!(run_calibration(&registry, &store, &args), 0);
        assert_eq!(
            store.load("always").unwrap(),
            Some(CalibrationRecord { successes: 5, trials: 5 })
        );
    }

    #[test]
    fn baseline_directory_is_consulted() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = DirectoryStore::open(dir.path()).unwrap();
        baseline.save("always", &CalibrationRecord::new(1, 2).unwrap()).unwrap();

        let store = MemoryStore::new();
        let registry = ScenarioRegistry::new()
            .with(Scenario::calibrated("always", 1, || Ok(true)))
            .unwrap();
        let args = CalibrateArgs {
            mode: CalibrateMode::New,
            batch_size: Some(2),
            baseline: Some(dir.path().to_path_buf()),
        };
        let reports = calibrate(&registry, &store, &args).unwrap();
        assert_eq!(reports[0].baseline, Some(CalibrationRecord::new(1, 2).unwrap()));
    }
}
