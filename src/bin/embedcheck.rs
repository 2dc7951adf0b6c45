//! embedcheck command-line tool for embedding checks and calibration records.
//!
//! Usage:
//!   embedcheck validate <problem.json>
//!   embedcheck preflight <problem.json>
//!   embedcheck plan <successes> <trials> [--accept-prob p]
//!   embedcheck records list|show <scenario> [--calibration-dir dir | --db path]
//!   embedcheck interrupt [--settle-ms n] [--join-ms n] -- <worker> [args...]

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use embedcheck::cli::ProblemFile;
use embedcheck::config::{ConfigResult, HarnessConfig};
use embedcheck::{
    run_interrupt_protocol, CalibrationRecord, CalibrationResult, CalibrationStore,
    DirectoryStore, InterruptTiming, OpenStore, SqliteStore, TrialPlan, WorkerCommand,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(
    name = "embedcheck",
    version,
    about = "Correctness oracle and calibrated test harness for minor-embedding solvers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Calibration directory (overrides config and environment)
    #[arg(long, global = true)]
    calibration_dir: Option<PathBuf>,
    /// Use a SQLite calibration database instead of a directory
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Check an embedding against its source and target graphs
    Validate {
        /// JSON problem file with an "embedding" entry
        file: PathBuf,
    },
    /// Check graphs and chain constraints before running a solver
    Preflight {
        /// JSON problem file
        file: PathBuf,
    },
    /// Attempt budget for a calibration record
    Plan {
        successes: u64,
        trials: u64,
        /// False-negative bound (defaults to the configured value)
        #[arg(long)]
        accept_prob: Option<f64>,
    },
    /// Inspect stored calibration records
    Records {
        #[command(subcommand)]
        action: RecordsAction,
    },
    /// Interrupt a worker process and classify how it exits
    Interrupt {
        /// Delay before the interrupt, in milliseconds
        #[arg(long, default_value_t = 100)]
        settle_ms: u64,
        /// How long to wait for the worker afterwards, in milliseconds
        #[arg(long, default_value_t = 10_000)]
        join_ms: u64,
        /// Worker program and arguments
        #[arg(required = true, last = true)]
        worker: Vec<String>,
    },
}

#[derive(Subcommand)]
enum RecordsAction {
    /// List recorded scenarios
    List,
    /// Show one record and its attempt budget
    Show {
        /// Scenario name
        scenario: String,
    },
}

enum Store {
    Directory(DirectoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    fn as_dyn(&self) -> &dyn CalibrationStore {
        match self {
            Store::Directory(store) => store,
            Store::Sqlite(store) => store,
        }
    }

    fn updated_at(&self, scenario: &str) -> CalibrationResult<Option<DateTime<Utc>>> {
        match self {
            Store::Directory(_) => Ok(None),
            Store::Sqlite(store) => store.updated_at(scenario),
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_config(cli: &Cli) -> ConfigResult<HarnessConfig> {
    let config = HarnessConfig::resolve(cli.config.as_deref())?;
    Ok(match &cli.calibration_dir {
        Some(dir) => config.with_calibration_dir(dir),
        None => config,
    })
}

fn open_store(config: &HarnessConfig, db: Option<&PathBuf>) -> Result<Store, String> {
    match db {
        Some(path) => SqliteStore::open(path)
            .map(Store::Sqlite)
            .map_err(|e| format!("Failed to open database: {}", e)),
        None => config
            .open_directory_store()
            .map(Store::Directory)
            .map_err(|e| format!("Failed to open calibration directory: {}", e)),
    }
}

fn cmd_validate(file: &Path) -> i32 {
    let problem = match ProblemFile::load(file) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let report = match problem.validate() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if let Some(warning) = &report.warning {
        eprintln!("Warning ({}): {}", warning.code(), warning);
    }
    match &report.rejection {
        None => {
            println!("valid");
            0
        }
        Some(rejection) => {
            println!("invalid ({}): {}", rejection.code(), rejection);
            1
        }
    }
}

fn cmd_preflight(file: &Path) -> i32 {
    let problem = match ProblemFile::load(file) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match problem.preflight() {
        Ok(()) => {
            println!("ok");
            0
        }
        Err(e) => {
            println!("rejected: {}", e);
            1
        }
    }
}

fn print_plan(record: &CalibrationRecord, accept_prob: f64) -> i32 {
    match TrialPlan::from_record(record, accept_prob) {
        Ok(plan) => {
            println!("success rate: {:.4}%", plan.success_rate * 100.0);
            println!("attempts:     {}", plan.attempts);
            println!("residual:     {:.3e} (accept {:.3e})", plan.residual, accept_prob);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_plan(config: &HarnessConfig, successes: u64, trials: u64, accept_prob: Option<f64>) -> i32 {
    let record = match CalibrationRecord::new(successes, trials) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    print_plan(&record, accept_prob.unwrap_or(config.accept_prob))
}

fn cmd_records_list(store: &Store) -> i32 {
    let names = match store.as_dyn().list() {
        Ok(names) => names,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if names.is_empty() {
        println!("No calibration records.");
        return 0;
    }
    println!("{:<40}  {:>10}  {:>10}  {:>8}", "SCENARIO", "SUCCESSES", "TRIALS", "RATE");
    println!("{}", "-".repeat(74));
    for name in names {
        match store.as_dyn().load(&name) {
            Ok(Some(record)) => println!(
                "{:<40}  {:>10}  {:>10}  {:>7.2}%",
                name,
                record.successes,
                record.trials,
                record.success_rate() * 100.0
            ),
            Ok(None) => {}
            Err(e) => println!("{:<40}  {}", name, e),
        }
    }
    0
}

fn cmd_records_show(store: &Store, config: &HarnessConfig, scenario: &str) -> i32 {
    let record = match store.as_dyn().load(scenario) {
        Ok(Some(record)) => record,
        Ok(None) => {
            eprintln!("Error: scenario '{}' is not calibrated", scenario);
            return 1;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    println!("scenario:     {}", scenario);
    println!("successes:    {}", record.successes);
    println!("trials:       {}", record.trials);
    if let Ok(Some(stamp)) = store.updated_at(scenario) {
        println!("updated:      {}", stamp.to_rfc3339());
    }
    print_plan(&record, config.accept_prob)
}

fn cmd_interrupt(settle_ms: u64, join_ms: u64, worker: &[String]) -> i32 {
    let Some((program, args)) = worker.split_first() else {
        eprintln!("Error: no worker command given");
        return 1;
    };
    let command = WorkerCommand::new(program).args(args);
    let timing = InterruptTiming::default()
        .with_settle(Duration::from_millis(settle_ms))
        .with_join_bound(Duration::from_millis(join_ms));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return 1;
        }
    };
    match rt.block_on(run_interrupt_protocol(&command, &timing)) {
        Ok(outcome) => {
            println!("{:?}", outcome);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match &cli.command {
        Commands::Validate { file } => cmd_validate(file),
        Commands::Preflight { file } => cmd_preflight(file),
        Commands::Plan {
            successes,
            trials,
            accept_prob,
        } => cmd_plan(&config, *successes, *trials, *accept_prob),
        Commands::Records { action } => {
            let store = match open_store(&config, cli.db.as_ref()) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            match action {
                RecordsAction::List => cmd_records_list(&store),
                RecordsAction::Show { scenario } => cmd_records_show(&store, &config, scenario),
            }
        }
        Commands::Interrupt {
            settle_ms,
            join_ms,
            worker,
        } => cmd_interrupt(*settle_ms, *join_ms, worker),
    };
    std::process::exit(code);
}
