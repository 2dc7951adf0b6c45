//! Interrupt responsiveness of long-running solver calls
//!
//! The harness starts a worker process that runs a long embedding, waits
//! for it to settle, sends it SIGINT, and reads its exit status:
//!
//! | exit | meaning |
//! |------|---------|
//! | 0    | the solver caught the interrupt and returned promptly |
//! | 1    | the solver returned, but only after its own timeout |
//! | 2 / signal | the interrupt escaped the solver |
//!
//! Interactive solvers are expected to exit 0; headless ones to exit 2.

use crate::solver::{SolverError, SolverOutput};
use std::ffi::OsString;
use std::process::{ExitStatus, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

pub const CLEAN_EXIT: i32 = 0;
pub const LATE_EXIT: i32 = 1;
pub const UNCAUGHT_EXIT: i32 = 2;

/// Whether this host can run the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptSupport {
    Supported,
    /// Signal delivery is not implemented for this platform
    Unsupported,
}

impl InterruptSupport {
    pub fn host() -> Self {
        static HOST: OnceLock<InterruptSupport> = OnceLock::new();
        *HOST.get_or_init(|| {
            if cfg!(unix) {
                InterruptSupport::Supported
            } else {
                InterruptSupport::Unsupported
            }
        })
    }

    pub fn is_supported(self) -> bool {
        self == InterruptSupport::Supported
    }
}

#[derive(Debug, Error)]
pub enum InterruptError {
    #[error("interrupt delivery is not supported on this platform")]
    Unsupported,

    #[error("failed to spawn worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("worker exited before it could be interrupted")]
    AlreadyExited,

    #[error("failed to deliver SIGINT: {0}")]
    Signal(String),

    #[error("worker did not exit within {0:?} of the interrupt")]
    JoinTimedOut(Duration),

    #[error("worker exited with unexpected code {0}")]
    UnexpectedExit(i32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type InterruptResult<T> = Result<T, InterruptError>;

/// How the worker responded to the interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptOutcome {
    CleanCancellation,
    LateCancellation,
    UncaughtInterrupt,
}

impl InterruptOutcome {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            CLEAN_EXIT => Some(Self::CleanCancellation),
            LATE_EXIT => Some(Self::LateCancellation),
            UNCAUGHT_EXIT => Some(Self::UncaughtInterrupt),
            _ => None,
        }
    }

    /// A status without an exit code means the worker died by signal
    pub fn from_status(status: ExitStatus) -> InterruptResult<Self> {
        match status.code() {
            Some(code) => Self::from_code(code).ok_or(InterruptError::UnexpectedExit(code)),
            None => Ok(Self::UncaughtInterrupt),
        }
    }
}

/// The worker process to interrupt
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    program: OsString,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// `sh -c <script>`
    pub fn shell(script: impl Into<OsString>) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptTiming {
    /// Delay between spawning the worker and interrupting it
    pub settle: Duration,
    /// How long to wait for the worker to exit after the interrupt
    pub join_bound: Duration,
}

impl Default for InterruptTiming {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(100),
            join_bound: Duration::from_secs(10),
        }
    }
}

impl InterruptTiming {
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_join_bound(mut self, join_bound: Duration) -> Self {
        self.join_bound = join_bound;
        self
    }
}

/// Spawn, settle, interrupt, join, classify
pub async fn run_interrupt_protocol(
    worker: &WorkerCommand,
    timing: &InterruptTiming,
) -> InterruptResult<InterruptOutcome> {
    if !InterruptSupport::host().is_supported() {
        return Err(InterruptError::Unsupported);
    }

    let mut child = worker.command().spawn().map_err(InterruptError::Spawn)?;
    let pid = child.id().ok_or(InterruptError::AlreadyExited)?;
    debug!(pid, settle = ?timing.settle, "worker started");

    sleep(timing.settle).await;
    send_sigint(pid).await?;

    match timeout(timing.join_bound, child.wait()).await {
        Ok(status) => {
            let status = status?;
            debug!(pid, ?status, "worker exited");
            InterruptOutcome::from_status(status)
        }
        Err(_) => {
            warn!(pid, bound = ?timing.join_bound, "worker ignored interrupt, killing");
            child.kill().await?;
            Err(InterruptError::JoinTimedOut(timing.join_bound))
        }
    }
}

async fn send_sigint(pid: u32) -> InterruptResult<()> {
    let pid = pid.to_string();
    let output = Command::new("kill")
        .args(["-s", "INT", pid.as_str()])
        .stdin(Stdio::null())
        .output()
        .await?;
    if output.status.success() {
        Ok(())
    } else {
        Err(InterruptError::Signal(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

/// Exit status a worker reports after its solver call returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    Clean,
    Late,
    Uncaught,
}

impl WorkerExit {
    /// An interrupt that escaped the call is uncaught. A call that returned
    /// only after `deadline` was late, and so was any other failure.
    pub fn classify<S, T>(
        result: &Result<SolverOutput<S, T>, SolverError>,
        elapsed: Duration,
        deadline: Duration,
    ) -> Self {
        match result {
            Err(SolverError::Interrupted) => WorkerExit::Uncaught,
            Err(_) => WorkerExit::Late,
            Ok(_) if elapsed > deadline => WorkerExit::Late,
            Ok(_) => WorkerExit::Clean,
        }
    }

    /// Time `call` and classify its result
    pub fn run<S, T, F>(deadline: Duration, call: F) -> Self
    where
        F: FnOnce() -> Result<SolverOutput<S, T>, SolverError>,
    {
        let start = Instant::now();
        let result = call();
        Self::classify(&result, start.elapsed(), deadline)
    }

    pub fn code(self) -> i32 {
        match self {
            WorkerExit::Clean => CLEAN_EXIT,
            WorkerExit::Late => LATE_EXIT,
            WorkerExit::Uncaught => UNCAUGHT_EXIT,
        }
    }
}
