//! Practice-code grading.
//!
//! A submission passes when it compiles, runs, and prints exactly what the
//! instructor's test-case program prints. Both programs go through a
//! [`CodeRunner`]; [`ProcessCodeRunner`] runs them as child processes.

use std::{
    fmt,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Command,
    time::timeout,
};
use uuid::Uuid;

use crate::config::GraderConfig;

const SOURCE_FILE: &str = "Program.cs";
const OUTPUT_FILE: &str = "program.exe";

static ENTRY_POINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"static\s+(async\s+)?(void|int|Task(<int>)?)\s+Main\s*\(")
        .expect("ENTRY_POINT is a valid regex pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunFailure {
    #[error("Compilation error: {0}")]
    Compile(String),

    #[error("No Main method found.")]
    MissingEntryPoint,

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Execution timed out after {} seconds", .0.as_secs_f32())]
    TimedOut(Duration),

    #[error("Execution failed: {0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeFailure {
    UserCode(RunFailure),
    TestHarness(RunFailure),
    OutputMismatch { expected: String, actual: String },
}

impl GradeFailure {
    /// What the submission printed, when it got far enough to print anything.
    pub fn output(&self) -> Option<&str> {
        match self {
            GradeFailure::OutputMismatch { actual, .. } => Some(actual),
            _ => None,
        }
    }
}

impl fmt::Display for GradeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeFailure::UserCode(failure) => write!(f, "{}", failure),
            GradeFailure::TestHarness(failure) => write!(f, "Error in test cases: {}", failure),
            GradeFailure::OutputMismatch { expected, .. } => {
                write!(f, "Incorrect output. Expected: {}", expected)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeOutcome {
    Passed { output: String },
    Failed(GradeFailure),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeRunner: Send + Sync {
    /// Compiles and runs a complete C# program, returning its stdout.
    async fn compile_and_run(&self, source: &str) -> Result<String, RunFailure>;
}

pub fn has_entry_point(source: &str) -> bool {
    ENTRY_POINT.is_match(source)
}

pub fn wrap_test_harness(test_cases: &str) -> String {
    format!(
        "using System;\n\nclass TestProgram\n{{\n    static void Main()\n    {{\n{}\n    }}\n}}\n",
        test_cases
    )
}

pub fn normalize_output(output: &str) -> String {
    output.trim().replace("\r\n", "\n")
}

pub struct CodeGrader {
    runner: Arc<dyn CodeRunner>,
}

impl CodeGrader {
    pub fn new(runner: Arc<dyn CodeRunner>) -> Self {
        Self { runner }
    }

    pub async fn grade(&self, submission: &str, test_cases: &str) -> GradeOutcome {
        if !has_entry_point(submission) {
            return GradeOutcome::Failed(GradeFailure::UserCode(RunFailure::MissingEntryPoint));
        }

        let actual = match self.runner.compile_and_run(submission).await {
            Ok(output) => normalize_output(&output),
            Err(failure) => return GradeOutcome::Failed(GradeFailure::UserCode(failure)),
        };

        let harness = wrap_test_harness(test_cases);
        let expected = match self.runner.compile_and_run(&harness).await {
            Ok(output) => normalize_output(&output),
            Err(failure) => {
                log::warn!("Practice task harness failed: {}", failure);
                return GradeOutcome::Failed(GradeFailure::TestHarness(failure));
            }
        };

        if actual != expected {
            return GradeOutcome::Failed(GradeFailure::OutputMismatch { expected, actual });
        }

        GradeOutcome::Passed { output: actual }
    }
}

struct StepOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
    truncated: bool,
}

async fn read_capped<R: AsyncRead + Unpin>(
    reader: Option<R>,
    limit: usize,
) -> std::io::Result<(Vec<u8>, bool)> {
    let mut buf = Vec::new();
    if let Some(reader) = reader {
        reader.take(limit as u64 + 1).read_to_end(&mut buf).await?;
    }
    let truncated = buf.len() > limit;
    buf.truncate(limit);
    Ok((buf, truncated))
}

fn diagnostics(step: &StepOutput) -> String {
    let text = if step.stderr.trim().is_empty() {
        step.stdout.trim()
    } else {
        step.stderr.trim()
    };
    if text.is_empty() {
        match step.status.code() {
            Some(code) => format!("process exited with code {}", code),
            None => "process terminated by signal".to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Runs the configured compiler and runtime as child processes inside a
/// scratch directory that is removed afterwards.
pub struct ProcessCodeRunner {
    config: GraderConfig,
}

impl ProcessCodeRunner {
    pub fn new(config: GraderConfig) -> Self {
        Self { config }
    }

    fn expand(argv: &[String], source: &Path, output: &Path) -> Vec<String> {
        argv.iter()
            .map(|arg| {
                arg.replace("{source}", &source.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy())
            })
            .collect()
    }

    async fn run_step(&self, argv: &[String], dir: &Path) -> Result<StepOutput, RunFailure> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| RunFailure::Io("Grader command is not configured".to_string()))?;

        let mut child = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RunFailure::Io(format!("Failed to start '{}': {}", program, e)))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.config.max_output_bytes;

        let finished = timeout(self.config.timeout, async {
            tokio::join!(
                read_capped(stdout, limit),
                read_capped(stderr, limit),
                child.wait()
            )
        })
        .await;

        let (stdout, stderr, status) = match finished {
            Ok(results) => results,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    log::warn!("Failed to kill timed out grader process: {}", e);
                }
                return Err(RunFailure::TimedOut(self.config.timeout));
            }
        };

        let io_error = |e: std::io::Error| RunFailure::Io(e.to_string());
        let (stdout, truncated) = stdout.map_err(io_error)?;
        let (stderr, _) = stderr.map_err(io_error)?;
        let status = status.map_err(io_error)?;

        Ok(StepOutput {
            status,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            truncated,
        })
    }

    async fn run_in(&self, dir: &Path, source: &str) -> Result<String, RunFailure> {
        let source_path = dir.join(SOURCE_FILE);
        let output_path = dir.join(OUTPUT_FILE);

        tokio::fs::write(&source_path, source)
            .await
            .map_err(|e| RunFailure::Io(format!("Failed to write source: {}", e)))?;

        if !self.config.compile_command.is_empty() {
            let argv = Self::expand(&self.config.compile_command, &source_path, &output_path);
            let compiled = self.run_step(&argv, dir).await?;
            if !compiled.status.success() {
                return Err(RunFailure::Compile(diagnostics(&compiled)));
            }
        }

        let argv = Self::expand(&self.config.run_command, &source_path, &output_path);
        let ran = self.run_step(&argv, dir).await?;

        if ran.truncated {
            return Err(RunFailure::Runtime(format!(
                "Output exceeded {} bytes",
                self.config.max_output_bytes
            )));
        }
        if !ran.status.success() {
            return Err(RunFailure::Runtime(diagnostics(&ran)));
        }

        Ok(ran.stdout)
    }

    fn scratch_dir(&self) -> PathBuf {
        self.config.work_dir.join(Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl CodeRunner for ProcessCodeRunner {
    async fn compile_and_run(&self, source: &str) -> Result<String, RunFailure> {
        let dir = self.scratch_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| RunFailure::Io(format!("Failed to create work directory: {}", e)))?;

        let result = self.run_in(&dir, source).await;

        if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
            log::warn!("Failed to remove grader directory {}: {}", dir.display(), e);
        }

        result
    }
}
