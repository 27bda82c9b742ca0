use std::io::{self, Write};
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, ExitStatus};

use log::debug;

use crate::error::{ShellError, ShellResult};
use crate::parse::CommandSpec;
use crate::session::Session;

mod pipes;
mod redirection;
mod spawning;

pub use pipes::PipeSet;
pub use redirection::{open_input, open_output};

use spawning::{build_stage_command, spawn_stage};

/// Status of a command that failed before running: redirection target could
/// not be opened, or the program was missing or not executable.
pub const COMMAND_FAILURE_STATUS: i32 = 127;

/// Status when the pipeline could not be set up or the last process did not
/// exit normally.
pub const FAILURE_STATUS: i32 = -1;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StageOutcome {
    /// The process exited normally with this code.
    Exited(i32),
    /// The process was terminated by this signal.
    Signaled(i32),
    /// The process never started; reported as [`COMMAND_FAILURE_STATUS`]
    /// unless the whole pipeline was aborted.
    NotStarted,
    /// Setup was aborted at an earlier stage.
    Skipped,
    /// `wait` failed for this process.
    Lost,
}

impl StageOutcome {
    fn status_code(self) -> i32 {
        match self {
            StageOutcome::Exited(code) => code,
            StageOutcome::NotStarted => COMMAND_FAILURE_STATUS,
            StageOutcome::Signaled(_) | StageOutcome::Skipped | StageOutcome::Lost => {
                FAILURE_STATUS
            }
        }
    }
}

#[derive(Debug)]
pub struct PipelineResult {
    /// Status of the last stage, see [`StageOutcome`].
    pub status_code: i32,
    /// One entry per executed (non-empty) command, in pipeline order.
    pub stages: Vec<StageOutcome>,
    /// Process creation failed part way and later stages were not started.
    pub aborted: bool,
}

impl PipelineResult {
    fn empty() -> Self {
        Self {
            status_code: 0,
            stages: Vec::new(),
            aborted: false,
        }
    }
}

pub fn stage_outcome(status: ExitStatus) -> StageOutcome {
    if let Some(code) = status.code() {
        StageOutcome::Exited(code)
    } else if let Some(sig) = status.signal() {
        StageOutcome::Signaled(sig)
    } else {
        StageOutcome::Lost
    }
}

/// Run a pipeline with stderr diagnostics.
pub fn run_pipeline(pipeline: &[CommandSpec], session: &Session) -> ShellResult<PipelineResult> {
    run_pipeline_with_diagnostics(pipeline, session, &mut io::stderr())
}

/// Run every command of the pipeline concurrently, connected by pipes, and
/// wait for all of them.
///
/// Commands with no arguments are dropped before pipes are allocated, so pipe
/// `i` always joins the `i`-th and `i + 1`-th processes that actually run.
/// Only pipe allocation failure is returned as an error; per-command failures
/// are written to `diag` and recorded in the stage outcomes.
pub fn run_pipeline_with_diagnostics(
    pipeline: &[CommandSpec],
    session: &Session,
    diag: &mut dyn Write,
) -> ShellResult<PipelineResult> {
    let runnable: Vec<&CommandSpec> = pipeline
        .iter()
        .filter(|cmd| !cmd.args.is_empty())
        .collect();
    if runnable.is_empty() {
        return Ok(PipelineResult::empty());
    }
    // A vanished directory would otherwise surface as "command not found"
    // for every stage.
    if !session.cwd.is_dir() {
        let cwd = session.cwd.display().to_string();
        return Err(ShellError::setup(
            &cwd,
            "working directory no longer exists",
        ));
    }
    let count = runnable.len();
    debug!("pipeline event=start count={count}");

    let mut pipes = PipeSet::allocate(count - 1)?;
    let mut stages = vec![StageOutcome::Skipped; count];
    let mut children: Vec<(usize, Child)> = Vec::with_capacity(count);
    let mut aborted = false;

    for (idx, cmd) in runnable.iter().enumerate() {
        let pipe_stdin = if idx > 0 { pipes.take_read(idx - 1) } else { None };
        let pipe_stdout = if idx + 1 < count { pipes.take_write(idx) } else { None };
        let program = cmd.args[0].as_str();

        let spawned = build_stage_command(cmd, session, pipe_stdin, pipe_stdout)
            .and_then(|command| spawn_stage(command, program));
        match spawned {
            Ok(child) => {
                if session.trace {
                    let _ = writeln!(
                        diag,
                        "trace: spawn pid {} argv {:?}",
                        child.id(),
                        cmd.args
                    );
                }
                debug!(
                    "pipeline event=spawn idx={} pid={} program={}",
                    idx,
                    child.id(),
                    program
                );
                children.push((idx, child));
            }
            Err(err) if err.is_per_command() => {
                let _ = writeln!(diag, "pipesh: {}", err.message);
                stages[idx] = StageOutcome::NotStarted;
            }
            Err(err) => {
                let _ = writeln!(diag, "pipesh: {}", err.message);
                debug!("pipeline event=abort idx={idx} remaining={}", count - idx);
                stages[idx] = StageOutcome::NotStarted;
                aborted = true;
                break;
            }
        }
    }

    // Children hold their own copies now; the parent's must go before waiting
    // or downstream readers never see EOF.
    drop(pipes);

    for (idx, mut child) in children {
        let pid = child.id();
        stages[idx] = match child.wait() {
            Ok(status) => stage_outcome(status),
            Err(err) => {
                let _ = writeln!(diag, "pipesh: wait: {err}");
                StageOutcome::Lost
            }
        };
        debug!(
            "pipeline event=wait idx={idx} pid={pid} outcome={:?}",
            stages[idx]
        );
    }

    let status_code = if aborted {
        FAILURE_STATUS
    } else {
        stages[count - 1].status_code()
    };
    debug!("pipeline event=done status={status_code}");
    Ok(PipelineResult {
        status_code,
        stages,
        aborted,
    })
}
